//! Segment ring shared between the transfer-complete handler and the main loop
//!
//! The ring is a fixed array of `K` segments of `S` samples. The transfer
//! engine writes one segment at a time; on completion the handler marks it
//! ready, raises the new-data flag and moves the write index on. The main
//! loop clears ready flags as it consumes.
//!
//! Everything the two contexts share is an atomic, so the ring can live in a
//! plain `static` without a lock:
//!
//! | Field         | Written by               | Read by    |
//! |---------------|--------------------------|------------|
//! | samples       | transfer engine          | main loop  |
//! | `ready[i]`    | handler (set), main (clear) | both    |
//! | `new_data`    | handler (set), main (clear) | both    |
//! | `write_index` | handler                  | main loop  |
//!
//! Nothing prevents the engine from lapping the consumer. If the main loop
//! falls more than `K - 1` segments behind, a segment is overwritten while
//! still flagged ready and the consumer reads mixed data. That is part of
//! the acquisition contract, not an error the ring reports.

use critical_section::CriticalSection;
use portable_atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use scopeline_hal::TransferTarget;

use crate::sample::Sample;

/// Index of a segment within a ring of `K`
///
/// Always in `0..K`; `next` wraps back to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentIndex<const K: usize>(usize);

impl<const K: usize> SegmentIndex<K> {
    /// Segment zero, the start of every sweep
    pub const FIRST: Self = Self(0);

    /// Checked constructor
    pub const fn new(index: usize) -> Option<Self> {
        if index < K {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn get(self) -> usize {
        self.0
    }

    /// The following segment, wrapping `K - 1` to `0`
    pub const fn next(self) -> Self {
        if self.0 + 1 >= K {
            Self(0)
        } else {
            Self(self.0 + 1)
        }
    }

    pub const fn is_first(self) -> bool {
        self.0 == 0
    }
}

/// Observable state of one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SegmentState {
    /// Current transfer target
    Filling,
    /// Completed, not yet consumed
    Ready,
    /// Consumed (or never written since the last reset)
    Consumed,
}

/// One segment worth of sample storage
pub struct Segment<const S: usize> {
    samples: [AtomicU16; S],
}

impl<const S: usize> Segment<S> {
    const fn new() -> Self {
        Self {
            samples: [const { AtomicU16::new(0) }; S],
        }
    }

    pub const fn len(&self) -> usize {
        S
    }

    pub const fn is_empty(&self) -> bool {
        S == 0
    }

    /// Address the transfer engine writes to
    ///
    /// `AtomicU16` has the layout of `u16`, so the segment is a plain
    /// contiguous halfword buffer from the engine's point of view.
    pub fn as_mut_ptr(&self) -> *mut Sample {
        self.samples.as_ptr() as *mut Sample
    }

    pub fn load(&self, offset: usize) -> Option<Sample> {
        self.samples
            .get(offset)
            .map(|slot| slot.load(Ordering::Relaxed))
    }

    /// Software write path, used by producers that are not a DMA engine
    pub fn store(&self, offset: usize, sample: Sample) -> bool {
        match self.samples.get(offset) {
            Some(slot) => {
                slot.store(sample, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Copy the whole segment out
    pub fn copy_to(&self, out: &mut [Sample; S]) {
        for (dst, slot) in out.iter_mut().zip(self.samples.iter()) {
            *dst = slot.load(Ordering::Relaxed);
        }
    }
}

/// Ring of `K` segments of `S` samples
pub struct SegmentRing<const S: usize, const K: usize> {
    segments: [Segment<S>; K],
    ready: [AtomicBool; K],
    new_data: AtomicBool,
    write_index: AtomicUsize,
}

impl<const S: usize, const K: usize> SegmentRing<S, K> {
    const NON_EMPTY: () = assert!(S > 0 && K > 0, "segment ring needs S > 0 and K > 0");

    /// Samples per segment
    pub const SEGMENT_LEN: usize = S;
    /// Segments per ring
    pub const SEGMENTS: usize = K;

    #[allow(clippy::let_unit_value)]
    pub const fn new() -> Self {
        let () = Self::NON_EMPTY;
        Self {
            segments: [const { Segment::new() }; K],
            ready: [const { AtomicBool::new(false) }; K],
            new_data: AtomicBool::new(false),
            write_index: AtomicUsize::new(0),
        }
    }

    pub fn segment(&self, index: SegmentIndex<K>) -> &Segment<S> {
        &self.segments[index.get()]
    }

    /// Transfer target describing segment `index`
    pub fn target(&self, index: SegmentIndex<K>) -> TransferTarget {
        TransferTarget {
            segment: index.get(),
            address: self.segment(index).as_mut_ptr(),
            count: S,
        }
    }

    /// Segment the engine is currently filling
    pub fn write_index(&self) -> SegmentIndex<K> {
        // Only the handler stores, and only values produced by `next`
        SegmentIndex(self.write_index.load(Ordering::Acquire) % K)
    }

    pub fn is_ready(&self, index: SegmentIndex<K>) -> bool {
        self.ready[index.get()].load(Ordering::Acquire)
    }

    /// Clear the ready flag of `index`, returning whether it was set
    pub fn take_ready(&self, index: SegmentIndex<K>) -> bool {
        self.ready[index.get()].swap(false, Ordering::AcqRel)
    }

    pub fn has_new_data(&self) -> bool {
        self.new_data.load(Ordering::Acquire)
    }

    /// Clear the new-data flag, returning whether it was set
    pub fn take_new_data(&self) -> bool {
        self.new_data.swap(false, Ordering::AcqRel)
    }

    pub fn state(&self, index: SegmentIndex<K>) -> SegmentState {
        if self.is_ready(index) {
            SegmentState::Ready
        } else if self.write_index() == index {
            SegmentState::Filling
        } else {
            SegmentState::Consumed
        }
    }

    /// Number of segments currently flagged ready
    pub fn pending(&self) -> usize {
        self.ready
            .iter()
            .filter(|flag| flag.load(Ordering::Acquire))
            .count()
    }

    /// Handler side of a completed transfer
    ///
    /// Marks the current write segment ready, raises the new-data flag and
    /// advances the write index. Returns `(completed, next)`.
    pub fn complete_segment(&self) -> (SegmentIndex<K>, SegmentIndex<K>) {
        let completed = self.write_index();
        let next = completed.next();
        self.ready[completed.get()].store(true, Ordering::Release);
        self.new_data.store(true, Ordering::Release);
        self.write_index.store(next.get(), Ordering::Release);
        (completed, next)
    }

    /// Drop all flags and point the write index back at segment zero
    ///
    /// Taking a `CriticalSection` keeps the handler from interleaving with
    /// the reset.
    pub fn reset(&self, _cs: CriticalSection<'_>) {
        for flag in &self.ready {
            flag.store(false, Ordering::Release);
        }
        self.new_data.store(false, Ordering::Release);
        self.write_index.store(0, Ordering::Release);
    }
}

impl<const S: usize, const K: usize> Default for SegmentRing<S, K> {
    fn default() -> Self {
        Self::new()
    }
}
