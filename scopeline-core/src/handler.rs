//! Transfer-complete handling
//!
//! [`CompletionHandler`] runs in interrupt context, once per completed
//! segment. It never blocks and never allocates: a handful of atomic
//! stores on the ring and a few register writes to re-arm the engine.

use scopeline_hal::{SampleSource, TransferEngine, TransferTarget};

use crate::ring::{SegmentIndex, SegmentRing};

/// A sample source paired with the engine that drains it
///
/// Each execution context (interrupt handler, main loop) owns its own
/// `Acquisition`; on real hardware both wrap the same peripheral registers.
pub struct Acquisition<Src, Eng> {
    pub source: Src,
    pub engine: Eng,
}

impl<Src: SampleSource, Eng: TransferEngine> Acquisition<Src, Eng> {
    pub fn new(source: Src, engine: Eng) -> Self {
        Self { source, engine }
    }

    /// Point the engine at `target` and arm it
    pub fn retarget(&mut self, target: TransferTarget) {
        let register = self.source.data_register();
        self.engine.configure(register, target);
        self.engine.arm();
    }

    /// Stop triggering and abandon the transfer in flight
    pub fn halt(&mut self) {
        self.source.stop();
        self.engine.disable();
    }

    /// Restart acquisition from segment zero
    ///
    /// Halts first, then inside a critical section drops any completion
    /// that raced the halt, resets the ring and re-arms at the first
    /// segment. Triggering resumes last. An interrupt still pending for
    /// the dropped completion finds no completion to take and is ignored.
    pub fn restart<const S: usize, const K: usize>(&mut self, ring: &SegmentRing<S, K>) {
        self.halt();
        critical_section::with(|cs| {
            self.engine.take_completion();
            ring.reset(cs);
            self.retarget(ring.target(SegmentIndex::FIRST));
        });
        self.source.start();
    }
}

/// Segment buffer manager, invoked from the transfer-complete interrupt
pub struct CompletionHandler<'r, Src, Eng, const S: usize, const K: usize> {
    ring: &'r SegmentRing<S, K>,
    hw: Acquisition<Src, Eng>,
    completions: u32,
    spurious: u32,
}

impl<'r, Src, Eng, const S: usize, const K: usize> CompletionHandler<'r, Src, Eng, S, K>
where
    Src: SampleSource,
    Eng: TransferEngine,
{
    /// With `K == 1` the handler stops the source after every segment
    /// (single-shot acquisition).
    pub const SINGLE_SHOT: bool = K == 1;

    pub fn new(ring: &'r SegmentRing<S, K>, hw: Acquisition<Src, Eng>) -> Self {
        Self {
            ring,
            hw,
            completions: 0,
            spurious: 0,
        }
    }

    /// Handle one transfer-complete event
    ///
    /// On return the completed segment is flagged ready, the new-data flag
    /// is raised, and the engine is armed at the following segment (with
    /// the source stopped in single-shot mode). Returns the index of the
    /// segment that completed, or `None` when the engine had no completion
    /// pending; the ring and engine are then left untouched.
    pub fn on_transfer_complete(&mut self) -> Option<SegmentIndex<K>> {
        if !self.hw.engine.take_completion() {
            self.spurious = self.spurious.wrapping_add(1);
            return None;
        }

        let (completed, next) = self.ring.complete_segment();

        if Self::SINGLE_SHOT {
            self.hw.source.stop();
        }

        self.hw.retarget(self.ring.target(next));
        self.completions = self.completions.wrapping_add(1);

        Some(completed)
    }

    /// Completion events handled so far
    pub fn completions(&self) -> u32 {
        self.completions
    }

    /// Interrupts that arrived with no completion pending
    pub fn spurious(&self) -> u32 {
        self.spurious
    }
}
