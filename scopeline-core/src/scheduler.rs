//! Main-loop acquisition scheduler
//!
//! The scheduler runs in thread context. Each [`Scheduler::tick`] checks
//! the new-data flag, drains ready segments strictly in ring order and hands
//! each one to a [`SegmentSink`]. When the consumer cursor returns to
//! segment zero a sweep is complete; depending on configuration the
//! scheduler then restarts acquisition, keeps running, or halts.
//!
//! Ticks never block, so the scheduler can be driven from a busy loop or
//! from an async task woken by the transfer-complete interrupt.

use scopeline_hal::{SampleSource, TransferEngine};

use crate::config::{AcquisitionConfig, OneShotPolicy};
use crate::handler::Acquisition;
use crate::ring::{SegmentIndex, SegmentRing};
use crate::sample::Sample;

/// Consumer of completed segments
///
/// `position` is the segment's index in the ring, which is also its
/// horizontal slot on screen within the current sweep.
pub trait SegmentSink {
    type Error;

    /// A new sweep starts at segment zero
    fn begin_sweep(&mut self) -> Result<(), Self::Error>;

    /// Consume one completed segment
    fn consume(&mut self, position: usize, samples: &[Sample]) -> Result<(), Self::Error>;
}

/// Error from one half of a paired sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError<A, B> {
    First(A),
    Second(B),
}

/// Dispatch to both sinks in order
///
/// The second sink still runs when the first fails; the first error wins.
impl<A: SegmentSink, B: SegmentSink> SegmentSink for (A, B) {
    type Error = SinkError<A::Error, B::Error>;

    fn begin_sweep(&mut self) -> Result<(), Self::Error> {
        let first = self.0.begin_sweep().map_err(SinkError::First);
        let second = self.1.begin_sweep().map_err(SinkError::Second);
        first.and(second)
    }

    fn consume(&mut self, position: usize, samples: &[Sample]) -> Result<(), Self::Error> {
        let first = self.0.consume(position, samples).map_err(SinkError::First);
        let second = self.1.consume(position, samples).map_err(SinkError::Second);
        first.and(second)
    }
}

/// An absent sink accepts everything
impl<T: SegmentSink> SegmentSink for Option<T> {
    type Error = T::Error;

    fn begin_sweep(&mut self) -> Result<(), Self::Error> {
        match self {
            Some(sink) => sink.begin_sweep(),
            None => Ok(()),
        }
    }

    fn consume(&mut self, position: usize, samples: &[Sample]) -> Result<(), Self::Error> {
        match self {
            Some(sink) => sink.consume(position, samples),
            None => Ok(()),
        }
    }
}

/// Outcome of one scheduler tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// Nothing was ready
    Idle,
    /// This many segments were consumed
    Consumed(usize),
    /// Acquisition is stopped; call `start` to resume
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
enum RunState {
    Stopped,
    Running,
    Halted,
}

/// Running counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchedulerStats {
    /// Segments handed to the sink
    pub segments: u32,
    /// Completed sweeps (consumer cursor wrapped to zero)
    pub sweeps: u32,
    /// Acquisition restarts, including the initial `start`
    pub restarts: u32,
}

/// Consumer side of the segment ring
pub struct Scheduler<'r, const S: usize, const K: usize> {
    ring: &'r SegmentRing<S, K>,
    config: AcquisitionConfig,
    next: SegmentIndex<K>,
    state: RunState,
    scratch: [Sample; S],
    stats: SchedulerStats,
}

impl<'r, const S: usize, const K: usize> Scheduler<'r, S, K> {
    pub fn new(ring: &'r SegmentRing<S, K>, config: AcquisitionConfig) -> Self {
        Self {
            ring,
            config,
            next: SegmentIndex::FIRST,
            state: RunState::Stopped,
            scratch: [0; S],
            stats: SchedulerStats::default(),
        }
    }

    /// Begin acquisition at segment zero
    pub fn start<Src, Eng, C>(
        &mut self,
        hw: &mut Acquisition<Src, Eng>,
        sink: &mut C,
    ) -> Result<(), C::Error>
    where
        Src: SampleSource,
        Eng: TransferEngine,
        C: SegmentSink,
    {
        self.restart(hw);
        sink.begin_sweep()
    }

    /// Stop acquisition; pending segments are left unconsumed
    pub fn stop<Src: SampleSource, Eng: TransferEngine>(&mut self, hw: &mut Acquisition<Src, Eng>) {
        hw.halt();
        self.state = RunState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Next segment the consumer will read
    pub fn cursor(&self) -> SegmentIndex<K> {
        self.next
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// One main-loop iteration
    ///
    /// Drains at most `K` ready segments. A sink error does not stop the
    /// drain: the cursor still advances past the failed segment and the
    /// first error is returned once the drain is done.
    pub fn tick<Src, Eng, C>(
        &mut self,
        hw: &mut Acquisition<Src, Eng>,
        sink: &mut C,
    ) -> Result<Tick, C::Error>
    where
        Src: SampleSource,
        Eng: TransferEngine,
        C: SegmentSink,
    {
        if self.state != RunState::Running {
            return Ok(Tick::Halted);
        }

        // The flag is only a hint; ready flags are the source of truth
        let signalled = self.ring.take_new_data();
        if !signalled && !self.ring.is_ready(self.next) {
            return Ok(Tick::Idle);
        }

        let mut consumed = 0;
        let mut first_error = None;

        while consumed < K && self.ring.take_ready(self.next) {
            let position = self.next;
            self.ring.segment(position).copy_to(&mut self.scratch);

            if let Err(e) = sink.consume(position.get(), &self.scratch) {
                first_error = first_error.or(Some(e));
            }
            consumed += 1;
            self.stats.segments = self.stats.segments.wrapping_add(1);
            self.next = position.next();

            if self.next.is_first() {
                self.stats.sweeps = self.stats.sweeps.wrapping_add(1);
                if let Err(e) = self.end_sweep(hw, sink) {
                    first_error = first_error.or(Some(e));
                }
                if self.state != RunState::Running || self.config.pause_on_wrap {
                    break;
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None if consumed == 0 => Ok(Tick::Idle),
            None if self.state == RunState::Halted => Ok(Tick::Halted),
            None => Ok(Tick::Consumed(consumed)),
        }
    }

    fn end_sweep<Src, Eng, C>(
        &mut self,
        hw: &mut Acquisition<Src, Eng>,
        sink: &mut C,
    ) -> Result<(), C::Error>
    where
        Src: SampleSource,
        Eng: TransferEngine,
        C: SegmentSink,
    {
        if K == 1 {
            match self.config.one_shot {
                OneShotPolicy::Halt => {
                    hw.halt();
                    self.state = RunState::Halted;
                    return Ok(());
                }
                OneShotPolicy::Restart => self.restart(hw),
            }
        } else if self.config.pause_on_wrap {
            self.restart(hw);
        }
        sink.begin_sweep()
    }

    fn restart<Src: SampleSource, Eng: TransferEngine>(&mut self, hw: &mut Acquisition<Src, Eng>) {
        hw.restart(self.ring);
        self.next = SegmentIndex::FIRST;
        self.state = RunState::Running;
        self.stats.restarts = self.stats.restarts.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use proptest::prelude::*;

    use super::*;
    use crate::sim::{is_contiguous, Bench};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Consumed {
        position: usize,
        first: Sample,
        contiguous: bool,
    }

    #[derive(Default)]
    struct Recorder {
        segments: Vec<Consumed>,
        sweeps: usize,
        fail_at: Option<usize>,
    }

    impl SegmentSink for Recorder {
        type Error = usize;

        fn begin_sweep(&mut self) -> Result<(), usize> {
            self.sweeps += 1;
            Ok(())
        }

        fn consume(&mut self, position: usize, samples: &[Sample]) -> Result<(), usize> {
            self.segments.push(Consumed {
                position,
                first: samples[0],
                contiguous: is_contiguous(samples),
            });
            match self.fail_at {
                Some(p) if p == position => Err(p),
                _ => Ok(()),
            }
        }
    }

    fn continuous(pause_on_wrap: bool) -> AcquisitionConfig {
        AcquisitionConfig {
            pause_on_wrap,
            ..AcquisitionConfig::default()
        }
    }

    fn single_shot(one_shot: OneShotPolicy) -> AcquisitionConfig {
        AcquisitionConfig {
            one_shot,
            ..AcquisitionConfig::default()
        }
    }

    #[test]
    fn test_start_arms_first_segment() {
        let ring = SegmentRing::<8, 4>::new();
        let (bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, continuous(true));
        let mut sink = Recorder::default();

        sched.start(&mut hw, &mut sink).unwrap();

        assert!(sched.is_running());
        assert_eq!(sink.sweeps, 1);
        let bus = bench.bus();
        assert!(bus.running && bus.armed);
        assert_eq!(bus.target.unwrap().segment, 0);
    }

    #[test]
    fn test_idle_without_data() {
        let ring = SegmentRing::<8, 4>::new();
        let (mut bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, continuous(true));
        let mut sink = Recorder::default();

        sched.start(&mut hw, &mut sink).unwrap();
        bench.produce(7);

        assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Idle));
        assert!(sink.segments.is_empty());
    }

    #[test]
    fn test_tick_before_start_is_halted() {
        let ring = SegmentRing::<8, 4>::new();
        let (_bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, continuous(true));
        let mut sink = Recorder::default();

        assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Halted));
    }

    #[test]
    fn test_strict_cyclic_order() {
        let ring = SegmentRing::<8, 4>::new();
        let (mut bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, continuous(false));
        let mut sink = Recorder::default();

        sched.start(&mut hw, &mut sink).unwrap();
        for _ in 0..12 {
            bench.produce(8);
            assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Consumed(1)));
        }

        let positions: Vec<usize> = sink.segments.iter().map(|c| c.position).collect();
        assert_eq!(positions, [0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3]);
        assert!(sink.segments.iter().all(|c| c.contiguous));
        assert_eq!(sched.stats().sweeps, 3);
        // One sweep from `start`, one per wrap
        assert_eq!(sink.sweeps, 4);
        assert_eq!(sched.stats().restarts, 1);
    }

    #[test]
    fn test_backlog_drained_in_order() {
        let ring = SegmentRing::<8, 4>::new();
        let (mut bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, continuous(false));
        let mut sink = Recorder::default();

        sched.start(&mut hw, &mut sink).unwrap();
        bench.produce(8 * 3);

        assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Consumed(3)));
        let firsts: Vec<Sample> = sink.segments.iter().map(|c| c.first).collect();
        assert_eq!(firsts, [0, 8, 16]);
        assert_eq!(sched.cursor().get(), 3);
    }

    #[test]
    fn test_pause_on_wrap_restarts_at_zero() {
        let ring = SegmentRing::<8, 4>::new();
        let (mut bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, continuous(true));
        let mut sink = Recorder::default();

        sched.start(&mut hw, &mut sink).unwrap();
        bench.produce(8 * 4 + 5);

        assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Consumed(4)));
        assert_eq!(sched.stats().restarts, 2);
        assert_eq!(sched.cursor(), SegmentIndex::FIRST);
        assert_eq!(ring.pending(), 0);

        // The partial segment written before the restart is discarded
        let bus = bench.bus();
        assert_eq!(bus.target.unwrap().segment, 0);
        assert_eq!(bus.written, 0);
        assert!(bus.running && bus.armed);
    }

    #[test]
    fn test_overrun_corrupts_oldest_segment() {
        let ring = SegmentRing::<8, 4>::new();
        let (mut bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, continuous(true));
        let mut sink = Recorder::default();

        sched.start(&mut hw, &mut sink).unwrap();
        // Lap the consumer by half a segment
        bench.produce(8 * 4 + 4);

        sched.tick(&mut hw, &mut sink).unwrap();
        let oldest = &sink.segments[0];
        assert_eq!(oldest.position, 0);
        assert!(!oldest.contiguous);
        assert!(sink.segments[1..].iter().all(|c| c.contiguous));
    }

    #[test]
    fn test_single_shot_halts() {
        let ring = SegmentRing::<8, 1>::new();
        let (mut bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, single_shot(OneShotPolicy::Halt));
        let mut sink = Recorder::default();

        sched.start(&mut hw, &mut sink).unwrap();
        bench.produce(8);

        assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Halted));
        assert_eq!(sink.segments.len(), 1);
        assert!(!sched.is_running());
        assert!(!bench.bus().running);
        assert!(!bench.bus().armed);

        bench.produce(8);
        assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Halted));
        assert_eq!(sink.segments.len(), 1);

        // Explicit restart
        sched.start(&mut hw, &mut sink).unwrap();
        bench.produce(8);
        assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Halted));
        assert_eq!(sink.segments.len(), 2);
        assert_eq!(sink.segments[1].first, 8);
    }

    #[test]
    fn test_single_shot_restart_policy() {
        let ring = SegmentRing::<8, 1>::new();
        let (mut bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, single_shot(OneShotPolicy::Restart));
        let mut sink = Recorder::default();

        sched.start(&mut hw, &mut sink).unwrap();
        for round in 0..3 {
            bench.produce(8);
            assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Consumed(1)));
            assert!(bench.bus().running, "round {round}");
        }
        assert_eq!(sink.segments.len(), 3);
        assert_eq!(sched.stats().sweeps, 3);
    }

    #[test]
    fn test_sink_error_still_advances() {
        let ring = SegmentRing::<8, 4>::new();
        let (mut bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, continuous(false));
        let mut sink = Recorder {
            fail_at: Some(1),
            ..Recorder::default()
        };

        sched.start(&mut hw, &mut sink).unwrap();
        bench.produce(8 * 3);

        assert_eq!(sched.tick(&mut hw, &mut sink), Err(1));
        assert_eq!(sink.segments.len(), 3);
        assert_eq!(sched.cursor().get(), 3);
    }

    #[test]
    fn test_stop_leaves_backlog() {
        let ring = SegmentRing::<8, 4>::new();
        let (mut bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, continuous(true));
        let mut sink = Recorder::default();

        sched.start(&mut hw, &mut sink).unwrap();
        bench.produce(8);
        sched.stop(&mut hw);

        assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Halted));
        assert_eq!(ring.pending(), 1);
        assert!(!bench.bus().running);
    }

    #[test]
    fn test_pair_sink_runs_both() {
        let mut pair = (
            Recorder {
                fail_at: Some(0),
                ..Recorder::default()
            },
            Recorder::default(),
        );

        assert_eq!(pair.consume(0, &[1, 2, 3]), Err(SinkError::First(0)));
        assert_eq!(pair.0.segments.len(), 1);
        assert_eq!(pair.1.segments.len(), 1);
        assert_eq!(pair.begin_sweep(), Ok(()));
    }

    #[test]
    fn test_absent_sink_is_noop() {
        let ring = SegmentRing::<8, 4>::new();
        let (mut bench, mut hw) = Bench::new(&ring);
        let mut sched = Scheduler::new(&ring, continuous(false));
        let mut sink: (Recorder, Option<Recorder>) = (Recorder::default(), None);

        sched.start(&mut hw, &mut sink).unwrap();
        bench.produce(16);

        assert_eq!(sched.tick(&mut hw, &mut sink), Ok(Tick::Consumed(2)));
        assert_eq!(sink.0.segments.len(), 2);
    }

    proptest! {
        /// A consumer that keeps up never sees a torn segment
        #[test]
        fn prop_no_corruption_at_rate(
            bursts in proptest::collection::vec(1usize..=8, 1..200),
            pause_on_wrap in any::<bool>(),
        ) {
            let ring = SegmentRing::<8, 4>::new();
            let (mut bench, mut hw) = Bench::new(&ring);
            let mut sched = Scheduler::new(&ring, continuous(pause_on_wrap));
            let mut sink = Recorder::default();

            sched.start(&mut hw, &mut sink).unwrap();
            for burst in bursts {
                bench.produce(burst);
                sched.tick(&mut hw, &mut sink).unwrap();
            }

            for pair in sink.segments.windows(2) {
                prop_assert!(pair[1].first > pair[0].first);
            }
            for seg in &sink.segments {
                prop_assert!(seg.contiguous);
            }
        }

        /// Consumed positions always follow ring order
        #[test]
        fn prop_positions_cyclic(bursts in proptest::collection::vec(1usize..=32, 1..100)) {
            let ring = SegmentRing::<8, 4>::new();
            let (mut bench, mut hw) = Bench::new(&ring);
            let mut sched = Scheduler::new(&ring, continuous(false));
            let mut sink = Recorder::default();

            sched.start(&mut hw, &mut sink).unwrap();
            for burst in bursts {
                bench.produce(burst);
                sched.tick(&mut hw, &mut sink).unwrap();
            }

            for (i, seg) in sink.segments.iter().enumerate() {
                prop_assert_eq!(seg.position, i % 4);
            }
        }
    }
}
