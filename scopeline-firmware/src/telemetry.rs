//! Segment trace over defmt

use core::convert::Infallible;

use defmt::*;
use scopeline_core::sample::{mean, to_millivolts};
use scopeline_core::{Sample, SegmentSink};

/// Logs each segment's mean voltage
pub struct TraceLog {
    vref_mv: u16,
    sweep: u32,
}

impl TraceLog {
    pub fn new(vref_mv: u16) -> Self {
        Self { vref_mv, sweep: 0 }
    }
}

impl SegmentSink for TraceLog {
    type Error = Infallible;

    fn begin_sweep(&mut self) -> Result<(), Infallible> {
        self.sweep = self.sweep.wrapping_add(1);
        debug!("Sweep {}", self.sweep);
        Ok(())
    }

    fn consume(&mut self, position: usize, samples: &[Sample]) -> Result<(), Infallible> {
        let mv = to_millivolts(mean(samples), self.vref_mv);
        trace!("Segment {}: {} mV", position, mv);
        Ok(())
    }
}
