//! Serial frame relay
//!
//! Encodes each consumed segment as one sample frame and writes it to a
//! [`Transport`]. Encoding runs on the main loop, never in interrupt
//! context.

use scopeline_hal::Transport;
use scopeline_protocol::{FrameError, SampleFrame};

use crate::sample::Sample;
use crate::scheduler::SegmentSink;

/// Relay failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayError<E> {
    /// Segment does not fit the frame buffer
    Frame(FrameError),
    /// Transport rejected the write
    Transport(E),
}

impl<E> From<FrameError> for RelayError<E> {
    fn from(e: FrameError) -> Self {
        RelayError::Frame(e)
    }
}

/// Segment sink that relays frames over a transport
///
/// `CAP` is the frame capacity in bytes; it must be at least
/// `scopeline_protocol::frame_len(S)` for segments of `S` samples.
pub struct FrameRelay<T, const CAP: usize> {
    transport: T,
    frames: u32,
}

impl<T: Transport, const CAP: usize> FrameRelay<T, CAP> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            frames: 0,
        }
    }

    /// Frames written so far
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Encode and send one segment
    pub fn send(&mut self, samples: &[Sample]) -> Result<(), RelayError<T::Error>> {
        let frame = SampleFrame::<CAP>::encode(samples)?;
        if frame.is_empty() {
            return Ok(());
        }
        self.transport
            .write_bytes(frame.as_bytes())
            .map_err(RelayError::Transport)?;
        self.frames = self.frames.wrapping_add(1);
        Ok(())
    }
}

impl<T: Transport, const CAP: usize> SegmentSink for FrameRelay<T, CAP> {
    type Error = RelayError<T::Error>;

    fn begin_sweep(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn consume(&mut self, _position: usize, samples: &[Sample]) -> Result<(), Self::Error> {
        self.send(samples)
    }
}
