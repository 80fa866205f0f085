//! Sample acquisition abstractions
//!
//! The sample source converts one sample per trigger period into a fixed
//! register. The transfer engine copies from that register into memory
//! without CPU involvement and raises exactly one completion event after
//! the configured count.

/// One raw converter reading
pub type Sample = u16;

/// Destination of one bulk transfer
///
/// Carries both the raw address (for hardware engines) and the segment
/// index it belongs to (for simulated engines and logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferTarget {
    /// Segment index within the acquisition ring
    pub segment: usize,
    /// First sample slot of the segment
    pub address: *mut Sample,
    /// Number of samples to copy before the completion event
    pub count: usize,
}

#[cfg(feature = "defmt")]
impl defmt::Format for TransferTarget {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "TransferTarget {{ segment: {}, address: {=usize:#x}, count: {} }}",
            self.segment,
            self.address as usize,
            self.count
        );
    }
}

/// Periodic sample source
///
/// Implementations own the trigger (timer, PWM wrap, ...) and the converter.
/// Starting and stopping must be bounded-time register writes so they can be
/// called from the completion handler.
pub trait SampleSource {
    /// Fixed location the newest sample can be read from
    fn data_register(&self) -> *const Sample;

    /// Start periodic triggering
    fn start(&mut self);

    /// Stop periodic triggering
    fn stop(&mut self);

    /// Check if the trigger is running
    fn is_running(&self) -> bool;
}

/// Bulk transfer engine (DMA channel)
///
/// Must be reconfigured and re-armed after every completion for
/// continuous operation.
pub trait TransferEngine {
    /// Program source, destination and count
    ///
    /// Does not start the transfer.
    fn configure(&mut self, source: *const Sample, target: TransferTarget);

    /// Arm the engine so the next triggers copy samples
    fn arm(&mut self);

    /// Disable the engine, abandoning any transfer in flight
    fn disable(&mut self);

    /// Clear this engine's completion event, returning whether one was
    /// pending
    ///
    /// The interrupt line may be shared or re-raised by an abort, so the
    /// completion handler checks this before touching any cursor.
    fn take_completion(&mut self) -> bool;

    /// Check if the engine is armed
    fn is_armed(&self) -> bool;
}
