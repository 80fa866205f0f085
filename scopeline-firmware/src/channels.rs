//! Interrupt-to-task signalling
//!
//! Completion state itself lives in the segment ring; these signals only
//! wake the main loop.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Raised by the transfer-complete interrupt after each segment
pub static SEGMENT_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
