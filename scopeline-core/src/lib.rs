//! Board-agnostic acquisition core for the Scopeline firmware
//!
//! This crate contains everything between the transfer-complete interrupt
//! and the output sinks, with no dependency on a specific chip:
//!
//! - Sample model and voltage conversion
//! - Segment ring shared between handler and main loop (lock-free)
//! - Transfer-complete handler (segment buffer manager)
//! - Cooperative main-loop scheduler
//! - Serial frame relay sink
//! - Configuration types and the embedded TOML parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod handler;
pub mod relay;
pub mod ring;
pub mod sample;
pub mod scheduler;

#[cfg(test)]
mod sim;

pub use handler::{Acquisition, CompletionHandler};
pub use relay::{FrameRelay, RelayError};
pub use ring::{Segment, SegmentIndex, SegmentRing, SegmentState};
pub use sample::{Sample, ADC_MAX};
pub use scheduler::{Scheduler, SchedulerStats, SegmentSink, SinkError, Tick};
