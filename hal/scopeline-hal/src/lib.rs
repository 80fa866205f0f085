//! Scopeline Hardware Abstraction Layer
//!
//! This crate defines the capability traits the acquisition core consumes
//! and drives. Chip-specific HALs (RP2040, ...) implement them on real
//! registers; the core crates implement them on simulated hardware in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  scopeline-core / scopeline-display     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  scopeline-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ scopeline-hal-│       │  simulated    │
//! │    rp2040     │       │  adapters     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`acquisition::SampleSource`] - Periodic trigger + converter
//! - [`acquisition::TransferEngine`] - Autonomous bulk transfer (DMA)
//! - [`display::DisplayController`] - Windowed pixel-stream display
//! - [`transport::Transport`] - Fire-and-forget byte stream

#![no_std]
#![deny(unsafe_code)]

pub mod acquisition;
pub mod display;
pub mod transport;

// Re-export key traits at crate root for convenience
pub use acquisition::{Sample, SampleSource, TransferEngine, TransferTarget};
pub use display::DisplayController;
pub use transport::{SerialConfig, Transport};
