//! RP2040-specific HAL for the Scopeline firmware
//!
//! This crate provides RP2040 implementations of the Scopeline capability
//! traits:
//! - PWM-paced sample source over the free-running ADC
//! - DMA channel transfer engine with completion on `DMA_IRQ_1`
//! - Blocking UART transport
//! - Chip-select SPI device for the TFT
//!
//! # Sample pacing
//!
//! The ADC's own divider cannot go below ~732 Hz and the DMA pacing timers
//! below ~1.9 kHz, so neither reaches the 200 Hz sample rate. Instead the
//! ADC converts continuously (`START_MANY`) and a PWM slice wrapping at the
//! sample rate raises the DREQ that moves one result per period:
//!
//! ```text
//! ADC (free-running) ──▶ RESULT ──DMA (DREQ = PWM wrap)──▶ segment buffer
//!                                        │
//!                                        └─ count reached ─▶ DMA_IRQ_1
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod dma;
pub mod pacer;
pub mod source;
pub mod spi;
pub mod uart;

pub use dma::DmaEngine;
pub use pacer::{PacerTiming, SYS_CLK_HZ};
pub use source::{FreeRunningAdc, PacedAdc, Pacer};
pub use spi::ChipSelectDevice;
pub use uart::SerialTransport;
