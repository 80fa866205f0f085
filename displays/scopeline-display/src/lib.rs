//! Waveform rendering for Scopeline
//!
//! This crate turns consumed segments into pixels:
//! - [`viewport`] maps sample values to screen rows
//! - [`downsample`] reduces a segment to one value per pixel column
//! - [`raster`] walks integer Bresenham lines
//! - [`canvas`] bounds-checks pixel writes onto a [`DisplayController`]
//!   and exposes it as an `embedded-graphics` draw target
//! - [`waveform`] ties them together as a segment sink
//! - [`ili9341`] drives an ILI9341 TFT over SPI
//!
//! # Architecture
//!
//! ```text
//! segment ──▶ downsample ──▶ viewport ──▶ raster ──▶ canvas ──▶ DisplayController
//!                                                      ▲
//!                                     embedded-graphics ┘ (text, shapes)
//! ```
//!
//! [`DisplayController`]: scopeline_hal::DisplayController

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod canvas;
pub mod downsample;
pub mod ili9341;
pub mod raster;
pub mod viewport;
pub mod waveform;

#[cfg(test)]
mod mock;

pub use canvas::Canvas;
pub use downsample::Columns;
pub use ili9341::{DisplayError, Ili9341};
pub use raster::Line;
pub use viewport::Viewport;
pub use waveform::WaveformRenderer;
