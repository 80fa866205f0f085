//! Scopeline Sample Relay Protocol
//!
//! Every acquisition segment is relayed over the serial link as one
//! self-delimited binary frame:
//! ```text
//! ┌──────┬──────┬────────┬──────────────────────┬──────────┐
//! │ 0xAA │ 0x55 │ LENGTH │ PAYLOAD              │ CHECKSUM │
//! │ 1B   │ 1B   │ 1B     │ 2B per sample (LE)   │ 1B       │
//! └──────┴──────┴────────┴──────────────────────┴──────────┘
//! ```
//!
//! `CHECKSUM` is the 8-bit sum of the payload bytes. `LENGTH` is the
//! payload byte count truncated to one byte, so segments longer than 127
//! samples produce a length byte that no longer describes the payload.
//! Receivers therefore know the samples-per-frame up front.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod frame;

pub use frame::{
    checksum, encode_samples, frame_len, length_byte, DecodedFrame, FrameError, FrameParser,
    SampleFrame, FRAME_MAGIC, FRAME_OVERHEAD,
};
