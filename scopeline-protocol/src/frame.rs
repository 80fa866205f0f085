//! Frame encoding and decoding for the sample relay link.
//!
//! Frame format:
//! - MAGIC (2 bytes): 0xAA 0x55 synchronization pair
//! - LENGTH (1 byte): payload byte count, truncated to 8 bits
//! - PAYLOAD (2 bytes per sample): little-endian samples
//! - CHECKSUM (1 byte): sum of all PAYLOAD bytes, mod 256

use heapless::Vec;

/// Frame synchronization bytes
pub const FRAME_MAGIC: [u8; 2] = [0xAA, 0x55];

/// Bytes added around the payload (MAGIC + LENGTH + CHECKSUM)
pub const FRAME_OVERHEAD: usize = 4;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Checksum mismatch
    InvalidChecksum,
    /// Length byte does not match the expected samples per frame
    InvalidLength,
}

/// Total encoded size of a frame carrying `samples` samples
///
/// Zero samples encode to nothing at all.
pub const fn frame_len(samples: usize) -> usize {
    if samples == 0 {
        0
    } else {
        FRAME_OVERHEAD + 2 * samples
    }
}

/// Value of the LENGTH byte for a frame carrying `samples` samples
///
/// Payloads above 255 bytes wrap; the byte is kept for compatibility with
/// existing receivers rather than widened.
pub const fn length_byte(samples: usize) -> u8 {
    (samples.wrapping_mul(2) & 0xFF) as u8
}

/// 8-bit additive checksum
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |acc, &byte| acc.wrapping_add(byte))
}

/// Encode samples into a complete frame
///
/// Returns the number of bytes written. An empty sample slice writes
/// nothing and returns 0. The buffer is only considered valid up to the
/// returned length; on error nothing usable has been written.
pub fn encode_samples(samples: &[u16], buffer: &mut [u8]) -> Result<usize, FrameError> {
    if samples.is_empty() {
        return Ok(0);
    }

    let len = frame_len(samples.len());
    if buffer.len() < len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[..2].copy_from_slice(&FRAME_MAGIC);
    buffer[2] = length_byte(samples.len());

    let payload = &mut buffer[3..len - 1];
    for (chunk, sample) in payload.chunks_exact_mut(2).zip(samples) {
        chunk.copy_from_slice(&sample.to_le_bytes());
    }

    buffer[len - 1] = checksum(&buffer[3..len - 1]);
    Ok(len)
}

/// An encoded frame held in a fixed-capacity buffer
///
/// `CAP` is the byte capacity; use [`frame_len`] to size it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleFrame<const CAP: usize> {
    bytes: Vec<u8, CAP>,
}

impl<const CAP: usize> SampleFrame<CAP> {
    /// Encode samples into a new frame
    pub fn encode(samples: &[u16]) -> Result<Self, FrameError> {
        let mut buffer = [0u8; CAP];
        let len = encode_samples(samples, &mut buffer)?;
        let mut bytes = Vec::new();
        bytes
            .extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(Self { bytes })
    }

    /// The encoded bytes, ready for the transport
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the frame is empty (encoded from zero samples)
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A successfully received frame of `N` samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame<const N: usize> {
    /// Decoded samples in transmission order
    pub samples: [u16; N],
}

/// Streaming parser for frames of exactly `N` samples
///
/// The length byte cannot describe payloads above 255 bytes, so the
/// receiver is configured with the samples per frame and only uses the
/// length byte as a sanity check.
#[derive(Debug, Clone)]
pub struct FrameParser<const N: usize> {
    state: ParseState,
    samples: [u16; N],
    payload_pos: usize,
    low_byte: u8,
    sum: u8,
    frames: u32,
    errors: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for the first magic byte
    WaitingForMagic,
    /// Got 0xAA, waiting for 0x55
    WaitingForMagicTail,
    /// Waiting for LENGTH
    WaitingForLength,
    /// Reading payload bytes
    ReadingPayload,
    /// Waiting for CHECKSUM
    WaitingForChecksum,
}

impl<const N: usize> Default for FrameParser<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameParser<N> {
    /// Payload bytes per frame
    pub const PAYLOAD_LEN: usize = 2 * N;

    /// Create a new frame parser
    pub const fn new() -> Self {
        Self {
            state: ParseState::WaitingForMagic,
            samples: [0; N],
            payload_pos: 0,
            low_byte: 0,
            sum: 0,
            frames: 0,
            errors: 0,
        }
    }

    /// Reset the parser state (counters are kept)
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForMagic;
        self.payload_pos = 0;
        self.low_byte = 0;
        self.sum = 0;
    }

    /// Number of valid frames decoded so far
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Number of framing or checksum errors seen so far
    pub fn errors(&self) -> u32 {
        self.errors
    }

    fn fail(&mut self, error: FrameError) -> Result<Option<DecodedFrame<N>>, FrameError> {
        self.errors = self.errors.wrapping_add(1);
        self.reset();
        Err(error)
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    /// After an error the parser is already hunting for the next header.
    pub fn feed(&mut self, byte: u8) -> Result<Option<DecodedFrame<N>>, FrameError> {
        match self.state {
            ParseState::WaitingForMagic => {
                if byte == FRAME_MAGIC[0] {
                    self.state = ParseState::WaitingForMagicTail;
                }
                // Silently ignore anything else while hunting
                Ok(None)
            }
            ParseState::WaitingForMagicTail => {
                self.state = match byte {
                    b if b == FRAME_MAGIC[1] => ParseState::WaitingForLength,
                    // Repeated 0xAA may still be the start of a header
                    b if b == FRAME_MAGIC[0] => ParseState::WaitingForMagicTail,
                    _ => ParseState::WaitingForMagic,
                };
                Ok(None)
            }
            ParseState::WaitingForLength => {
                if byte != length_byte(N) {
                    return self.fail(FrameError::InvalidLength);
                }
                self.payload_pos = 0;
                self.sum = 0;
                self.state = if Self::PAYLOAD_LEN == 0 {
                    ParseState::WaitingForChecksum
                } else {
                    ParseState::ReadingPayload
                };
                Ok(None)
            }
            ParseState::ReadingPayload => {
                self.sum = self.sum.wrapping_add(byte);
                if self.payload_pos % 2 == 0 {
                    self.low_byte = byte;
                } else {
                    self.samples[self.payload_pos / 2] = u16::from_le_bytes([self.low_byte, byte]);
                }
                self.payload_pos += 1;
                if self.payload_pos == Self::PAYLOAD_LEN {
                    self.state = ParseState::WaitingForChecksum;
                }
                Ok(None)
            }
            ParseState::WaitingForChecksum => {
                if byte != self.sum {
                    return self.fail(FrameError::InvalidChecksum);
                }

                let frame = DecodedFrame {
                    samples: self.samples,
                };
                self.frames = self.frames.wrapping_add(1);
                self.reset();
                Ok(Some(frame))
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<DecodedFrame<N>>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
