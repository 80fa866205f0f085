//! Configuration validation

use heapless::Vec;
use scopeline_protocol::length_byte;

use super::types::ScopeConfig;

/// Maximum number of warnings a validation can report
pub const MAX_WARNINGS: usize = 4;

/// Non-fatal findings
pub type Warnings = Vec<ConfigWarning, MAX_WARNINGS>;

/// Configuration that cannot run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Display width or height is zero
    ZeroDisplaySize,
    ZeroSegmentsPerScreen,
    ZeroBaudrate,
    ZeroReference,
}

/// Configuration that runs but misbehaves in a known way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigWarning {
    /// Payload is longer than the length byte can express
    LengthTruncated { payload_bytes: usize, length_byte: u8 },
    /// More segments per screen than pixel columns; segments overlap
    SegmentsNarrowerThanPixel { segments: u16, width: u16 },
    /// Ring positions past `segments_per_screen` land off-screen
    RingExceedsScreen { ring: usize, segments_per_screen: u16 },
}

impl ScopeConfig {
    /// Check the configuration against a ring of `K` segments of `S` samples
    pub fn validate<const S: usize, const K: usize>(&self) -> Result<Warnings, ConfigError> {
        let display = &self.display;
        let segments = self.acquisition.segments_per_screen;

        if display.width == 0 || display.height == 0 {
            return Err(ConfigError::ZeroDisplaySize);
        }
        if segments == 0 {
            return Err(ConfigError::ZeroSegmentsPerScreen);
        }
        if self.serial.baudrate == 0 {
            return Err(ConfigError::ZeroBaudrate);
        }
        if self.adc.vref_mv == 0 {
            return Err(ConfigError::ZeroReference);
        }

        let mut warnings = Warnings::new();
        // Capacity covers every variant below
        let mut warn = |w| {
            let _ = warnings.push(w);
        };

        let payload_bytes = 2 * S;
        if payload_bytes > u8::MAX as usize {
            warn(ConfigWarning::LengthTruncated {
                payload_bytes,
                length_byte: length_byte(S),
            });
        }
        if segments > display.width {
            warn(ConfigWarning::SegmentsNarrowerThanPixel {
                segments,
                width: display.width,
            });
        }
        if K > segments as usize {
            warn(ConfigWarning::RingExceedsScreen {
                ring: K,
                segments_per_screen: segments,
            });
        }

        Ok(warnings)
    }
}
