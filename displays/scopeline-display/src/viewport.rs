//! Sample value to screen row mapping

use scopeline_core::sample::{Sample, ADC_MAX};

/// Vertical mapping of sample values onto a screen of `height` rows
///
/// Full scale maps to row 0 (top), zero to row `height - 1` (bottom).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Row for `value`, clamped to full scale first
    pub fn row(&self, value: Sample) -> u16 {
        if self.height == 0 {
            return 0;
        }
        let bottom = (self.height - 1) as u32;
        let value = value.min(ADC_MAX) as u32;
        let offset = value * bottom / ADC_MAX as u32;
        bottom.saturating_sub(offset).min(bottom) as u16
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }
}
