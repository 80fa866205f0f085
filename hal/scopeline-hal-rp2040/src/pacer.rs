//! PWM pacing timer calculation
//!
//! A PWM slice counts `0..=top` at `sys_clk / divider` and raises its wrap
//! DREQ once per period, so the sample rate is
//! `sys_clk / (divider * (top + 1))`.

use fixed::types::U12F4;

/// System clock frequency (RP2040 default)
pub const SYS_CLK_HZ: u32 = 125_000_000;

/// DREQ number of PWM slice 0 wrap; slice `n` is `DREQ_PWM_WRAP0 + n`
pub const DREQ_PWM_WRAP0: u8 = 24;

/// Largest integer part of the 8.4 PWM divider
const MAX_DIVIDER: u32 = 255;

/// Divider and wrap value for one pacing rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacerTiming {
    pub divider: U12F4,
    pub top: u16,
}

impl PacerTiming {
    /// Smallest integer divider whose period fits the 16-bit counter
    ///
    /// Returns `None` when the rate is zero, faster than the clock, or too
    /// slow for the largest divider.
    pub fn for_rate(sys_clk_hz: u32, rate_hz: u32) -> Option<Self> {
        if rate_hz == 0 || rate_hz > sys_clk_hz {
            return None;
        }
        let period = sys_clk_hz / rate_hz;
        let divider = period.div_ceil(1 << 16).max(1);
        if divider > MAX_DIVIDER {
            return None;
        }
        let top = u16::try_from(period / divider - 1).ok()?;
        Some(Self {
            divider: U12F4::from_num(divider),
            top,
        })
    }

    /// Rate actually produced, in millihertz
    pub fn rate_mhz(&self, sys_clk_hz: u32) -> u32 {
        let div = self.divider.to_num::<u32>().max(1) as u64;
        let cycles = div * (self.top as u64 + 1);
        (sys_clk_hz as u64 * 1000 / cycles) as u32
    }
}
