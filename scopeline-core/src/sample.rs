//! Sample model

pub use scopeline_hal::Sample;

/// Full-scale reading of the 12-bit converter
pub const ADC_MAX: Sample = 4095;

/// Convert a raw reading to millivolts against `vref_mv`
///
/// Readings above full scale are clamped first.
pub fn to_millivolts(sample: Sample, vref_mv: u16) -> u32 {
    let clamped = sample.min(ADC_MAX) as u32;
    clamped * vref_mv as u32 / ADC_MAX as u32
}

/// Integer mean of a block of samples (0 for an empty block)
pub fn mean(samples: &[Sample]) -> Sample {
    if samples.is_empty() {
        return 0;
    }
    let sum: u32 = samples.iter().map(|&s| s as u32).sum();
    (sum / samples.len() as u32) as Sample
}
