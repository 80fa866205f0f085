//! Segment downsampling
//!
//! A segment of `S` samples occupies `pixel_width` columns on screen. Each
//! column shows the mean of a fixed-size window of samples; samples past
//! the last full window are not shown.

use core::ops::Range;

use scopeline_core::sample::{Sample, ADC_MAX};

/// Columns per segment for a screen `width` pixels wide
///
/// `None` when `segments_per_screen` is zero. Never less than one column.
pub fn pixel_width(width: u16, segments_per_screen: u16) -> Option<u16> {
    if segments_per_screen == 0 {
        return None;
    }
    Some((width / segments_per_screen).max(1))
}

/// Samples averaged into one column
pub fn samples_per_pixel(samples: usize, pixel_width: u16) -> usize {
    let pw = pixel_width as usize;
    if pw > 0 && samples > pw {
        (samples / pw).max(1)
    } else {
        1
    }
}

/// Per-column values of one segment
///
/// Yields exactly `pixel_width` values, each clamped to full scale.
pub struct Columns<'a> {
    samples: &'a [Sample],
    spp: usize,
    column: u16,
    pixel_width: u16,
}

impl<'a> Columns<'a> {
    pub fn new(samples: &'a [Sample], pixel_width: u16) -> Self {
        Self {
            samples,
            spp: samples_per_pixel(samples.len(), pixel_width),
            column: 0,
            pixel_width,
        }
    }

    pub fn samples_per_pixel(&self) -> usize {
        self.spp
    }

    /// Sample indices averaged into `column`
    ///
    /// Empty when the column starts past the end of the segment.
    pub fn window(&self, column: u16) -> Range<usize> {
        let len = self.samples.len();
        let start = column as usize * self.spp;
        start.min(len)..(start + self.spp).min(len)
    }

    fn value(&self, column: u16) -> Sample {
        let start = column as usize * self.spp;

        let value = match self.samples.get(self.window(column)) {
            Some(window) if !window.is_empty() => {
                let sum: u32 = window.iter().map(|&s| s as u32).sum();
                (sum / window.len() as u32) as Sample
            }
            // Past the end of the segment
            _ => self.samples.get(start).copied().unwrap_or(0),
        };

        value.min(ADC_MAX)
    }
}

impl Iterator for Columns<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.column >= self.pixel_width {
            return None;
        }
        let value = self.value(self.column);
        self.column += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.pixel_width - self.column) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Columns<'_> {}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;

    #[test]
    fn test_pixel_width() {
        assert_eq!(pixel_width(320, 16), Some(20));
        assert_eq!(pixel_width(320, 0), None);
        // Floored to one column
        assert_eq!(pixel_width(320, 400), Some(1));
    }

    #[test]
    fn test_windows_of_two() {
        let samples: Vec<Sample> = (0..40).map(|i| i * 10).collect();
        let columns = Columns::new(&samples, 20);
        assert_eq!(columns.samples_per_pixel(), 2);

        let values: Vec<Sample> = columns.collect();
        assert_eq!(values.len(), 20);
        assert_eq!(values[0], 5);
        assert_eq!(values[19], 385);
    }

    #[test]
    fn test_single_column_averages_everything() {
        let samples: Vec<Sample> = (0..40).collect();
        let values: Vec<Sample> = Columns::new(&samples, 1).collect();
        assert_eq!(values, [19]);
    }

    #[test]
    fn test_tail_sample_not_shown() {
        let mut samples = [100; 41];
        samples[40] = 4000;
        let mut columns = Columns::new(&samples, 20);
        assert_eq!(columns.samples_per_pixel(), 2);

        // Twenty full windows of two cover samples 0..40
        for column in 0..20 {
            let start = column as usize * 2;
            assert_eq!(columns.window(column), start..start + 2);
        }
        assert_eq!(columns.window(19), 38..40);
        assert!((0..20).all(|c| !columns.window(c).contains(&40)));

        assert!(columns.all(|v| v == 100));
    }

    #[test]
    fn test_windows_past_the_end_are_empty() {
        let samples = [300, 600];
        let columns = Columns::new(&samples, 4);
        assert_eq!(columns.window(1), 1..2);
        assert!(columns.window(2).is_empty());
        assert!(columns.window(3).is_empty());
    }

    #[test]
    fn test_more_columns_than_samples() {
        let samples = [300, 600];
        let values: Vec<Sample> = Columns::new(&samples, 4).collect();
        assert_eq!(values, [300, 600, 0, 0]);
    }

    #[test]
    fn test_values_clamped() {
        let values: Vec<Sample> = Columns::new(&[5000, 5000], 1).collect();
        assert_eq!(values, [ADC_MAX]);
    }

    #[test]
    fn test_empty_segment() {
        let values: Vec<Sample> = Columns::new(&[], 3).collect();
        assert_eq!(values, [0, 0, 0]);
    }
}
