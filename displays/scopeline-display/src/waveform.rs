//! Segment waveform renderer
//!
//! Each consumed segment occupies a horizontal slot of `pixel_width`
//! columns at `position * pixel_width`. Within a segment consecutive
//! column points are joined with lines. In continuous trace mode the first
//! point also joins the last point of the previous slot, as long as that
//! slot was drawn earlier in the same sweep.

use embedded_graphics::prelude::Point;
use scopeline_core::config::{AcquisitionConfig, DisplayConfig, TraceMode};
use scopeline_core::{Sample, SegmentSink};
use scopeline_hal::DisplayController;

use crate::canvas::Canvas;
use crate::downsample::{pixel_width, Columns};

pub struct WaveformRenderer<D> {
    canvas: Canvas<D>,
    segments_per_screen: u16,
    foreground: u16,
    background: u16,
    trace: TraceMode,
    /// Last point drawn and the slot it belongs to
    last: Option<(usize, Point)>,
}

impl<D: DisplayController> WaveformRenderer<D> {
    pub fn new(canvas: Canvas<D>, acquisition: &AcquisitionConfig, display: &DisplayConfig) -> Self {
        Self {
            canvas,
            segments_per_screen: acquisition.segments_per_screen,
            foreground: display.foreground,
            background: display.background,
            trace: display.trace,
            last: None,
        }
    }

    pub fn canvas(&self) -> &Canvas<D> {
        &self.canvas
    }

    /// Clear the drawing area and forget the trace
    pub fn clear(&mut self) -> Result<(), D::Error> {
        self.last = None;
        self.canvas.fill_screen(self.background)
    }

    /// Draw one segment into slot `position`
    pub fn draw_segment(&mut self, position: usize, samples: &[Sample]) -> Result<(), D::Error> {
        if samples.is_empty() {
            return Ok(());
        }
        let viewport = self.canvas.viewport();
        let Some(pw) = pixel_width(viewport.width, self.segments_per_screen) else {
            return Ok(());
        };

        let x_start = i32::try_from(position)
            .unwrap_or(i32::MAX)
            .saturating_mul(pw as i32);

        let mut prev = match (self.trace, self.last) {
            (TraceMode::Continuous, Some((slot, point))) if slot + 1 == position => Some(point),
            _ => None,
        };

        for (i, value) in Columns::new(samples, pw).enumerate() {
            let point = Point::new(x_start.saturating_add(i as i32), viewport.row(value) as i32);
            match prev {
                Some(from) => self.canvas.draw_line(from, point, self.foreground)?,
                None => self.canvas.draw_pixel(point, self.foreground)?,
            }
            prev = Some(point);
        }

        self.last = prev.map(|point| (position, point));
        Ok(())
    }
}

impl<D: DisplayController> SegmentSink for WaveformRenderer<D> {
    type Error = D::Error;

    fn begin_sweep(&mut self) -> Result<(), Self::Error> {
        self.clear()
    }

    fn consume(&mut self, position: usize, samples: &[Sample]) -> Result<(), Self::Error> {
        self.draw_segment(position, samples)
    }
}

#[cfg(test)]
mod tests {
    use scopeline_core::ADC_MAX;

    use super::*;
    use crate::mock::MockDisplay;

    const FG: u16 = 0x07E0;
    const BG: u16 = 0x0001;

    /// 40x10 screen, 4 slots of 10 columns
    fn renderer(trace: TraceMode) -> WaveformRenderer<MockDisplay> {
        let acquisition = AcquisitionConfig {
            segments_per_screen: 4,
            ..AcquisitionConfig::default()
        };
        let display = DisplayConfig {
            width: 40,
            height: 10,
            foreground: FG,
            background: BG,
            trace,
        };
        WaveformRenderer::new(Canvas::new(MockDisplay::new(40, 10)), &acquisition, &display)
    }

    fn lit(r: &WaveformRenderer<MockDisplay>) -> std::vec::Vec<(u16, u16)> {
        r.canvas().display().lit(FG)
    }

    #[test]
    fn test_flat_segment_at_bottom() {
        let mut r = renderer(TraceMode::Segmented);
        r.draw_segment(0, &[0; 20]).unwrap();
        let expected: std::vec::Vec<(u16, u16)> = (0..10).map(|x| (x, 9)).collect();
        assert_eq!(lit(&r), expected);
    }

    #[test]
    fn test_position_offsets_slot() {
        let mut r = renderer(TraceMode::Segmented);
        r.draw_segment(2, &[ADC_MAX; 20]).unwrap();
        let expected: std::vec::Vec<(u16, u16)> = (20..30).map(|x| (x, 0)).collect();
        assert_eq!(lit(&r), expected);
    }

    #[test]
    fn test_segmented_does_not_chain() {
        let mut r = renderer(TraceMode::Segmented);
        r.draw_segment(0, &[0; 20]).unwrap();
        r.draw_segment(1, &[ADC_MAX; 20]).unwrap();
        let d = r.canvas().display();
        assert_eq!(d.pixel(10, 0), FG);
        assert!((1..9).all(|y| d.pixel(9, y) != FG && d.pixel(10, y) != FG));
    }

    #[test]
    fn test_continuous_chains_adjacent_slot() {
        let mut r = renderer(TraceMode::Continuous);
        r.draw_segment(0, &[0; 20]).unwrap();
        r.draw_segment(1, &[ADC_MAX; 20]).unwrap();
        let d = r.canvas().display();
        // Line from (9, 9) up to (10, 0) covers every row in those columns
        assert!((0..10).all(|y| d.pixel(9, y) == FG || d.pixel(10, y) == FG));
    }

    #[test]
    fn test_continuous_skips_non_adjacent_slot() {
        let mut r = renderer(TraceMode::Continuous);
        r.draw_segment(0, &[0; 20]).unwrap();
        r.draw_segment(2, &[ADC_MAX; 20]).unwrap();
        let d = r.canvas().display();
        assert!((1..9).all(|y| (9..=20).all(|x| d.pixel(x, y) != FG)));
    }

    #[test]
    fn test_begin_sweep_clears_and_breaks_chain() {
        let mut r = renderer(TraceMode::Continuous);
        r.draw_segment(0, &[0; 20]).unwrap();
        r.begin_sweep().unwrap();
        assert!(lit(&r).is_empty());
        assert_eq!(r.canvas().display().pixel(0, 0), BG);

        r.consume(1, &[ADC_MAX; 20]).unwrap();
        let d = r.canvas().display();
        assert!((1..10).all(|y| d.pixel(10, y) != FG));
    }

    #[test]
    fn test_degenerate_inputs_are_noops() {
        let mut r = renderer(TraceMode::Segmented);
        r.draw_segment(0, &[]).unwrap();
        // Slot past the screen edge
        r.draw_segment(4, &[0; 20]).unwrap();
        assert!(lit(&r).is_empty());

        let acquisition = AcquisitionConfig {
            segments_per_screen: 0,
            ..AcquisitionConfig::default()
        };
        let mut r = WaveformRenderer::new(
            Canvas::new(MockDisplay::new(40, 10)),
            &acquisition,
            &DisplayConfig::default(),
        );
        r.draw_segment(0, &[0; 20]).unwrap();
        assert_eq!(r.canvas().display().pixel_writes, 0);
    }
}
