//! In-memory display controller for host tests

use std::vec;
use std::vec::Vec;

use scopeline_hal::DisplayController;

/// Framebuffer-backed controller with TFT window semantics
///
/// Pixels written past the end of the window are discarded, like a
/// controller that stops at the window end.
pub struct MockDisplay {
    width: u16,
    height: u16,
    pub pixels: Vec<u16>,
    window: (u16, u16, u16, u16),
    cursor: Option<(u16, u16)>,
    pub window_calls: usize,
    pub pixel_writes: usize,
}

impl MockDisplay {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            window: (0, 0, width.saturating_sub(1), height.saturating_sub(1)),
            cursor: Some((0, 0)),
            window_calls: 0,
            pixel_writes: 0,
        }
    }

    pub fn pixel(&self, x: u16, y: u16) -> u16 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    /// Coordinates of every pixel with `color`
    pub fn lit(&self, color: u16) -> Vec<(u16, u16)> {
        let mut out = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixel(x, y) == color {
                    out.push((x, y));
                }
            }
        }
        out
    }
}

impl DisplayController for MockDisplay {
    type Error = ();

    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), ()> {
        if x0 > x1 || y0 > y1 || x1 >= self.width || y1 >= self.height {
            return Err(());
        }
        self.window = (x0, y0, x1, y1);
        self.cursor = Some((x0, y0));
        self.window_calls += 1;
        Ok(())
    }

    fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), ()> {
        let (x0, y0, x1, y1) = self.window;
        if x < x0 || x > x1 || y < y0 || y > y1 {
            return Err(());
        }
        self.cursor = Some((x, y));
        Ok(())
    }

    fn write_pixel(&mut self, color: u16) -> Result<(), ()> {
        let Some((x, y)) = self.cursor else {
            return Ok(());
        };
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] = color;
        self.pixel_writes += 1;

        let (x0, _, x1, y1) = self.window;
        self.cursor = if x < x1 {
            Some((x + 1, y))
        } else if y < y1 {
            Some((x0, y + 1))
        } else {
            None
        };
        Ok(())
    }

    fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }
}
