//! Bounds-checked drawing on a display controller
//!
//! Single pixels go through a full-screen window and `set_cursor`; filled
//! rectangles set a window of their own and stream one color. Anything
//! outside the screen is dropped without touching the controller.

use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Point, Size};
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::Pixel;
use scopeline_hal::DisplayController;

use crate::raster::Line;
use crate::viewport::Viewport;

pub struct Canvas<D> {
    display: D,
    width: u16,
    height: u16,
    /// The controller window currently spans the whole screen
    full_window: bool,
}

impl<D: DisplayController> Canvas<D> {
    pub fn new(display: D) -> Self {
        let (width, height) = display.dimensions();
        Self {
            display,
            width,
            height,
            full_window: false,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Plot one pixel; off-screen points are ignored
    pub fn draw_pixel(&mut self, point: Point, color: u16) -> Result<(), D::Error> {
        if !self.viewport().contains(point.x, point.y) {
            return Ok(());
        }
        if !self.full_window {
            self.display
                .set_window(0, 0, self.width - 1, self.height - 1)?;
            self.full_window = true;
        }
        self.display.set_cursor(point.x as u16, point.y as u16)?;
        self.display.write_pixel(color)
    }

    /// Draw a Bresenham line, clipping per pixel
    pub fn draw_line(&mut self, start: Point, end: Point, color: u16) -> Result<(), D::Error> {
        for point in Line::new(start, end) {
            self.draw_pixel(point, color)?;
        }
        Ok(())
    }

    /// Fill a rectangle, clipped to the screen
    pub fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: u16,
    ) -> Result<(), D::Error> {
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + width as i64).min(self.width as i64);
        let y1 = (y as i64 + height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }

        self.display
            .set_window(x0 as u16, y0 as u16, (x1 - 1) as u16, (y1 - 1) as u16)?;
        self.full_window = x0 == 0 && y0 == 0 && x1 == self.width as i64 && y1 == self.height as i64;
        self.display
            .write_pixels(color, ((x1 - x0) * (y1 - y0)) as u32)
    }

    /// Fill the whole screen
    pub fn fill_screen(&mut self, color: u16) -> Result<(), D::Error> {
        self.fill_rect(0, 0, self.width as u32, self.height as u32, color)
    }
}

impl<D: DisplayController> OriginDimensions for Canvas<D> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl<D: DisplayController> DrawTarget for Canvas<D> {
    type Color = Rgb565;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.draw_pixel(point, color.into_storage())?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width,
            area.size.height,
            color.into_storage(),
        )
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::mono_font::ascii::FONT_6X10;
    use embedded_graphics::mono_font::MonoTextStyle;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::PrimitiveStyle;
    use embedded_graphics::text::Text;

    use super::*;
    use crate::mock::MockDisplay;

    const FG: u16 = 0x07E0;

    #[test]
    fn test_draw_pixel_in_bounds() {
        let mut canvas = Canvas::new(MockDisplay::new(8, 6));
        canvas.draw_pixel(Point::new(3, 2), FG).unwrap();
        assert_eq!(canvas.display().lit(FG), [(3, 2)]);
    }

    #[test]
    fn test_out_of_bounds_dropped() {
        let mut canvas = Canvas::new(MockDisplay::new(8, 6));
        for p in [(-1, 0), (0, -1), (8, 0), (0, 6), (100, 100)] {
            canvas.draw_pixel(Point::new(p.0, p.1), FG).unwrap();
        }
        assert!(canvas.display().lit(FG).is_empty());
        assert_eq!(canvas.display().window_calls, 0);
    }

    #[test]
    fn test_full_window_set_once() {
        let mut canvas = Canvas::new(MockDisplay::new(8, 6));
        canvas.draw_pixel(Point::new(0, 0), FG).unwrap();
        canvas.draw_pixel(Point::new(1, 1), FG).unwrap();
        assert_eq!(canvas.display().window_calls, 1);

        // A partial fill moves the window, so the next pixel resets it
        canvas.fill_rect(2, 2, 2, 2, 0x1111).unwrap();
        canvas.draw_pixel(Point::new(7, 5), FG).unwrap();
        assert_eq!(canvas.display().window_calls, 3);
        assert_eq!(canvas.display().pixel(7, 5), FG);
    }

    #[test]
    fn test_line_clipped() {
        let mut canvas = Canvas::new(MockDisplay::new(4, 4));
        canvas
            .draw_line(Point::new(-2, 0), Point::new(5, 0), FG)
            .unwrap();
        assert_eq!(canvas.display().lit(FG), [(0, 0), (1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn test_fill_rect_clipped() {
        let mut canvas = Canvas::new(MockDisplay::new(4, 4));
        canvas.fill_rect(2, -1, 10, 2, FG).unwrap();
        assert_eq!(canvas.display().lit(FG), [(2, 0), (3, 0)]);

        canvas.fill_rect(10, 10, 3, 3, 0x2222).unwrap();
        canvas.fill_rect(0, 0, 0, 3, 0x2222).unwrap();
        assert!(canvas.display().lit(0x2222).is_empty());
    }

    #[test]
    fn test_fill_screen() {
        let mut canvas = Canvas::new(MockDisplay::new(5, 3));
        canvas.fill_screen(0xFFFF).unwrap();
        assert_eq!(canvas.display().lit(0xFFFF).len(), 15);
        assert_eq!(canvas.display().pixel_writes, 15);
    }

    #[test]
    fn test_embedded_graphics_fill() {
        let mut canvas = Canvas::new(MockDisplay::new(10, 10));
        Rectangle::new(Point::new(1, 1), Size::new(3, 2))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::RED))
            .draw(&mut canvas)
            .unwrap();
        assert_eq!(canvas.display().lit(Rgb565::RED.into_storage()).len(), 6);
    }

    #[test]
    fn test_embedded_graphics_text() {
        let mut canvas = Canvas::new(MockDisplay::new(64, 16));
        let style = MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE);
        Text::new("OK", Point::new(0, 8), style)
            .draw(&mut canvas)
            .unwrap();
        let lit = canvas.display().lit(Rgb565::WHITE.into_storage());
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, _)| x < 12));
    }
}
