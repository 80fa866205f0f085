//! Raster display controller abstraction
//!
//! Models the common TFT controller convention: an address window is set,
//! the write cursor is placed inside it, and each written pixel advances
//! the cursor through the window in controller order.

/// Windowed pixel-stream display controller
pub trait DisplayController {
    /// Error type for controller communication
    type Error;

    /// Set the address window (inclusive corners)
    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error>;

    /// Place the write cursor inside the current window
    fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), Self::Error>;

    /// Write one pixel at the cursor and advance it
    fn write_pixel(&mut self, color: u16) -> Result<(), Self::Error>;

    /// Write `count` pixels of the same color
    fn write_pixels(&mut self, color: u16, count: u32) -> Result<(), Self::Error> {
        for _ in 0..count {
            self.write_pixel(color)?;
        }
        Ok(())
    }

    /// Get the display dimensions in pixels (width, height)
    fn dimensions(&self) -> (u16, u16);
}
