//! ILI9341 TFT driver
//!
//! Drives a 240x320 ILI9341 over an `embedded-hal` SPI device with a
//! separate data/command pin, in 16-bit RGB565 mode.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use scopeline_hal::DisplayController;

/// Display driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// SPI transfer failed
    Communication,
    /// Data/command pin could not be driven
    Pin,
    /// Window or cursor outside the panel
    InvalidCoordinates,
}

/// ILI9341 commands
mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPOUT: u8 = 0x11;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const PASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const COLMOD: u8 = 0x3A;
}

/// Pixel format argument for 16 bits per pixel
const COLMOD_RGB565: u8 = 0x55;

/// Panel orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// 240 wide, 320 tall
    Portrait,
    /// 320 wide, 240 tall
    #[default]
    Landscape,
}

impl Orientation {
    /// MADCTL value (BGR panel)
    const fn madctl(self) -> u8 {
        match self {
            Orientation::Portrait => 0x48,
            Orientation::Landscape => 0x28,
        }
    }

    /// Panel size as `(width, height)` in this orientation
    pub const fn dimensions(self) -> (u16, u16) {
        match self {
            Orientation::Portrait => (240, 320),
            Orientation::Landscape => (320, 240),
        }
    }

    /// The orientation whose dimensions are exactly `width` x `height`
    pub fn for_size(width: u16, height: u16) -> Option<Self> {
        [Orientation::Landscape, Orientation::Portrait]
            .into_iter()
            .find(|o| o.dimensions() == (width, height))
    }
}

/// Bytes per `write_pixels` chunk
const FILL_CHUNK: usize = 64;

pub struct Ili9341<SPI, DC> {
    spi: SPI,
    dc: DC,
    width: u16,
    height: u16,
    /// Inclusive end corner of the current address window
    window_end: (u16, u16),
}

impl<SPI, DC> Ili9341<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    pub fn new(spi: SPI, dc: DC, orientation: Orientation) -> Self {
        let (width, height) = orientation.dimensions();
        Self {
            spi,
            dc,
            width,
            height,
            window_end: (width - 1, height - 1),
        }
    }

    /// Reset and configure the panel
    pub fn init(
        &mut self,
        orientation: Orientation,
        delay: &mut impl DelayNs,
    ) -> Result<(), DisplayError> {
        self.command(cmd::SWRESET, &[])?;
        delay.delay_ms(120);
        self.command(cmd::SLPOUT, &[])?;
        delay.delay_ms(120);
        self.command(cmd::COLMOD, &[COLMOD_RGB565])?;
        self.command(cmd::MADCTL, &[orientation.madctl()])?;
        self.command(cmd::DISPON, &[])?;
        delay.delay_ms(20);

        let (width, height) = orientation.dimensions();
        self.width = width;
        self.height = height;
        self.window_end = (width - 1, height - 1);
        Ok(())
    }

    fn command(&mut self, command: u8, args: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::Pin)?;
        self.spi
            .write(&[command])
            .map_err(|_| DisplayError::Communication)?;
        if !args.is_empty() {
            self.data(args)?;
        }
        Ok(())
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::Pin)?;
        self.spi
            .write(bytes)
            .map_err(|_| DisplayError::Communication)
    }

    /// Program the address window and open a memory write
    fn address(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), DisplayError> {
        let [x0h, x0l] = x0.to_be_bytes();
        let [x1h, x1l] = x1.to_be_bytes();
        let [y0h, y0l] = y0.to_be_bytes();
        let [y1h, y1l] = y1.to_be_bytes();
        self.command(cmd::CASET, &[x0h, x0l, x1h, x1l])?;
        self.command(cmd::PASET, &[y0h, y0l, y1h, y1l])?;
        self.command(cmd::RAMWR, &[])
    }
}

impl<SPI, DC> DisplayController for Ili9341<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
{
    type Error = DisplayError;

    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), DisplayError> {
        if x0 > x1 || y0 > y1 || x1 >= self.width || y1 >= self.height {
            return Err(DisplayError::InvalidCoordinates);
        }
        self.window_end = (x1, y1);
        self.address(x0, y0, x1, y1)
    }

    fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), DisplayError> {
        let (x1, y1) = self.window_end;
        if x > x1 || y > y1 {
            return Err(DisplayError::InvalidCoordinates);
        }
        self.address(x, y, x1, y1)
    }

    fn write_pixel(&mut self, color: u16) -> Result<(), DisplayError> {
        self.data(&color.to_be_bytes())
    }

    fn write_pixels(&mut self, color: u16, count: u32) -> Result<(), DisplayError> {
        let [hi, lo] = color.to_be_bytes();
        let mut chunk = [0u8; FILL_CHUNK];
        for pair in chunk.chunks_exact_mut(2) {
            pair[0] = hi;
            pair[1] = lo;
        }

        let mut remaining = count as usize * 2;
        while remaining > 0 {
            let n = remaining.min(FILL_CHUNK);
            self.data(&chunk[..n])?;
            remaining -= n;
        }
        Ok(())
    }

    fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }
}
