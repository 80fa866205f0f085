//! TFT bring-up
//!
//! ILI9341 on SPI0 (SCK GPIO18, MOSI GPIO19, CS GPIO17, DC GPIO20,
//! RESET GPIO21).

use defmt::warn;
use embassy_rp::gpio::Output;
use embassy_time::{Delay, Timer};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use scopeline_core::config::ScopeConfig;
use scopeline_display::ili9341::Orientation;
use scopeline_display::{Canvas, DisplayError, Ili9341, WaveformRenderer};
use scopeline_hal_rp2040::ChipSelectDevice;

pub type Scope<BUS, CS, DC> = WaveformRenderer<Ili9341<ChipSelectDevice<BUS, CS>, DC>>;

/// Reset the panel, show the boot banner and build the renderer
pub async fn bring_up<BUS, CS, DC>(
    bus: BUS,
    cs: CS,
    dc: DC,
    reset: &mut Output<'_>,
    config: &ScopeConfig,
) -> Result<Scope<BUS, CS, DC>, DisplayError>
where
    BUS: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
{
    let spi = ChipSelectDevice::new(bus, cs).map_err(|_| DisplayError::Pin)?;

    reset.set_low();
    Timer::after_millis(10).await;
    reset.set_high();
    Timer::after_millis(120).await;

    let (width, height) = (config.display.width, config.display.height);
    let orientation = Orientation::for_size(width, height).unwrap_or_else(|| {
        let fallback = if height > width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        };
        let (w, h) = fallback.dimensions();
        warn!(
            "Panel cannot be {}x{}, drawing at {}x{} instead",
            width, height, w, h
        );
        fallback
    });
    let mut tft = Ili9341::new(spi, dc, orientation);
    tft.init(orientation, &mut Delay)?;

    let mut canvas = Canvas::new(tft);
    canvas.fill_screen(config.display.background)?;

    let style = MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE);
    Text::new("Scopeline", Point::new(4, 12), style).draw(&mut canvas)?;
    Text::new("Acquiring...", Point::new(4, 24), style).draw(&mut canvas)?;

    Ok(WaveformRenderer::new(
        canvas,
        &config.acquisition,
        &config.display,
    ))
}
