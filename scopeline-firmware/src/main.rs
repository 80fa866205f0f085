//! Scopeline - Single-Channel Oscilloscope Firmware
//!
//! Samples GPIO26 at a fixed rate into a ring of DMA-filled segments. The
//! main loop draws every completed segment on an ILI9341 and relays it as a
//! checksummed frame over UART0.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{self, BufferedInterruptHandler, Uart};
use embassy_time::{Duration, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use scopeline_core::{Acquisition, FrameRelay, Scheduler, Tick};
use scopeline_hal::transport::{DataBits, Parity, SerialConfig, StopBits};
use scopeline_hal_rp2040::{
    DmaEngine, FreeRunningAdc, Pacer, PacerTiming, SerialTransport, SYS_CLK_HZ,
};
use scopeline_protocol::frame_len;

use crate::acquisition::{SAMPLE_RATE_HZ, SEGMENTS, SEGMENT_LEN};
use crate::channels::SEGMENT_READY;
use crate::telemetry::TraceLog;

mod acquisition;
mod channels;
mod config;
mod display;
mod telemetry;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// One encoded segment
const FRAME_LEN: usize = frame_len(SEGMENT_LEN);

/// Time to fill one segment
const SEGMENT_PERIOD_US: u32 = (SEGMENT_LEN as u32 * 1_000_000) / SAMPLE_RATE_HZ;

/// Longest wait without a completion signal before ticking anyway
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Sweeps between status lines
const STATUS_INTERVAL: u32 = 8;

// UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 16]> = StaticCell::new();

/// Map the configured framing onto the RP2040 UART
fn uart_config(serial: &SerialConfig) -> uart::Config {
    let mut config = uart::Config::default();
    config.baudrate = serial.baudrate;
    config.data_bits = match serial.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    config.parity = match serial.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    config.stop_bits = match serial.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    config
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Scopeline firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    // Relay link; the receive half is unused
    let uart_config = uart_config(&config.serial);

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 16]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let (tx, _rx) = uart.into_buffered(Irqs, tx_buf, rx_buf).split();
    let relay = FrameRelay::<_, FRAME_LEN>::new(SerialTransport::new(tx));

    let airtime_us = config.serial.transmit_time_us(FRAME_LEN);
    info!(
        "UART0 relay at {} baud, {} bits per byte, {} us per frame",
        config.serial.baudrate,
        config.serial.bits_per_byte(),
        airtime_us
    );
    if airtime_us > SEGMENT_PERIOD_US {
        warn!(
            "Frames take {} us on the wire but a segment fills every {} us; the UART buffer will back up",
            airtime_us, SEGMENT_PERIOD_US
        );
    }

    // TFT on SPI0
    let mut spi_config = spi::Config::default();
    spi_config.frequency = 40_000_000;
    let bus = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_20, Level::Low);
    let mut reset = Output::new(p.PIN_21, Level::High);

    let renderer = match display::bring_up(bus, cs, dc, &mut reset, &config).await {
        Ok(renderer) => {
            info!("ILI9341 ready");
            // Leave the banner up for a moment
            Timer::after_secs(1).await;
            Some(renderer)
        }
        Err(e) => {
            error!("Display bring-up failed: {}", e);
            warn!("Continuing with serial relay only");
            None
        }
    };

    // Acquisition: free-running ADC, PWM wrap paces DMA
    let Some(timing) = PacerTiming::for_rate(SYS_CLK_HZ, SAMPLE_RATE_HZ) else {
        error!("No PWM timing for {} Hz", SAMPLE_RATE_HZ);
        return;
    };

    let _adc = FreeRunningAdc::new(p.ADC, p.PIN_26);
    let pacer = Pacer::new(p.PWM_SLICE0, timing);
    let dma = DmaEngine::new(p.DMA_CH3, pacer.dreq());

    let mut hw = Acquisition::new(pacer.source(), dma.handle());
    acquisition::install(Acquisition::new(pacer.source(), dma));

    info!(
        "Sampling at {} mHz (top {}), {} x {} samples",
        timing.rate_mhz(SYS_CLK_HZ),
        timing.top,
        SEGMENTS,
        SEGMENT_LEN
    );

    let mut sink = ((relay, renderer), TraceLog::new(config.adc.vref_mv));
    let mut scheduler = Scheduler::new(&acquisition::RING, config.acquisition);

    if let Err(e) = scheduler.start(&mut hw, &mut sink) {
        warn!("Sink error at start: {:?}", Debug2Format(&e));
    }
    info!("Acquisition running");

    let mut last_status = 0;
    loop {
        match scheduler.tick(&mut hw, &mut sink) {
            Ok(Tick::Consumed(n)) => {
                trace!("Consumed {} segments", n);
            }
            Ok(Tick::Idle) => {
                let woken = select(SEGMENT_READY.wait(), Timer::after(IDLE_POLL)).await;
                if let Either::Second(()) = woken {
                    trace!("No completion within {} ms", IDLE_POLL.as_millis());
                }
            }
            Ok(Tick::Halted) => {
                info!("Single shot captured, acquisition halted");
                loop {
                    Timer::after_secs(60).await;
                    trace!("Main loop heartbeat");
                }
            }
            Err(e) => {
                warn!("Sink error: {:?}", Debug2Format(&e));
            }
        }

        let stats = scheduler.stats();
        if stats.sweeps.wrapping_sub(last_status) >= STATUS_INTERVAL {
            last_status = stats.sweeps;
            let (completions, spurious) = acquisition::completions();
            info!(
                "Sweeps {}, segments {}, restarts {}, interrupts {} ({} stale), frames {}",
                stats.sweeps,
                stats.segments,
                stats.restarts,
                completions,
                spurious,
                (sink.0).0.frames()
            );
        }
    }
}
