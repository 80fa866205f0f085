//! PWM-paced ADC sample source
//!
//! [`FreeRunningAdc`] and [`Pacer`] own the peripherals for the lifetime of
//! acquisition. [`PacedAdc`] is a lightweight register handle implementing
//! [`SampleSource`]; the interrupt handler and the main loop each get one.

use embassy_rp::adc::{self, Adc, Blocking};
use embassy_rp::gpio::Pull;
use embassy_rp::pac;
use embassy_rp::peripherals::{ADC, PIN_26, PWM_SLICE0};
use embassy_rp::pwm::{self, Pwm};
use embassy_rp::Peri;
use scopeline_hal::{Sample, SampleSource};

use crate::pacer::{PacerTiming, DREQ_PWM_WRAP0};

/// ADC converting channel 0 (GPIO26) back to back
pub struct FreeRunningAdc<'d> {
    _adc: Adc<'d, Blocking>,
    _channel: adc::Channel<'d>,
}

impl<'d> FreeRunningAdc<'d> {
    pub fn new(adc: Peri<'d, ADC>, pin: Peri<'d, PIN_26>) -> Self {
        // Powers the block and disables the pad's digital input
        let adc = Adc::new_blocking(adc, adc::Config::default());
        let channel = adc::Channel::new_pin(pin, Pull::None);

        pac::ADC.cs().modify(|w| {
            w.set_ainsel(0);
            w.set_start_many(true);
        });

        Self {
            _adc: adc,
            _channel: channel,
        }
    }
}

/// PWM slice 0 wrapping at the sample rate
///
/// Created disabled; [`PacedAdc::start`] enables it.
pub struct Pacer<'d> {
    _pwm: Pwm<'d>,
}

impl<'d> Pacer<'d> {
    const SLICE: usize = 0;

    pub fn new(slice: Peri<'d, PWM_SLICE0>, timing: PacerTiming) -> Self {
        let mut config = pwm::Config::default();
        config.divider = timing.divider;
        config.top = timing.top;
        config.enable = false;

        Self {
            _pwm: Pwm::new_free(slice, config),
        }
    }

    /// DREQ raised on every wrap
    pub fn dreq(&self) -> u8 {
        DREQ_PWM_WRAP0 + Self::SLICE as u8
    }

    /// A sample-source handle onto this pacer
    pub fn source(&self) -> PacedAdc {
        PacedAdc { slice: Self::SLICE }
    }
}

/// Register handle: ADC result register paced by a PWM slice
pub struct PacedAdc {
    slice: usize,
}

impl SampleSource for PacedAdc {
    fn data_register(&self) -> *const Sample {
        // RESULT occupies the low halfword of the 32-bit register
        pac::ADC.result().as_ptr() as *const Sample
    }

    fn start(&mut self) {
        let ch = pac::PWM.ch(self.slice);
        ch.ctr().write(|w| w.set_ctr(0));
        ch.csr().modify(|w| w.set_en(true));
    }

    fn stop(&mut self) {
        pac::PWM.ch(self.slice).csr().modify(|w| w.set_en(false));
    }

    fn is_running(&self) -> bool {
        pac::PWM.ch(self.slice).csr().read().en()
    }
}
