//! Acquisition wiring
//!
//! The segment ring and the interrupt-side completion handler are statics.
//! The main loop owns a second [`Hardware`] handle onto the same ADC pacer
//! and DMA channel for start, stop and restart.

use core::cell::RefCell;

use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use scopeline_core::{Acquisition, CompletionHandler, SegmentRing};
use scopeline_hal_rp2040::{DmaEngine, PacedAdc};

use crate::channels::SEGMENT_READY;

/// Samples per segment
pub const SEGMENT_LEN: usize = 40;
/// Segments in the ring
pub const SEGMENTS: usize = 16;
pub const SAMPLE_RATE_HZ: u32 = 200;

pub type Hardware = Acquisition<PacedAdc, DmaEngine>;

type Handler = CompletionHandler<'static, PacedAdc, DmaEngine, SEGMENT_LEN, SEGMENTS>;

pub static RING: SegmentRing<SEGMENT_LEN, SEGMENTS> = SegmentRing::new();

static HANDLER: Mutex<CriticalSectionRawMutex, RefCell<Option<Handler>>> =
    Mutex::new(RefCell::new(None));

/// Hand `hw` to the completion interrupt and unmask `DMA_IRQ_1`
pub fn install(hw: Hardware) {
    HANDLER.lock(|cell| {
        cell.replace(Some(CompletionHandler::new(&RING, hw)));
    });

    interrupt::DMA_IRQ_1.set_priority(Priority::P1);
    // SAFETY: the handler is in place before the interrupt can fire
    unsafe { interrupt::DMA_IRQ_1.enable() };
}

/// Completion interrupts handled since boot, and those that found no
/// completion pending
pub fn completions() -> (u32, u32) {
    HANDLER.lock(|cell| {
        cell.borrow()
            .as_ref()
            .map_or((0, 0), |h| (h.completions(), h.spurious()))
    })
}

#[interrupt]
unsafe fn DMA_IRQ_1() {
    let completed = HANDLER.lock(|cell| {
        cell.borrow_mut()
            .as_mut()
            .and_then(|handler| handler.on_transfer_complete())
    });
    if completed.is_some() {
        SEGMENT_READY.signal(());
    }
}
