//! DMA channel transfer engine
//!
//! One channel copies half-words from a fixed read address (the ADC result)
//! into an incrementing write address, one per DREQ. Completion raises
//! `DMA_IRQ_1`; embassy-rp reserves `DMA_IRQ_0` for its own transfers.

use embassy_rp::dma::Channel;
use embassy_rp::pac;
use embassy_rp::pac::dma::vals::{DataSize, TreqSel};
use embassy_rp::Peri;
use scopeline_hal::{Sample, TransferEngine, TransferTarget};

/// Register handle onto one DMA channel
///
/// [`DmaEngine::handle`] makes a second handle for another execution
/// context; both address the same channel registers.
pub struct DmaEngine {
    channel: u8,
    dreq: u8,
}

impl DmaEngine {
    /// Claim `channel`, paced by `dreq`, and route its completion to `DMA_IRQ_1`
    pub fn new<C: Channel>(channel: Peri<'static, C>, dreq: u8) -> Self {
        let engine = Self {
            channel: channel.number() as u8,
            dreq,
        };
        let mask = engine.mask();
        pac::DMA.inte1().modify(|w| *w |= mask);
        engine
    }

    pub fn handle(&self) -> Self {
        Self {
            channel: self.channel,
            dreq: self.dreq,
        }
    }

    fn mask(&self) -> u32 {
        1 << self.channel
    }

    fn regs(&self) -> pac::dma::Channel {
        pac::DMA.ch(self.channel as usize)
    }
}

impl TransferEngine for DmaEngine {
    fn configure(&mut self, source: *const Sample, target: TransferTarget) {
        let ch = self.regs();
        ch.read_addr().write_value(source as u32);
        ch.write_addr().write_value(target.address as u32);
        ch.trans_count().write_value(target.count as u32);
    }

    fn arm(&mut self) {
        let channel = self.channel;
        let dreq = self.dreq;
        self.regs().ctrl_trig().write(|w| {
            w.set_treq_sel(TreqSel::from_bits(dreq));
            w.set_data_size(DataSize::SIZE_HALFWORD);
            w.set_incr_read(false);
            w.set_incr_write(true);
            // Chaining to itself disables chaining
            w.set_chain_to(channel);
            w.set_en(true);
        });
    }

    fn disable(&mut self) {
        let channel = self.channel;
        pac::DMA
            .chan_abort()
            .modify(|w| w.set_chan_abort(1 << channel));
        while self.regs().ctrl_trig().read().busy() {}
    }

    fn take_completion(&mut self) -> bool {
        let mask = self.mask();
        if pac::DMA.ints1().read() & mask == 0 {
            return false;
        }
        // Write-one-to-clear
        pac::DMA.ints1().write_value(mask);
        true
    }

    fn is_armed(&self) -> bool {
        self.regs().ctrl_trig().read().busy()
    }
}
