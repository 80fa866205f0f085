//! Simulated acquisition hardware for host tests
//!
//! The source and engine halves share one [`Bus`]. Each simulated trigger
//! period writes a counter value into the current target, so consumers can
//! check that a segment holds one contiguous run of samples.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use scopeline_hal::{Sample, SampleSource, TransferEngine, TransferTarget};

use crate::handler::{Acquisition, CompletionHandler};
use crate::ring::{SegmentIndex, SegmentRing};

static DATA_REGISTER: Sample = 0;

#[derive(Debug, Default)]
pub struct Bus {
    pub running: bool,
    pub armed: bool,
    pub target: Option<TransferTarget>,
    /// Samples written into the current target
    pub written: usize,
    /// Completion status bit, set when a transfer finishes
    pub pending_completion: bool,
    /// Value the next trigger period produces
    pub next_value: Sample,
}

type SharedBus = Rc<RefCell<Bus>>;

pub struct SimSource(SharedBus);

impl SampleSource for SimSource {
    fn data_register(&self) -> *const Sample {
        &DATA_REGISTER as *const Sample
    }

    fn start(&mut self) {
        self.0.borrow_mut().running = true;
    }

    fn stop(&mut self) {
        self.0.borrow_mut().running = false;
    }

    fn is_running(&self) -> bool {
        self.0.borrow().running
    }
}

pub struct SimEngine(SharedBus);

impl TransferEngine for SimEngine {
    fn configure(&mut self, _source: *const Sample, target: TransferTarget) {
        let mut bus = self.0.borrow_mut();
        bus.target = Some(target);
        bus.written = 0;
    }

    fn arm(&mut self) {
        self.0.borrow_mut().armed = true;
    }

    fn disable(&mut self) {
        self.0.borrow_mut().armed = false;
    }

    fn take_completion(&mut self) -> bool {
        core::mem::take(&mut self.0.borrow_mut().pending_completion)
    }

    fn is_armed(&self) -> bool {
        self.0.borrow().armed
    }
}

pub type SimAcquisition = Acquisition<SimSource, SimEngine>;

/// Simulated peripheral plus the interrupt-side handler
pub struct Bench<'r, const S: usize, const K: usize> {
    bus: SharedBus,
    ring: &'r SegmentRing<S, K>,
    handler: CompletionHandler<'r, SimSource, SimEngine, S, K>,
}

impl<'r, const S: usize, const K: usize> Bench<'r, S, K> {
    /// Build the bench and a main-loop handle onto the same bus
    pub fn new(ring: &'r SegmentRing<S, K>) -> (Self, SimAcquisition) {
        let bus = SharedBus::default();
        let isr_side = Acquisition::new(SimSource(bus.clone()), SimEngine(bus.clone()));
        let main_side = Acquisition::new(SimSource(bus.clone()), SimEngine(bus.clone()));
        let bench = Self {
            bus,
            ring,
            handler: CompletionHandler::new(ring, isr_side),
        };
        (bench, main_side)
    }

    /// Run `periods` trigger periods, delivering completions as they occur
    pub fn produce(&mut self, periods: usize) {
        for _ in 0..periods {
            if self.trigger() {
                self.interrupt();
            }
        }
    }

    /// Deliver one completion interrupt, whether or not a transfer finished
    pub fn interrupt(&mut self) -> Option<SegmentIndex<K>> {
        self.handler.on_transfer_complete()
    }

    /// One trigger period; returns true when the transfer completed
    fn trigger(&mut self) -> bool {
        let mut bus = self.bus.borrow_mut();
        if !bus.running || !bus.armed {
            return false;
        }
        let Some(target) = bus.target else {
            return false;
        };
        let Some(index) = SegmentIndex::<K>::new(target.segment) else {
            return false;
        };

        let value = bus.next_value;
        let offset = bus.written;
        self.ring.segment(index).store(offset, value);
        bus.next_value = value.wrapping_add(1);
        bus.written += 1;

        if bus.written == target.count {
            bus.armed = false;
            bus.pending_completion = true;
            true
        } else {
            false
        }
    }

    pub fn bus(&self) -> Ref<'_, Bus> {
        self.bus.borrow()
    }

    pub fn bus_mut(&self) -> RefMut<'_, Bus> {
        self.bus.borrow_mut()
    }

    pub fn handler(&self) -> &CompletionHandler<'r, SimSource, SimEngine, S, K> {
        &self.handler
    }
}

/// True when `samples` is one run of consecutive counter values
pub fn is_contiguous(samples: &[Sample]) -> bool {
    samples.windows(2).all(|w| w[1] == w[0].wrapping_add(1))
}
