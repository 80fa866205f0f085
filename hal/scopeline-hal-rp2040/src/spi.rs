//! Exclusive SPI device over a bus and a chip-select pin
//!
//! The display is the only device on its bus, so a device owns the bus
//! outright and asserts chip select around each transaction.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{self, ErrorKind, Operation, SpiBus, SpiDevice};

/// Errors from a [`ChipSelectDevice`] transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError<B, P> {
    Bus(B),
    ChipSelect(P),
}

impl<B: spi::Error, P: core::fmt::Debug> spi::Error for DeviceError<B, P> {
    fn kind(&self) -> ErrorKind {
        match self {
            DeviceError::Bus(e) => e.kind(),
            DeviceError::ChipSelect(_) => ErrorKind::ChipSelectFault,
        }
    }
}

pub struct ChipSelectDevice<BUS, CS> {
    bus: BUS,
    cs: CS,
}

impl<BUS, CS: OutputPin> ChipSelectDevice<BUS, CS> {
    /// Take the bus and chip select, leaving the device deselected
    pub fn new(bus: BUS, mut cs: CS) -> Result<Self, CS::Error> {
        cs.set_high()?;
        Ok(Self { bus, cs })
    }
}

impl<BUS, CS> spi::ErrorType for ChipSelectDevice<BUS, CS>
where
    BUS: SpiBus,
    CS: OutputPin,
{
    type Error = DeviceError<BUS::Error, CS::Error>;
}

impl<BUS, CS> SpiDevice for ChipSelectDevice<BUS, CS>
where
    BUS: SpiBus,
    CS: OutputPin,
{
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        self.cs.set_low().map_err(DeviceError::ChipSelect)?;

        let result = run(&mut self.bus, operations);
        // Flush before deselecting even when an operation failed
        let flushed = self.bus.flush();
        let deselected = self.cs.set_high();

        result.map_err(DeviceError::Bus)?;
        flushed.map_err(DeviceError::Bus)?;
        deselected.map_err(DeviceError::ChipSelect)
    }
}

fn run<BUS: SpiBus>(bus: &mut BUS, operations: &mut [Operation<'_, u8>]) -> Result<(), BUS::Error> {
    for op in operations {
        match op {
            Operation::Read(buf) => bus.read(buf)?,
            Operation::Write(buf) => bus.write(buf)?,
            Operation::Transfer(read, write) => bus.transfer(read, write)?,
            Operation::TransferInPlace(buf) => bus.transfer_in_place(buf)?,
            Operation::DelayNs(_) => {
                // No delay source; flush so the bus is idle before continuing
                bus.flush()?;
            }
        }
    }
    Ok(())
}
