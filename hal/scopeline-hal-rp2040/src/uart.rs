//! Serial relay transport
//!
//! Wraps any blocking `embedded-io` writer, such as an embassy-rp `UartTx`,
//! as a [`Transport`].

use embedded_io::Write;
use scopeline_hal::Transport;

pub struct SerialTransport<W> {
    writer: W,
}

impl<W: Write> SerialTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Transport for SerialTransport<W> {
    type Error = W::Error;

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.writer.write_all(data)?;
        self.writer.flush()
    }
}
