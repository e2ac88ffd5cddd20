use std::io::{Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::debug;

use crate::config::SerialConfig;
use crate::traits::{Connector, SerialLink};

/// Driver poll interval. Reads that see no data within this window return
/// `TimedOut` and are retried by the connection manager.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Opens real OS serial ports through the `serialport` crate (8N1, no flow
/// control).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConnector;

impl Connector for SystemConnector {
    fn connect(&self, config: &SerialConfig) -> std::io::Result<Box<dyn SerialLink>> {
        let port = serialport::new(&config.path, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(POLL_INTERVAL)
            .open()?;
        debug!(path = %config.path, baud = config.baud_rate, "opened serial port");
        Ok(Box::new(SystemLink { port }))
    }

    fn name(&self) -> &'static str {
        "system-serial"
    }
}

struct SystemLink {
    port: Box<dyn SerialPort>,
}

impl Read for SystemLink {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SystemLink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.port.flush()
    }
}

impl SerialLink for SystemLink {
    fn clear_buffers(&mut self) -> std::io::Result<()> {
        self.port.clear(ClearBuffer::All).map_err(Into::into)
    }
}
