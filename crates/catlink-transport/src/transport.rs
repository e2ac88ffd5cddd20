use std::fmt;
use std::io::ErrorKind;
use std::time::Duration;

use catlink_frame::{Dialect, Frame, FrameConfig, FrameError, FrameReader};
use catlink_serial::{Connector, ConnectionManager, SerialConfig, SystemConnector};
use tracing::{debug, error};

use crate::error::{Result, TransportError};

/// Configuration for a [`Transport`].
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Endpoint path, baud rate and read timeout.
    pub serial: SerialConfig,
    /// Dialect, markers and frame size bound.
    pub frame: FrameConfig,
}

/// One serial connection behind a `send`/`recv` contract.
///
/// Every I/O call blocks and takes `&mut self`; share a transport between
/// threads only behind external synchronization.
pub struct Transport {
    reader: FrameReader<ConnectionManager>,
}

impl Transport {
    /// Create a closed transport that opens real OS ports.
    pub fn new(config: TransportConfig) -> Self {
        Self::with_connector(config, SystemConnector)
    }

    /// Create a closed transport that opens links through `connector`.
    pub fn with_connector(config: TransportConfig, connector: impl Connector + 'static) -> Self {
        let connection = ConnectionManager::with_connector(config.serial, connector);
        Self {
            reader: FrameReader::with_config(connection, config.frame),
        }
    }

    /// Open the endpoint. Bytes buffered before this call, by the driver or
    /// by the frame reader, are discarded.
    ///
    /// If the driver buffers cannot be discarded the endpoint is left
    /// closed and the error is returned.
    pub fn open(&mut self) -> Result<()> {
        let opened = self.reader.get_mut().open();
        self.reader.reset();
        opened.map_err(TransportError::from)
    }

    /// Close the endpoint. Never fails.
    pub fn close(&mut self) {
        self.reader.get_mut().close();
        self.reader.reset();
    }

    /// Discard unread input and unwritten output.
    pub fn reset_buffer(&mut self) -> Result<()> {
        self.reader.get_mut().reset_buffer()?;
        self.reader.reset();
        Ok(())
    }

    /// Test reachability with a transient open/close. Never fails.
    pub fn probe(&mut self) -> bool {
        self.reader.get_mut().probe()
    }

    pub fn is_connected(&self) -> bool {
        self.reader.get_ref().is_connected()
    }

    /// Write raw bytes. A closed transport writes nothing and returns
    /// `Ok(())`.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        self.reader.get_mut().send(data)?;
        Ok(())
    }

    /// Receive the next frame, opening the endpoint first if needed.
    ///
    /// `Ok(None)` means the consumed bytes lacked the expected boundary; the
    /// stream is still usable.
    pub fn recv(&mut self) -> Result<Option<Frame>> {
        if !self.is_connected() {
            self.open()?;
        }
        self.reader.read_frame().map_err(|err| self.read_failed(err))
    }

    fn read_failed(&mut self, err: FrameError) -> TransportError {
        match err {
            FrameError::Io(ref io) if io.kind() == ErrorKind::TimedOut => {
                TransportError::Timeout(self.read_timeout().unwrap_or_default())
            }
            FrameError::Io(_) | FrameError::ConnectionClosed => {
                error!(path = %self.path(), error = %err, "serial link lost mid-read");
                self.close();
                TransportError::Fatal(err)
            }
            other => TransportError::Frame(other),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.reader.dialect()
    }

    /// Select the extraction algorithm for subsequent `recv` calls.
    pub fn set_dialect(&mut self, dialect: Dialect) {
        debug!(%dialect, "dialect selected");
        self.reader.set_dialect(dialect);
    }

    pub fn path(&self) -> &str {
        self.reader.get_ref().path()
    }

    /// Change the device path. Takes effect at the next open.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.reader.get_mut().set_path(path);
    }

    pub fn baud_rate(&self) -> u32 {
        self.reader.get_ref().baud_rate()
    }

    /// Change the line rate. Takes effect at the next open.
    pub fn set_baud_rate(&mut self, baud_rate: u32) {
        self.reader.get_mut().set_baud_rate(baud_rate);
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.reader.get_ref().read_timeout()
    }

    /// Bound each blocking read; `None` waits indefinitely.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.reader.get_mut().set_read_timeout(timeout);
    }

    /// Frame reader configuration (dialect, markers, size bound).
    pub fn frame_config(&self) -> &FrameConfig {
        self.reader.config()
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.reader.get_ref(), f)
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("connection", self.reader.get_ref())
            .field("dialect", &self.dialect())
            .field("buffered", &self.reader.buffered())
            .finish()
    }
}
