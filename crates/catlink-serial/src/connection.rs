use std::fmt;
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use tracing::{debug, error, trace, warn};

use crate::config::SerialConfig;
use crate::error::{Result, SerialError};
use crate::system::SystemConnector;
use crate::traits::{Connector, SerialLink};

/// Owns one serial endpoint: its configuration and, while open, its link.
///
/// All operations block the caller. There is no internal synchronization;
/// the manager is meant to have a single owner.
pub struct ConnectionManager {
    config: SerialConfig,
    connector: Box<dyn Connector>,
    link: Option<Box<dyn SerialLink>>,
}

impl ConnectionManager {
    /// Create a closed manager that opens real OS ports.
    pub fn new(config: SerialConfig) -> Self {
        Self::with_connector(config, SystemConnector)
    }

    /// Create a closed manager that opens links through `connector`.
    pub fn with_connector(config: SerialConfig, connector: impl Connector + 'static) -> Self {
        Self {
            config,
            connector: Box::new(connector),
            link: None,
        }
    }

    /// Acquire the OS handle and discard anything the driver buffered
    /// before it was acquired.
    ///
    /// Opening an already open endpoint keeps the handle and only resets
    /// its buffers. If the reset fails the handle is released and the
    /// endpoint is left closed.
    pub fn open(&mut self) -> Result<()> {
        if self.link.is_none() {
            let link = self
                .connector
                .connect(&self.config)
                .map_err(|source| SerialError::Open {
                    path: self.config.path.clone(),
                    source,
                })?;
            self.link = Some(link);
            debug!(
                path = %self.config.path,
                baud = self.config.baud_rate,
                connector = self.connector.name(),
                "serial endpoint open"
            );
        }
        if let Err(err) = self.reset_buffer() {
            warn!(
                path = %self.config.path,
                error = %err,
                "buffer reset on open failed, releasing handle"
            );
            self.link = None;
            return Err(err);
        }
        Ok(())
    }

    /// Release the OS handle. Never fails; closing a closed endpoint is a
    /// no-op.
    pub fn close(&mut self) {
        if self.link.is_none() {
            return;
        }
        if let Err(err) = self.reset_buffer() {
            warn!(path = %self.config.path, error = %err, "buffer reset on close failed");
        }
        self.link = None;
        debug!(path = %self.config.path, "serial endpoint closed");
    }

    /// Discard unread input and unwritten output. No-op when closed.
    pub fn reset_buffer(&mut self) -> Result<()> {
        match self.link.as_mut() {
            Some(link) => link.clear_buffers().map_err(SerialError::Reset),
            None => Ok(()),
        }
    }

    /// Test reachability with a transient open/close.
    ///
    /// Open failures are logged and reported as `false`. An endpoint that
    /// is already open is reachable and is left untouched.
    pub fn probe(&mut self) -> bool {
        if self.is_connected() {
            return true;
        }
        match self.open() {
            Ok(()) => {
                self.close();
                true
            }
            Err(err) => {
                error!(path = %self.config.path, error = %err, "serial endpoint unreachable");
                false
            }
        }
    }

    /// Write raw bytes to the endpoint.
    ///
    /// When the endpoint is closed nothing is written and `Ok(())` is
    /// returned.
    pub fn send(&mut self, data: &[u8]) -> Result<()> {
        let Some(link) = self.link.as_mut() else {
            trace!(len = data.len(), "send on closed endpoint skipped");
            return Ok(());
        };
        link.write_all(data)?;
        link.flush()?;
        trace!(len = data.len(), "sent");
        Ok(())
    }

    /// Whether the OS handle is currently held.
    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Current endpoint configuration.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    pub fn path(&self) -> &str {
        &self.config.path
    }

    /// Change the device path. Takes effect at the next open.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.config.path = path.into();
    }

    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }

    /// Change the line rate. Takes effect at the next open.
    pub fn set_baud_rate(&mut self, baud_rate: u32) {
        self.config.baud_rate = baud_rate;
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.config.read_timeout
    }

    /// Bound each blocking read; `None` waits indefinitely.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.config.read_timeout = timeout;
    }
}

impl Read for ConnectionManager {
    /// Blocking read from the open link.
    ///
    /// Driver poll timeouts are retried until data arrives or the configured
    /// read timeout elapses. Fails with `NotConnected` when closed.
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let deadline = self.config.read_timeout.map(|t| Instant::now() + t);
        let link = self
            .link
            .as_mut()
            .ok_or_else(|| std::io::Error::from(ErrorKind::NotConnected))?;
        loop {
            match link.read(buf) {
                Err(err) if err.kind() == ErrorKind::TimedOut => {
                    if deadline.is_some_and(|d| Instant::now() >= d) {
                        return Err(err);
                    }
                }
                result => return result,
            }
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Display for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Serial port: {}", self.config.path)
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("config", &self.config)
            .field("connector", &self.connector.name())
            .field("is_open", &self.is_connected())
            .finish()
    }
}
