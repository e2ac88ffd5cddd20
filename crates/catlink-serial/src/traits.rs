use std::io::{Read, Write};

use crate::config::SerialConfig;

/// An open serial link: a byte stream with driver-side buffers.
///
/// Reads may fail with `ErrorKind::TimedOut` when the driver's poll interval
/// elapses without data; [`ConnectionManager`](crate::ConnectionManager)
/// retries those until its own read timeout (if any) is reached.
pub trait SerialLink: Read + Write + Send {
    /// Discard unread input and unwritten output held by the driver.
    fn clear_buffers(&mut self) -> std::io::Result<()>;
}

/// Opens [`SerialLink`]s for an endpoint configuration.
pub trait Connector: Send {
    /// Acquire the OS handle described by `config`.
    fn connect(&self, config: &SerialConfig) -> std::io::Result<Box<dyn SerialLink>>;

    /// Connector name for diagnostics.
    fn name(&self) -> &'static str;
}
