use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::SerialConfig;
use crate::traits::{Connector, SerialLink};

/// In-process serial endpoint.
///
/// Models a device attached behind a driver buffer: bytes pushed with
/// [`push_incoming`](Self::push_incoming) sit in the simulated driver
/// buffer until read or cleared, written bytes stay pending until flushed.
/// Clones share the same endpoint, so a test can keep a handle while the
/// connection manager owns another.
///
/// A read on an empty buffer reports end of stream.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    incoming: VecDeque<u8>,
    after_reset: Vec<u8>,
    pending_out: Vec<u8>,
    written: Vec<u8>,
    open_error: Option<ErrorKind>,
    reset_error: Option<ErrorKind>,
    link_open: bool,
    severed: bool,
    opens: usize,
    clears: usize,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes the device emits into the driver buffer.
    pub fn push_incoming(&self, bytes: &[u8]) {
        self.lock().incoming.extend(bytes.iter().copied());
    }

    /// Bytes the device emits right after the next driver buffer reset,
    /// such as a board that starts streaming once the port is opened.
    pub fn push_after_reset(&self, bytes: &[u8]) {
        self.lock().after_reset.extend_from_slice(bytes);
    }

    /// Bytes still sitting unread in the driver buffer.
    pub fn pending_incoming(&self) -> usize {
        self.lock().incoming.len()
    }

    /// Everything flushed to the device so far.
    pub fn written(&self) -> Vec<u8> {
        self.lock().written.clone()
    }

    /// Make subsequent opens fail with `kind`.
    pub fn fail_open(&self, kind: ErrorKind) {
        self.lock().open_error = Some(kind);
    }

    /// Let subsequent opens succeed again.
    pub fn allow_open(&self) {
        self.lock().open_error = None;
    }

    /// Make subsequent driver buffer resets fail with `kind`, leaving the
    /// buffers untouched.
    pub fn fail_reset(&self, kind: ErrorKind) {
        self.lock().reset_error = Some(kind);
    }

    /// Let driver buffer resets succeed again.
    pub fn allow_reset(&self) {
        self.lock().reset_error = None;
    }

    /// Simulate the device being unplugged: reads and writes on an open
    /// link fail with `BrokenPipe`.
    pub fn sever(&self) {
        self.lock().severed = true;
    }

    /// Whether a link handed out by this connector is currently held.
    pub fn is_link_open(&self) -> bool {
        self.lock().link_open
    }

    /// Number of successful opens.
    pub fn open_count(&self) -> usize {
        self.lock().opens
    }

    /// Number of driver buffer resets.
    pub fn clear_count(&self) -> usize {
        self.lock().clears
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        lock_state(&self.state)
    }
}

fn lock_state(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Connector for MemoryConnector {
    fn connect(&self, config: &SerialConfig) -> std::io::Result<Box<dyn SerialLink>> {
        let mut state = self.lock();
        if let Some(kind) = state.open_error {
            return Err(std::io::Error::new(
                kind,
                format!("memory endpoint {} unavailable", config.path),
            ));
        }
        if state.link_open {
            return Err(std::io::Error::new(
                ErrorKind::ResourceBusy,
                format!("memory endpoint {} already in use", config.path),
            ));
        }
        state.link_open = true;
        state.severed = false;
        state.opens += 1;
        Ok(Box::new(MemoryLink {
            state: Arc::clone(&self.state),
        }))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

struct MemoryLink {
    state: Arc<Mutex<MemoryState>>,
}

impl Read for MemoryLink {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut state = lock_state(&self.state);
        if state.severed {
            return Err(ErrorKind::BrokenPipe.into());
        }
        let n = buf.len().min(state.incoming.len());
        for (slot, byte) in buf.iter_mut().zip(state.incoming.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

impl Write for MemoryLink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut state = lock_state(&self.state);
        if state.severed {
            return Err(ErrorKind::BrokenPipe.into());
        }
        state.pending_out.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut state = lock_state(&self.state);
        if state.severed {
            return Err(ErrorKind::BrokenPipe.into());
        }
        let pending = std::mem::take(&mut state.pending_out);
        state.written.extend_from_slice(&pending);
        Ok(())
    }
}

impl SerialLink for MemoryLink {
    fn clear_buffers(&mut self) -> std::io::Result<()> {
        let mut state = lock_state(&self.state);
        if let Some(kind) = state.reset_error {
            return Err(std::io::Error::new(kind, "driver buffer reset failed"));
        }
        state.incoming.clear();
        state.pending_out.clear();
        state.clears += 1;
        let queued = std::mem::take(&mut state.after_reset);
        state.incoming.extend(queued);
        Ok(())
    }
}

impl Drop for MemoryLink {
    fn drop(&mut self) {
        lock_state(&self.state).link_open = false;
    }
}
