//! Lazy-open send/recv facade over a serial endpoint.
//!
//! [`Transport`] composes a [`ConnectionManager`] with a [`FrameReader`]:
//! `recv` opens the endpoint on first use and returns one frame per call,
//! `send` writes raw bytes when the endpoint is open.
//!
//! [`ConnectionManager`]: catlink_serial::ConnectionManager
//! [`FrameReader`]: catlink_frame::FrameReader

pub mod error;
pub mod transport;

pub use error::{Result, TransportError};
pub use transport::{Transport, TransportConfig};

pub use catlink_frame::{Dialect, Frame, Markers};
