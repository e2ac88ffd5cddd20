//! Frame synchronization over serial links for packet sniffer boards.
//!
//! catlink reads a continuous byte stream from a serial device and splits it
//! into frames delimited by START (`@S`) and END (`@E`) markers, tolerating
//! noise, line breaks and arbitrary chunking of the underlying reads.
//!
//! # Crate Structure
//!
//! - [`serial`]: Serial endpoint lifecycle, device discovery, in-memory test endpoint
//! - [`frame`]: Marker dialects and the buffered frame reader
//! - [`transport`]: Lazy-open send/recv facade combining both

/// Re-export serial endpoint types.
pub mod serial {
    pub use catlink_serial::*;
}

/// Re-export frame types.
pub mod frame {
    pub use catlink_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use catlink_transport::*;
}
