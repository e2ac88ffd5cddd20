//! Marker-delimited frame synchronization over serial byte streams.
//!
//! Sniffer firmware emits frames bounded by fixed START/END marker
//! sequences. Two firmware dialects disagree on the details:
//! - [`Dialect::Extended`]: back-to-back binary frames, split on the
//!   `END ++ START` boundary between consecutive frames
//! - [`Dialect::Generic`]: frames terminated by END with CR/LF noise and
//!   boot-log preamble mixed in
//!
//! [`FrameReader`] pulls bytes from any blocking `Read` source and returns
//! one frame per call.

pub mod codec;
pub mod error;
pub mod markers;
pub mod reader;

pub use codec::{
    extract_extended, filter_generic, find_subsequence, Frame, FrameConfig, DEFAULT_MAX_FRAME_SIZE,
};
pub use error::{FrameError, Result};
pub use markers::{Dialect, Markers, END_OF_FRAME, START_OF_FRAME};
pub use reader::FrameReader;
