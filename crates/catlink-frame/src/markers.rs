use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Start-of-frame marker: "@S".
pub const START_OF_FRAME: [u8; 2] = [0x40, 0x53];

/// End-of-frame marker: "@E".
pub const END_OF_FRAME: [u8; 2] = [0x40, 0x45];

/// Frame extraction algorithm used by a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Back-to-back frames split on the `END ++ START` boundary. Every frame
    /// starts with START and ends with END.
    Extended,
    /// Frames terminated by END, CR/LF stripped, preamble before START
    /// dropped. No end-to-end framing guarantee.
    #[default]
    Generic,
}

impl Dialect {
    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Extended => "extended",
            Dialect::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The START/END byte sequences bounding a frame.
///
/// Immutable once built; the extended dialect relies on START never
/// changing while a reader is in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    start: Bytes,
    end: Bytes,
    boundary: Bytes,
}

impl Markers {
    /// Build markers from explicit sequences. Both must be non-empty.
    pub fn new(start: impl Into<Bytes>, end: impl Into<Bytes>) -> Result<Self> {
        let start = start.into();
        let end = end.into();
        if start.is_empty() || end.is_empty() {
            return Err(FrameError::EmptyMarker);
        }
        Ok(Self::from_parts(start, end))
    }

    fn from_parts(start: Bytes, end: Bytes) -> Self {
        let mut boundary = BytesMut::with_capacity(end.len() + start.len());
        boundary.put_slice(&end);
        boundary.put_slice(&start);

        Self {
            start,
            end,
            boundary: boundary.freeze(),
        }
    }

    pub fn start(&self) -> &[u8] {
        &self.start
    }

    pub fn end(&self) -> &[u8] {
        &self.end
    }

    /// `END ++ START`: what sits between two consecutive frames.
    pub fn boundary(&self) -> &[u8] {
        &self.boundary
    }

    /// Shortest possible well-formed frame.
    pub fn min_frame_len(&self) -> usize {
        self.start.len() + self.end.len()
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::from_parts(
            Bytes::from_static(&START_OF_FRAME),
            Bytes::from_static(&END_OF_FRAME),
        )
    }
}
