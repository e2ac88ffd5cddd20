use bytes::{BufMut, Bytes, BytesMut};

use crate::markers::{Dialect, Markers};

/// Default bound on bytes buffered while searching for a delimiter: 1 MiB.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// One frame extracted from the serial stream, markers included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the frame starts with START and ends with END without the two
    /// overlapping.
    pub fn is_delimited(&self, markers: &Markers) -> bool {
        self.bytes.len() >= markers.min_frame_len()
            && self.bytes.starts_with(markers.start())
            && self.bytes.ends_with(markers.end())
    }

    /// The bytes between START and END, if the frame is delimited.
    pub fn payload(&self, markers: &Markers) -> Option<&[u8]> {
        if !self.is_delimited(markers) {
            return None;
        }
        Some(&self.bytes[markers.start().len()..self.bytes.len() - markers.end().len()])
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Configuration for a frame reader.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Extraction algorithm.
    pub dialect: Dialect,
    /// START/END sequences.
    pub markers: Markers,
    /// Maximum bytes buffered while waiting for a delimiter. Default: 1 MiB.
    pub max_frame_size: usize,
}

impl FrameConfig {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            markers: Markers::default(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::new(Dialect::default())
    }
}

/// Offset of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Rebuild an extended-dialect frame from the bytes consumed up to and
/// including an `END ++ START` boundary.
///
/// The START belonging to this frame was swallowed by the previous boundary
/// read, so the canonical START is prepended and the boundary's trailing
/// START (the next frame's) is dropped. When `synced` is false no previous
/// read swallowed a START: anything up to and including the first START in
/// front of the boundary is discarded instead.
///
/// Returns `None` if the boundary is absent.
pub fn extract_extended(consumed: &[u8], markers: &Markers, synced: bool) -> Option<Frame> {
    let boundary = find_subsequence(consumed, markers.boundary())?;
    let mut body = &consumed[..boundary + markers.end().len()];

    if !synced {
        if let Some(start) = find_subsequence(&consumed[..boundary], markers.start()) {
            body = &body[start + markers.start().len()..];
        }
    }

    let mut frame = BytesMut::with_capacity(markers.start().len() + body.len());
    frame.put_slice(markers.start());
    frame.put_slice(body);
    Some(Frame::new(frame.freeze()))
}

/// Clean up generic-dialect bytes consumed up to and including END.
///
/// Every CR and LF is removed, then everything before the first START is
/// dropped. Without a START the filtered bytes are returned as they are.
pub fn filter_generic(consumed: &[u8], markers: &Markers) -> Frame {
    let filtered: Bytes = consumed
        .iter()
        .copied()
        .filter(|b| *b != b'\n' && *b != b'\r')
        .collect::<Vec<u8>>()
        .into();

    match find_subsequence(&filtered, markers.start()) {
        Some(start) => Frame::new(filtered.slice(start..)),
        None => Frame::new(filtered),
    }
}
