use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::{trace, warn};

use crate::codec::{extract_extended, filter_generic, find_subsequence, Frame, FrameConfig};
use crate::error::{FrameError, Result};
use crate::markers::{Dialect, Markers};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads frames from any blocking `Read` stream.
///
/// Bytes read past a delimiter stay buffered for the next call, so
/// successive calls neither lose nor repeat stream bytes.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
    synced: bool,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
            synced: false,
        }
    }

    /// Read the next frame using the configured dialect (blocking).
    ///
    /// Returns `Ok(None)` when the consumed bytes do not contain the
    /// expected boundary; the miss is logged and the bytes are dropped.
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached
    /// before a delimiter. In the extended dialect a complete frame left in
    /// the buffer at EOF is returned first.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        match self.config.dialect {
            Dialect::Extended => self.read_extended(),
            Dialect::Generic => self.read_generic().map(Some),
        }
    }

    fn read_extended(&mut self) -> Result<Option<Frame>> {
        let boundary = self.config.markers.boundary().to_vec();
        let consumed = match self.read_until(&boundary) {
            Ok(consumed) => consumed,
            Err(FrameError::ConnectionClosed) => {
                return self
                    .take_final_frame()
                    .map(Some)
                    .ok_or(FrameError::ConnectionClosed);
            }
            Err(err) => return Err(err),
        };

        match extract_extended(&consumed, &self.config.markers, self.synced) {
            Some(frame) => {
                self.synced = true;
                trace!(len = frame.len(), "extended frame");
                Ok(Some(frame))
            }
            None => {
                warn!(
                    consumed = consumed.len(),
                    "frame boundary missing from consumed bytes"
                );
                Ok(None)
            }
        }
    }

    /// At end of stream no next START follows the last frame, so its
    /// boundary never arrives. Emit it anyway when the buffer holds a
    /// complete frame ending in END.
    fn take_final_frame(&mut self) -> Option<Frame> {
        let markers = &self.config.markers;
        if !self.buf.ends_with(markers.end()) {
            return None;
        }
        if !self.synced && find_subsequence(&self.buf, markers.start()).is_none() {
            return None;
        }

        let mut consumed = self.buf.split();
        consumed.extend_from_slice(markers.start());
        let frame = extract_extended(&consumed, markers, self.synced)?;
        self.synced = false;
        trace!(len = frame.len(), "final extended frame at end of stream");
        Some(frame)
    }

    fn read_generic(&mut self) -> Result<Frame> {
        let end = self.config.markers.end().to_vec();
        let consumed = self.read_until(&end)?;
        let frame = filter_generic(&consumed, &self.config.markers);
        trace!(len = frame.len(), "generic frame");
        Ok(frame)
    }

    /// Read until `delimiter` appears and return everything consumed up to
    /// and including it.
    ///
    /// Fails with `FrameTooLarge` (dropping the buffer) when more than
    /// `max_frame_size` bytes accumulate without the delimiter.
    pub fn read_until(&mut self, delimiter: &[u8]) -> Result<BytesMut> {
        if delimiter.is_empty() {
            return Ok(BytesMut::new());
        }

        let mut searched = 0usize;
        loop {
            let from = searched.saturating_sub(delimiter.len() - 1);
            if let Some(pos) = find_subsequence(&self.buf[from..], delimiter) {
                return Ok(self.buf.split_to(from + pos + delimiter.len()));
            }
            searched = self.buf.len();

            if self.buf.len() > self.config.max_frame_size {
                let size = self.buf.len();
                self.reset();
                return Err(FrameError::FrameTooLarge {
                    size,
                    max: self.config.max_frame_size,
                });
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Drop buffered bytes and resynchronize on the next frame.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.synced = false;
    }

    /// Bytes read from the stream but not yet returned in a frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    /// Switch dialect for subsequent reads. Buffered bytes are kept.
    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.config.dialect = dialect;
    }

    pub fn markers(&self) -> &Markers {
        &self.config.markers
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn extended(bytes: &[u8]) -> FrameReader<Cursor<Vec<u8>>> {
        FrameReader::with_config(
            Cursor::new(bytes.to_vec()),
            FrameConfig::new(Dialect::Extended),
        )
    }

    fn generic(bytes: &[u8]) -> FrameReader<Cursor<Vec<u8>>> {
        FrameReader::with_config(
            Cursor::new(bytes.to_vec()),
            FrameConfig::new(Dialect::Generic),
        )
    }

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut out = b"@S".to_vec();
        out.extend_from_slice(payload);
        out.extend_from_slice(b"@E");
        out
    }

    #[test]
    fn extended_back_to_back_frames_are_lossless() {
        let frames: Vec<Vec<u8>> = (0..16u8)
            .map(|i| frame(&[i, i.wrapping_mul(7), 0xFF, 0x00]))
            .collect();
        let wire: Vec<u8> = frames.concat();

        let mut reader = extended(&wire);
        for expected in &frames {
            let got = reader.read_frame().unwrap().expect("frame expected");
            assert_eq!(got.as_bytes(), expected.as_slice());
        }
        assert_eq!(reader.buffered(), 0);
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn extended_frames_satisfy_marker_invariant() {
        let wire = [frame(b""), frame(b"x"), frame(b"longer payload")].concat();
        let mut reader = extended(&wire);
        let markers = Markers::default();

        for _ in 0..3 {
            let got = reader.read_frame().unwrap().unwrap();
            assert!(got.len() >= markers.min_frame_len());
            assert!(got.is_delimited(&markers));
        }
    }

    #[test]
    fn extended_drops_noise_before_first_frame() {
        let wire = [b"\x00\x13boot".to_vec(), frame(b"one"), frame(b"two")].concat();
        let mut reader = extended(&wire);

        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Sone@E");
        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Stwo@E");
    }

    #[test]
    fn extended_partial_reads() {
        let wire = [frame(b"slow"), frame(b"drip")].concat();
        let mut reader = FrameReader::with_config(
            ByteByByteReader { bytes: wire, pos: 0 },
            FrameConfig::new(Dialect::Extended),
        );

        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Sslow@E");
        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Sdrip@E");
    }

    #[test]
    fn extended_boundary_split_across_reads() {
        let wire = [frame(b"abc"), frame(b"def")].concat();
        let mut reader = FrameReader::with_config(
            ChunkedReader {
                bytes: wire,
                pos: 0,
                chunk: 6,
            },
            FrameConfig::new(Dialect::Extended),
        );

        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Sabc@E");
        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Sdef@E");
    }

    #[test]
    fn extended_last_frame_emitted_at_end_of_stream() {
        let mut reader = extended(b"@Sone@E@Stwo@E@Sthree@E");

        for expected in [&b"@Sone@E"[..], b"@Stwo@E", b"@Sthree@E"] {
            let got = reader.read_frame().unwrap().expect("frame expected");
            assert_eq!(got.as_bytes(), expected);
        }
        assert_eq!(reader.buffered(), 0);
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn extended_single_frame_stream() {
        let mut reader = extended(b"\r\nboot@Sonly@E");
        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Sonly@E");
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn extended_truncated_tail_is_not_emitted() {
        let mut reader = extended(b"@Sone@E@Stwo-cut");
        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Sone@E");
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn extended_unsynced_tail_without_start_is_not_emitted() {
        let mut reader = extended(b"boot log@E");
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn reset_drops_buffered_bytes() {
        let wire = [frame(b"one"), frame(b"two")].concat();
        let mut reader = extended(&wire);

        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Sone@E");
        assert!(reader.buffered() > 0);
        reader.reset();
        assert_eq!(reader.buffered(), 0);
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn generic_filters_noise_and_preamble() {
        let mut reader = generic(b"\r\nGARBAGE@Spayload@E");
        let got = reader.read_frame().unwrap().unwrap();
        assert_eq!(got.as_bytes(), b"@Spayload@E");
    }

    #[test]
    fn generic_passthrough_without_start() {
        let mut reader = generic(b"log line\r\nmore@E");
        let got = reader.read_frame().unwrap().unwrap();
        assert_eq!(got.as_bytes(), b"log linemore@E");
    }

    #[test]
    fn generic_successive_frames() {
        let mut reader = generic(b"@Sone@E\r\n@Stwo@E\r\n");
        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Sone@E");
        // The CR/LF after the first END leads the second read and is stripped.
        assert_eq!(reader.read_frame().unwrap().unwrap().as_bytes(), b"@Stwo@E");
        assert_eq!(reader.buffered(), 2);
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut reader = extended(b"@Spartial");
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn oversized_frame_is_rejected_and_dropped() {
        let cfg = FrameConfig {
            max_frame_size: 16,
            ..FrameConfig::new(Dialect::Generic)
        };
        let mut reader = FrameReader::with_config(Cursor::new(vec![b'x'; 64]), cfg);
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::FrameTooLarge { max: 16, .. }));
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn read_until_returns_inclusive_prefix() {
        let mut reader = generic(b"abc|def|");
        assert_eq!(reader.read_until(b"|").unwrap().as_ref(), b"abc|");
        assert_eq!(reader.read_until(b"|").unwrap().as_ref(), b"def|");
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: b"@Sok@E".to_vec(),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let got = framed.read_frame().unwrap().unwrap();
        assert_eq!(got.as_bytes(), b"@Sok@E");
    }

    #[test]
    fn io_error_propagates_and_keeps_buffer() {
        let reader = DataThenError {
            bytes: b"@Spart".to_vec(),
            served: false,
        };
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::TimedOut));
        assert_eq!(framed.buffered(), 6);
    }

    #[test]
    fn dialect_switch_applies_to_next_read() {
        let mut reader = generic(b"");
        assert_eq!(reader.dialect(), Dialect::Generic);
        reader.set_dialect(Dialect::Extended);
        assert_eq!(reader.dialect(), Dialect::Extended);
        assert_eq!(reader.config().dialect, Dialect::Extended);
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = generic(b"");
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        assert_eq!(reader.markers(), &Markers::default());
        let _inner = reader.into_inner();
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct ChunkedReader {
        bytes: Vec<u8>,
        pos: usize,
        chunk: usize,
    }

    impl Read for ChunkedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len()).min(self.chunk);
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    struct DataThenError {
        bytes: Vec<u8>,
        served: bool,
    }

    impl Read for DataThenError {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.served {
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            self.served = true;
            let n = self.bytes.len().min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[..n]);
            Ok(n)
        }
    }
}
