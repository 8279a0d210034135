//! Incremental SSE frame extraction.
//!
//! The relay emits `data: <json>\n\n` frames; network chunks arrive at
//! arbitrary boundaries, so a logical frame may span chunks and one chunk may
//! carry several frames. `FrameBuffer` is the pull-based extractor both the
//! chat client and tests drive: push bytes in, pull complete frames out.

use tracing::{debug, warn};

use crate::types::ServerEvent;

/// Frame delimiter per the relay's wire format.
const DELIMITER: &[u8] = b"\n\n";

/// Prefix that marks a frame as carrying an event payload.
const DATA_PREFIX: &str = "data: ";

/// Accumulating buffer that splits a byte stream into complete SSE frames.
///
/// Scanning happens at the byte level, so multi-byte UTF-8 sequences split
/// across chunks never corrupt: the delimiter is ASCII and a frame is only
/// converted to text once it is complete.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of raw bytes to the buffer.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Extracts the next complete frame, if a full delimiter is buffered.
    ///
    /// The returned text excludes the delimiter; frame and delimiter are
    /// removed from the buffer. Returns `None` while the residual cannot be
    /// a complete frame yet.
    pub fn next_frame(&mut self) -> Option<String> {
        let end = self
            .buf
            .windows(DELIMITER.len())
            .position(|w| w == DELIMITER)?;
        let frame = String::from_utf8_lossy(&self.buf[..end]).into_owned();
        self.buf.drain(..end + DELIMITER.len());
        Some(frame)
    }

    /// Signals end of stream, discarding any residual unterminated bytes.
    ///
    /// A truncated upstream is indistinguishable from a clean close at this
    /// layer; the residual is logged and dropped, never retried.
    pub fn finish(&mut self) {
        if !self.buf.is_empty() {
            debug!(
                residual_bytes = self.buf.len(),
                "discarding unterminated SSE frame residual at end of stream"
            );
            self.buf.clear();
        }
    }
}

/// Decodes one complete frame into a validated [`ServerEvent`].
///
/// Frames without the `data: ` prefix (keep-alives, comments) are silently
/// skipped. JSON parse failures and shape mismatches are logged and skipped;
/// a single bad frame never aborts the stream.
pub fn decode_frame(frame: &str) -> Option<ServerEvent> {
    let payload = frame.strip_prefix(DATA_PREFIX)?;

    match serde_json::from_str::<ServerEvent>(payload) {
        Ok(event) => Some(event),
        Err(err) => {
            // Distinguish malformed JSON from valid JSON with the wrong shape
            // so diagnostics point at the right producer.
            if serde_json::from_str::<serde_json::Value>(payload).is_ok() {
                warn!(%err, payload, "discarding stream event with unrecognized shape");
            } else {
                warn!(%err, payload, "failed to parse stream frame JSON");
            }
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ServerEvent;

    fn collect_frames(buffer: &mut FrameBuffer) -> Vec<String> {
        let mut frames = Vec::new();
        while let Some(frame) = buffer.next_frame() {
            frames.push(frame);
        }
        frames
    }

    /// Test: one chunk with two frames yields both, in order.
    #[test]
    fn test_two_frames_in_one_chunk() {
        let mut buffer = FrameBuffer::new();
        buffer.extend(b"data: {\"event\":\"a\"}\n\ndata: {\"event\":\"b\"}\n\n");

        let frames = collect_frames(&mut buffer);
        assert_eq!(
            frames,
            vec!["data: {\"event\":\"a\"}", "data: {\"event\":\"b\"}"]
        );
    }

    /// Test: the same bytes split anywhere across chunks yield the same frames.
    #[test]
    fn test_splitting_is_boundary_independent() {
        let bytes = b"data: {\"event\":\"a\"}\n\ndata: {\"event\":\"b\"}\n\n";

        for split in 0..bytes.len() {
            let mut buffer = FrameBuffer::new();
            buffer.extend(&bytes[..split]);
            let mut frames = collect_frames(&mut buffer);
            buffer.extend(&bytes[split..]);
            frames.extend(collect_frames(&mut buffer));

            assert_eq!(
                frames,
                vec!["data: {\"event\":\"a\"}", "data: {\"event\":\"b\"}"],
                "split at byte {split}"
            );
        }
    }

    /// Test: a frame delivered in two chunks decodes exactly once.
    #[test]
    fn test_partial_frame_buffering() {
        let mut buffer = FrameBuffer::new();
        buffer.extend(b"data: {\"event\":");
        assert!(buffer.next_frame().is_none());

        buffer.extend(b"\"thread_id\",\"data\":{\"thread_id\":\"t1\"}}\n\n");
        let frame = buffer.next_frame().unwrap();
        assert_eq!(
            decode_frame(&frame),
            Some(ServerEvent::ThreadId {
                thread_id: "t1".to_string()
            })
        );
        assert!(buffer.next_frame().is_none());
    }

    /// Test: a chunk split in the middle of the delimiter still frames correctly.
    #[test]
    fn test_split_mid_delimiter() {
        let mut buffer = FrameBuffer::new();
        buffer.extend(b"data: {\"event\":\"thread_id\",\"data\":{\"thread_id\":\"t1\"}}\n");
        assert!(buffer.next_frame().is_none());
        buffer.extend(b"\n");
        assert!(buffer.next_frame().is_some());
    }

    /// Test: multi-byte UTF-8 split across chunks survives intact.
    #[test]
    fn test_utf8_split_across_chunks() {
        let bytes = "data: {\"event\":\"thread_id\",\"data\":{\"thread_id\":\"t-👋\"}}\n\n"
            .as_bytes();
        let emoji_start = bytes
            .windows(4)
            .position(|w| w == [0xF0, 0x9F, 0x91, 0x8B])
            .unwrap();

        let mut buffer = FrameBuffer::new();
        buffer.extend(&bytes[..emoji_start + 2]);
        assert!(buffer.next_frame().is_none());
        buffer.extend(&bytes[emoji_start + 2..]);

        let frame = buffer.next_frame().unwrap();
        assert_eq!(
            decode_frame(&frame),
            Some(ServerEvent::ThreadId {
                thread_id: "t-👋".to_string()
            })
        );
    }

    /// Test: non-`data:` frames are skipped without an event.
    #[test]
    fn test_non_data_frames_are_skipped() {
        assert_eq!(decode_frame(": keep-alive"), None);
        assert_eq!(decode_frame("event: ping"), None);
        assert_eq!(decode_frame(""), None);
    }

    /// Test: invalid JSON and wrong-shape events decode to nothing.
    #[test]
    fn test_bad_frames_decode_to_none() {
        assert_eq!(decode_frame("data: {not json"), None);
        assert_eq!(decode_frame("data: {\"event\":\"metadata\",\"data\":{}}"), None);
        assert_eq!(decode_frame("data: 42"), None);
    }

    /// Test: residual bytes are dropped on finish, not resurrected.
    #[test]
    fn test_finish_discards_residual() {
        let mut buffer = FrameBuffer::new();
        buffer.extend(b"data: {\"truncated");
        buffer.finish();
        buffer.extend(b"\"}\n\n");
        // The residual was discarded, so only the tail remains and it is not
        // a decodable frame on its own.
        let frame = buffer.next_frame().unwrap();
        assert_eq!(decode_frame(&frame), None);
    }
}
