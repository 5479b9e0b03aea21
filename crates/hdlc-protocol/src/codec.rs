//! Streaming HDLC codec
//!
//! The decoder is a small state machine fed with arbitrary chunks of bytes.
//! Completed frames are queued until the caller pulls them with
//! [`HdlcCodec::next_frame`].

use std::collections::VecDeque;

use tracing::trace;

use crate::error::ParseError;
use crate::fcs::fcs16;
use crate::{DEFAULT_MAX_FRAME_LEN, ESCAPE, ESCAPE_XOR, FLAG};

/// Length of the trailing frame check sequence
const FCS_LEN: usize = 2;

/// A decoded frame with the FCS removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Vec<u8>,
}

impl Frame {
    /// Wrap an already decoded payload
    pub fn new(payload: Vec<u8>) -> Self {
        Self { payload }
    }

    /// Frame contents
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consume the frame, returning its contents
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Number of payload bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Decoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Frames longer than this (after unescaping) are dropped
    pub max_frame_len: usize,
    /// Validate and strip the trailing FCS-16
    pub check_fcs: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            check_fcs: true,
        }
    }
}

/// Counters describing what the decoder has seen so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Frames delivered to the queue
    pub frames: u64,
    /// Frames rejected for a bad FCS
    pub fcs_errors: u64,
    /// Frames shorter than the FCS plus one byte
    pub runts: u64,
    /// Frames discarded by an abort sequence
    pub aborts: u64,
    /// Frames discarded for exceeding the maximum length
    pub oversize: u64,
}

impl DecodeStats {
    /// Total number of discarded candidate frames
    pub fn discarded(&self) -> u64 {
        self.fcs_errors + self.runts + self.aborts + self.oversize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Waiting for the first flag
    Hunt,
    /// Collecting frame bytes
    Frame,
    /// Previous byte was an escape
    Escape,
    /// Dropping bytes until the next flag
    Discard,
}

/// Streaming HDLC decoder
#[derive(Debug)]
pub struct HdlcCodec {
    config: CodecConfig,
    state: State,
    buffer: Vec<u8>,
    ready: VecDeque<Frame>,
    stats: DecodeStats,
}

impl HdlcCodec {
    /// Create a decoder with FCS checking enabled
    pub fn new() -> Self {
        Self::with_config(CodecConfig::default())
    }

    /// Create a decoder with custom configuration
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            config,
            state: State::Hunt,
            buffer: Vec::with_capacity(256),
            ready: VecDeque::new(),
            stats: DecodeStats::default(),
        }
    }

    /// Push raw bytes into the decoder
    pub fn push_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.push_byte(byte);
        }
    }

    /// Take the next completed frame, if any
    pub fn next_frame(&mut self) -> Option<Frame> {
        self.ready.pop_front()
    }

    /// Number of completed frames waiting to be taken
    pub fn pending(&self) -> usize {
        self.ready.len()
    }

    /// Decoder statistics
    pub fn stats(&self) -> DecodeStats {
        self.stats
    }

    /// Drop all buffered state and resynchronise on the next flag
    pub fn clear(&mut self) {
        self.state = State::Hunt;
        self.buffer.clear();
        self.ready.clear();
    }

    fn push_byte(&mut self, byte: u8) {
        match (self.state, byte) {
            (State::Hunt | State::Discard, FLAG) => {
                self.buffer.clear();
                self.state = State::Frame;
            }
            (State::Hunt | State::Discard, _) => {}
            (State::Frame, FLAG) => {
                self.finish_frame();
            }
            (State::Frame, ESCAPE) => {
                self.state = State::Escape;
            }
            (State::Frame, _) => self.append(byte),
            (State::Escape, FLAG) => {
                self.reject(ParseError::Aborted);
                self.state = State::Frame;
            }
            (State::Escape, _) => {
                self.state = State::Frame;
                self.append(byte ^ ESCAPE_XOR);
            }
        }
    }

    fn append(&mut self, byte: u8) {
        if self.buffer.len() >= self.config.max_frame_len {
            self.reject(ParseError::Oversize {
                max: self.config.max_frame_len,
            });
            self.state = State::Discard;
            return;
        }
        self.buffer.push(byte);
    }

    fn finish_frame(&mut self) {
        // Back-to-back flags delimit nothing
        if self.buffer.is_empty() {
            return;
        }

        let body = std::mem::take(&mut self.buffer);
        match self.validate(body) {
            Ok(frame) => {
                trace!("Decoded {} byte frame", frame.len());
                self.stats.frames += 1;
                self.ready.push_back(frame);
            }
            Err(e) => self.reject(e),
        }
    }

    fn validate(&self, mut body: Vec<u8>) -> Result<Frame, ParseError> {
        if !self.config.check_fcs {
            return Ok(Frame::new(body));
        }

        if body.len() <= FCS_LEN {
            return Err(ParseError::TooShort { len: body.len() });
        }

        let split = body.len() - FCS_LEN;
        let actual = u16::from_le_bytes([body[split], body[split + 1]]);
        body.truncate(split);
        let expected = fcs16(&body);
        if expected != actual {
            return Err(ParseError::FcsMismatch { expected, actual });
        }

        Ok(Frame::new(body))
    }

    fn reject(&mut self, reason: ParseError) {
        trace!("Discarding frame: {}", reason);
        match reason {
            ParseError::TooShort { .. } => self.stats.runts += 1,
            ParseError::FcsMismatch { .. } => self.stats.fcs_errors += 1,
            ParseError::Oversize { .. } => self.stats.oversize += 1,
            ParseError::Aborted => self.stats.aborts += 1,
        }
        self.buffer.clear();
    }
}

impl Default for HdlcCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode `payload` as a complete frame with a trailing FCS-16
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(payload.len() + FCS_LEN);
    body.extend_from_slice(payload);
    body.extend_from_slice(&fcs16(payload).to_le_bytes());
    encode_unchecked(&body)
}

/// Stuff `body` between flags verbatim, without appending an FCS
pub fn encode_unchecked(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + body.len() / 8 + 2);
    out.push(FLAG);
    for &b in body {
        if b == FLAG || b == ESCAPE {
            out.push(ESCAPE);
            out.push(b ^ ESCAPE_XOR);
        } else {
            out.push(b);
        }
    }
    out.push(FLAG);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_frame() {
        let mut codec = HdlcCodec::new();
        codec.push_bytes(&encode_frame(b"hello"));

        assert_eq!(codec.next_frame().unwrap().payload(), b"hello");
        assert!(codec.next_frame().is_none());
        assert_eq!(codec.stats().frames, 1);
    }

    #[test]
    fn test_escaped_bytes() {
        let payload = [0x7E, 0x01, 0x7D, 0x02];
        let encoded = encode_frame(&payload);
        assert_eq!(&encoded[..5], &[FLAG, ESCAPE, 0x5E, 0x01, ESCAPE]);

        let mut codec = HdlcCodec::new();
        codec.push_bytes(&encoded);
        assert_eq!(codec.next_frame().unwrap().payload(), &payload);
    }

    #[test]
    fn test_split_across_pushes() {
        let encoded = encode_frame(&[0x10, 0x20, 0x30, 0x7E]);
        let mut codec = HdlcCodec::new();

        for chunk in encoded.chunks(1) {
            codec.push_bytes(chunk);
        }

        assert_eq!(codec.next_frame().unwrap().payload(), &[0x10, 0x20, 0x30, 0x7E]);
    }

    #[test]
    fn test_leading_garbage_discarded() {
        let mut codec = HdlcCodec::new();
        codec.push_bytes(b"noise before sync");
        codec.push_bytes(&encode_frame(b"ok"));

        assert_eq!(codec.next_frame().unwrap().payload(), b"ok");
        assert_eq!(codec.stats().discarded(), 0);
    }

    #[test]
    fn test_shared_flag_between_frames() {
        let a = encode_frame(b"a1");
        let b = encode_frame(b"b2");
        let mut stream = a.clone();
        // Drop b's opening flag so both frames share one delimiter
        stream.extend_from_slice(&b[1..]);

        let mut codec = HdlcCodec::new();
        codec.push_bytes(&stream);

        assert_eq!(codec.next_frame().unwrap().payload(), b"a1");
        assert_eq!(codec.next_frame().unwrap().payload(), b"b2");
    }

    #[test]
    fn test_consecutive_flags_yield_nothing() {
        let mut codec = HdlcCodec::new();
        codec.push_bytes(&[FLAG, FLAG, FLAG, FLAG]);

        assert!(codec.next_frame().is_none());
        assert_eq!(codec.stats(), DecodeStats::default());
    }

    #[test]
    fn test_bad_fcs_rejected() {
        let mut encoded = encode_frame(b"payload");
        encoded[1] ^= 0x01;

        let mut codec = HdlcCodec::new();
        codec.push_bytes(&encoded);

        assert!(codec.next_frame().is_none());
        assert_eq!(codec.stats().fcs_errors, 1);
    }

    #[test]
    fn test_runt_rejected() {
        let mut codec = HdlcCodec::new();
        codec.push_bytes(&[FLAG, 0x01, 0x02, FLAG]);

        assert!(codec.next_frame().is_none());
        assert_eq!(codec.stats().runts, 1);
    }

    #[test]
    fn test_abort_sequence() {
        let mut codec = HdlcCodec::new();
        codec.push_bytes(&[FLAG, 0x01, 0x02, ESCAPE, FLAG]);
        codec.push_bytes(&encode_frame(b"after")[1..]);

        assert_eq!(codec.next_frame().unwrap().payload(), b"after");
        assert_eq!(codec.stats().aborts, 1);
    }

    #[test]
    fn test_oversize_resyncs() {
        let mut codec = HdlcCodec::with_config(CodecConfig {
            max_frame_len: 8,
            check_fcs: true,
        });
        codec.push_bytes(&encode_frame(&[0xAA; 32]));
        codec.push_bytes(&encode_frame(b"small"));

        assert_eq!(codec.next_frame().unwrap().payload(), b"small");
        assert!(codec.next_frame().is_none());
        assert_eq!(codec.stats().oversize, 1);
    }

    #[test]
    fn test_unchecked_mode_keeps_body() {
        let mut codec = HdlcCodec::with_config(CodecConfig {
            check_fcs: false,
            ..Default::default()
        });
        codec.push_bytes(&encode_unchecked(&[0x01]));

        assert_eq!(codec.next_frame().unwrap().payload(), &[0x01]);
    }

    #[test]
    fn test_clear_resets_sync() {
        let mut codec = HdlcCodec::new();
        let encoded = encode_frame(b"xyz");
        codec.push_bytes(&encoded[..3]);
        codec.clear();
        // Tail of the old frame arrives with no opening flag in sight
        codec.push_bytes(&encoded[3..encoded.len() - 1]);

        assert!(codec.next_frame().is_none());
        assert_eq!(codec.pending(), 0);
    }
}
