//! HDLC Framing Library
//!
//! This crate decodes and encodes asynchronous (byte-stuffed) HDLC frames as
//! they appear on UART links:
//!
//! ```text
//! 7E [payload, 0x7D/0x7E escaped] [FCS lo] [FCS hi] 7E
//! ```
//!
//! # Architecture
//!
//! - [`HdlcCodec`]: a push-based streaming decoder that tolerates partial
//!   data, line noise and frames split across reads
//! - [`encode_frame`]: stuffing and FCS generation for the opposite direction
//! - [`FrameReader`]: an async adapter yielding decoded frames from any
//!   [`tokio::io::AsyncRead`] byte stream
//!
//! # Example
//!
//! ```rust
//! use hdlc_protocol::{encode_frame, HdlcCodec};
//!
//! let mut codec = HdlcCodec::new();
//! codec.push_bytes(&encode_frame(&[0xFF, 0x03, 0xC0, 0x21]));
//!
//! let frame = codec.next_frame().unwrap();
//! assert_eq!(frame.payload(), &[0xFF, 0x03, 0xC0, 0x21]);
//! ```

pub mod codec;
pub mod error;
pub mod fcs;
pub mod reader;

pub use codec::{encode_frame, encode_unchecked, CodecConfig, DecodeStats, Frame, HdlcCodec};
pub use error::ParseError;
pub use fcs::fcs16;
pub use reader::FrameReader;

/// Frame delimiter
pub const FLAG: u8 = 0x7E;
/// Control escape, the following byte is XOR-ed with [`ESCAPE_XOR`]
pub const ESCAPE: u8 = 0x7D;
/// Value applied to an escaped byte
pub const ESCAPE_XOR: u8 = 0x20;
/// Default upper bound on an unescaped frame (payload plus FCS)
pub const DEFAULT_MAX_FRAME_LEN: usize = 4096;
