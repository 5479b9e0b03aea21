//! Property tests for the HDLC decoder
//!
//! These cover behaviour that must hold for any input: the decoder never
//! panics, stays bounded, and recovers whole frames regardless of how the
//! byte stream is chunked or what noise precedes it.

use hdlc_protocol::{encode_frame, CodecConfig, HdlcCodec, FLAG};
use proptest::prelude::*;

fn noise_bytes() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>().prop_filter("no flag", |b| *b != FLAG), 0..64)
}

fn frame_payloads() -> impl Strategy<Value = Vec<Vec<u8>>> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..128), 1..8)
}

proptest! {
    #[test]
    fn recovers_frames_after_noise(
        noise in noise_bytes(),
        payloads in frame_payloads(),
        chunk in 1usize..32,
    ) {
        let mut stream = noise.clone();
        for p in &payloads {
            stream.extend_from_slice(&encode_frame(p));
        }

        let mut codec = HdlcCodec::new();
        for c in stream.chunks(chunk) {
            codec.push_bytes(c);
        }

        let mut decoded = Vec::new();
        while let Some(frame) = codec.next_frame() {
            decoded.push(frame.into_payload());
        }
        prop_assert_eq!(decoded, payloads);
    }

    #[test]
    fn arbitrary_input_stays_bounded(
        data in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        let max = 64;
        let mut codec = HdlcCodec::with_config(CodecConfig {
            max_frame_len: max,
            check_fcs: false,
        });
        codec.push_bytes(&data);

        while let Some(frame) = codec.next_frame() {
            prop_assert!(!frame.is_empty());
            prop_assert!(frame.len() <= max);
        }
    }
}
