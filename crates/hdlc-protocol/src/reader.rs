//! Async frame source over a byte stream

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::codec::{CodecConfig, DecodeStats, Frame, HdlcCodec};

/// Read buffer size for each poll of the underlying stream
const READ_CHUNK: usize = 256;

/// Lazily decodes HDLC frames from an async byte stream
///
/// The sequence is unbounded and cannot be restarted. [`FrameReader::next_frame`]
/// is cancel-safe: dropping the future loses no bytes that were already read,
/// so it can be raced against other events in `tokio::select!`.
pub struct FrameReader<R> {
    inner: R,
    codec: HdlcCodec,
    buf: Box<[u8]>,
}

impl<R> FrameReader<R>
where
    R: AsyncRead + Unpin,
{
    /// Wrap `inner` with a default decoder
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    /// Wrap `inner` with a custom decoder configuration
    pub fn with_config(inner: R, config: CodecConfig) -> Self {
        Self {
            inner,
            codec: HdlcCodec::with_config(config),
            buf: vec![0u8; READ_CHUNK].into_boxed_slice(),
        }
    }

    /// Wait for the next decoded frame
    ///
    /// Returns `Ok(None)` once the stream reaches end of file.
    pub async fn next_frame(&mut self) -> io::Result<Option<Frame>> {
        loop {
            if let Some(frame) = self.codec.next_frame() {
                return Ok(Some(frame));
            }

            let n = match self.inner.read(&mut self.buf).await {
                Ok(n) => n,
                // Serial drivers report an idle line as a timeout
                Err(e)
                    if e.kind() == io::ErrorKind::TimedOut
                        || e.kind() == io::ErrorKind::Interrupted =>
                {
                    continue;
                }
                Err(e) => return Err(e),
            };

            if n == 0 {
                trace!("Frame source reached end of stream");
                return Ok(None);
            }
            self.codec.push_bytes(&self.buf[..n]);
        }
    }

    /// Decoder statistics so far
    pub fn stats(&self) -> DecodeStats {
        self.codec.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode_frame;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_reads_frames_in_order() {
        let (mut tx, rx) = tokio::io::duplex(1024);
        let mut reader = FrameReader::new(rx);

        tx.write_all(&encode_frame(b"one")).await.unwrap();
        tx.write_all(&encode_frame(b"two")).await.unwrap();

        assert_eq!(reader.next_frame().await.unwrap().unwrap().payload(), b"one");
        assert_eq!(reader.next_frame().await.unwrap().unwrap().payload(), b"two");
    }

    #[tokio::test]
    async fn test_end_of_stream() {
        let (tx, rx) = tokio::io::duplex(64);
        let mut reader = FrameReader::new(rx);
        drop(tx);

        assert!(reader.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancelled_read_keeps_partial_frame() {
        let (mut tx, rx) = tokio::io::duplex(1024);
        let mut reader = FrameReader::new(rx);
        let encoded = encode_frame(b"split");

        tx.write_all(&encoded[..3]).await.unwrap();
        let pending =
            tokio::time::timeout(std::time::Duration::from_millis(20), reader.next_frame()).await;
        assert!(pending.is_err());

        tx.write_all(&encoded[3..]).await.unwrap();
        assert_eq!(reader.next_frame().await.unwrap().unwrap().payload(), b"split");
        assert_eq!(reader.stats().frames, 1);
    }
}
