//! Per-port framing probe
//!
//! A probe owns one opened device, decodes frames from it and races every
//! frame against the scan's cancellation signal. It reports success at most
//! once, and only after seeing the configured number of frames.

use std::sync::Arc;

use hdlc_protocol::{CodecConfig, FrameReader};
use tokio::io::AsyncRead;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::DetectError;
use crate::opener::PortOpener;

/// How a probe's watch over a device ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The frame threshold was reached
    Framed,
    /// The scan was cancelled first
    Cancelled,
    /// The device stopped producing bytes
    StreamEnded,
}

/// Watches a single opened device for HDLC frames
pub struct PortProbe<S> {
    port: String,
    reader: FrameReader<S>,
    remaining: u32,
}

impl<S> PortProbe<S>
where
    S: AsyncRead + Unpin,
{
    /// Create a probe over an already opened stream
    ///
    /// `min_frames` below one is treated as one.
    pub fn new(port: impl Into<String>, stream: S, codec: CodecConfig, min_frames: u32) -> Self {
        Self {
            port: port.into(),
            reader: FrameReader::with_config(stream, codec),
            remaining: min_frames.max(1),
        }
    }

    /// Frames still needed before the port counts as framed
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Consume frames until the threshold is met or `cancel` fires
    ///
    /// Cancellation always wins over a frame that is ready at the same time,
    /// and a probe that saw some frames but not enough reports
    /// [`Verdict::Cancelled`]. The countdown survives a dropped `watch`
    /// future. The device is closed when the probe is dropped.
    pub async fn watch(&mut self, cancel: &CancellationToken) -> Result<Verdict, DetectError> {
        if self.remaining == 0 {
            return Ok(Verdict::Framed);
        }

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => return Ok(Verdict::Cancelled),

                next = self.reader.next_frame() => match next {
                    Ok(Some(frame)) => {
                        debug!("Got a frame on {}: [{:02X?}]", self.port, frame.payload());
                        self.remaining -= 1;
                        if self.remaining == 0 {
                            return Ok(Verdict::Framed);
                        }
                    }
                    Ok(None) => return Ok(Verdict::StreamEnded),
                    Err(source) => {
                        return Err(DetectError::Io {
                            port: self.port.clone(),
                            source,
                        })
                    }
                },
            }
        }
    }
}

/// Open `port`, watch it and report it on `report_tx` if it is framed
///
/// Every failure stays inside this function; the scan only ever hears about
/// successes.
pub(crate) async fn run_probe<O>(
    port: String,
    opener: Arc<O>,
    codec: CodecConfig,
    min_frames: u32,
    cancel: CancellationToken,
    report_tx: mpsc::UnboundedSender<String>,
) where
    O: PortOpener,
{
    let stream = match opener.open(&port) {
        Ok(stream) => stream,
        Err(e) => {
            warn!("{}", e);
            return;
        }
    };

    let mut probe = PortProbe::new(port, stream, codec, min_frames);
    let verdict = probe.watch(&cancel).await;
    let stats = probe.reader.stats();
    let port = probe.port;
    // Device handle goes away with the reader here, before anything is reported
    drop(probe.reader);

    match verdict {
        Ok(Verdict::Framed) => {
            info!("{} is emitting HDLC frames", port);
            // Aggregator may already be gone after an early abort
            let _ = report_tx.send(port);
        }
        Ok(Verdict::Cancelled) => {
            debug!(
                "Stopped probing {} ({} frames, {} discarded)",
                port,
                stats.frames,
                stats.discarded()
            );
        }
        Ok(Verdict::StreamEnded) => debug!("{} stopped producing data", port),
        Err(e) => warn!("{}", e),
    }
}
