//! Scan orchestration
//!
//! One scan enumerates the candidate ports, launches a probe per candidate
//! and collects the confirmed ports until the session's deadline passes (or
//! the first confirmation, when aborting after the first).

use std::sync::Arc;
use std::time::Duration;

use hdlc_protocol::CodecConfig;
use tokio::sync::mpsc;
use tracing::info;

use crate::error::DetectError;
use crate::opener::{PortOpener, SerialOpener};
use crate::probe::run_probe;
use crate::scanner::{PortEnumerator, PortScanner};
use crate::session::{Aggregator, ScanSession};

/// Frames a port must deliver before it counts as framed
pub const DEFAULT_MIN_FRAMES: u32 = 1;

/// Configuration shared by every probe of a scan
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    /// Frame threshold per port
    pub min_frames: u32,
    /// Decoder settings for each port
    pub codec: CodecConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_frames: DEFAULT_MIN_FRAMES,
            codec: CodecConfig::default(),
        }
    }
}

/// Finds ports emitting HDLC frames
pub struct HdlcScanner<E, O> {
    enumerator: E,
    opener: Arc<O>,
    config: ScanConfig,
}

impl HdlcScanner<PortScanner, SerialOpener> {
    /// Scanner over the host's real serial ports
    pub fn new() -> Self {
        Self::with_parts(
            PortScanner::new(),
            SerialOpener::default(),
            ScanConfig::default(),
        )
    }
}

impl Default for HdlcScanner<PortScanner, SerialOpener> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, O> HdlcScanner<E, O>
where
    E: PortEnumerator,
    O: PortOpener,
{
    /// Scanner with a custom enumerator, opener and configuration
    pub fn with_parts(enumerator: E, opener: O, config: ScanConfig) -> Self {
        Self {
            enumerator,
            opener: Arc::new(opener),
            config,
        }
    }

    /// Probe every candidate port concurrently for at most `timeout`
    ///
    /// Returns the framed ports in the order they were confirmed. With
    /// `abort_after_first` the list holds at most one port and the scan ends
    /// as soon as it is found. Only a failure to enumerate candidates is an
    /// error; probes that fail or find nothing are simply absent from the
    /// result.
    ///
    /// Probe tasks still running when this returns have been cancelled and
    /// release their devices in the background. Dropping the returned future
    /// before it completes cancels them as well.
    pub async fn scan(
        &self,
        timeout: Duration,
        abort_after_first: bool,
    ) -> Result<Vec<String>, DetectError> {
        let session = ScanSession::new(timeout, abort_after_first);
        let candidates = self.enumerator.list_candidates()?;

        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let aggregator = Aggregator::new(report_rx, &session);

        info!("Scanning {} port(s)", candidates.len());
        for port in candidates {
            tokio::spawn(run_probe(
                port,
                Arc::clone(&self.opener),
                self.config.codec,
                self.config.min_frames,
                session.token(),
                report_tx.clone(),
            ));
        }
        drop(report_tx);

        let ((), framed) = tokio::join!(session.finished(), aggregator.run());

        info!("Scan finished, {} framed port(s)", framed.len());
        Ok(framed)
    }
}

/// Scan the host's serial ports with default settings
pub async fn scan(timeout: Duration, abort_after_first: bool) -> Result<Vec<String>, DetectError> {
    HdlcScanner::new().scan(timeout, abort_after_first).await
}
