//! Scan session and result aggregation
//!
//! A [`ScanSession`] is the cancellation scope shared by every probe of one
//! scan: a deadline plus a one-shot cancellation signal. The [`Aggregator`]
//! is the single writer of the result list.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Deadline-bound cancellation scope for one scan
///
/// Dropping the session cancels it, so probes never outlive an abandoned
/// scan.
#[derive(Debug)]
pub struct ScanSession {
    deadline: Instant,
    cancel: CancellationToken,
    abort_after_first: bool,
}

impl ScanSession {
    /// Start a session whose deadline is `timeout` from now
    pub fn new(timeout: Duration, abort_after_first: bool) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            cancel: CancellationToken::new(),
            abort_after_first,
        }
    }

    /// Absolute point in time at which the session cancels itself
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Handle on the shared cancellation signal
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Whether the session has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cancel the session now; later calls have no effect
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until the session is over
    ///
    /// Resolves when the deadline passes or when something cancels the
    /// token, whichever comes first. The token is cancelled on return either
    /// way, so every probe observes the end of the session.
    pub async fn finished(&self) {
        tokio::select! {
            _ = tokio::time::sleep_until(self.deadline) => {
                debug!("Scan deadline reached");
                self.cancel.cancel();
            }
            _ = self.cancel.cancelled() => {}
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Single consumer of success reports
pub(crate) struct Aggregator {
    reports: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
    abort_after_first: bool,
    framed: Vec<String>,
}

impl Aggregator {
    pub(crate) fn new(reports: mpsc::UnboundedReceiver<String>, session: &ScanSession) -> Self {
        Self {
            reports,
            cancel: session.token(),
            abort_after_first: session.abort_after_first,
            framed: Vec::new(),
        }
    }

    /// Collect reports in arrival order until the session ends
    ///
    /// Reports already queued are taken before cancellation is noticed.
    pub(crate) async fn run(mut self) -> Vec<String> {
        loop {
            let port = tokio::select! {
                biased;

                report = self.reports.recv() => match report {
                    Some(port) => port,
                    // Every probe has finished
                    None => break,
                },
                _ = self.cancel.cancelled() => break,
            };

            if self.framed.contains(&port) {
                debug!("Ignoring repeated report for {}", port);
                continue;
            }
            self.framed.push(port);

            if self.abort_after_first {
                info!("Found a framed port, aborting remaining probes");
                self.cancel.cancel();
                break;
            }
        }

        self.framed
    }
}
