//! HDLC Serial Port Detection Library
//!
//! This crate finds the serial ports that are actively emitting HDLC-framed
//! data. Every candidate port is probed concurrently under a single shared
//! deadline; a port counts as framed once it delivers enough valid frames.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), hdlc_detect::DetectError> {
//! let framed = hdlc_detect::scan(Duration::from_secs(10), true).await?;
//!
//! for port in framed {
//!     println!("Found framed port: {}", port);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod opener;
pub mod orchestrator;
pub mod probe;
pub mod scanner;
pub mod session;

pub use error::DetectError;
pub use opener::{PortOpener, SerialOpener};
pub use orchestrator::{scan, HdlcScanner, ScanConfig};
pub use probe::{PortProbe, Verdict};
pub use scanner::{PortEnumerator, PortScanner, ScannerConfig, SerialPortInfo};
pub use session::ScanSession;
