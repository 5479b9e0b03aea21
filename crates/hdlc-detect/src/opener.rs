//! Opening candidate devices

use tokio::io::AsyncRead;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::debug;

use crate::error::DetectError;

/// Default line speed for probed ports
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Opens a candidate device as a readable byte stream
///
/// Failure is local to the one candidate being opened.
pub trait PortOpener: Send + Sync + 'static {
    /// Stream type produced for an opened device
    type Stream: AsyncRead + Unpin + Send + 'static;

    /// Open the device identified by `port`
    fn open(&self, port: &str) -> Result<Self::Stream, DetectError>;
}

/// Opens real serial devices through `tokio-serial`
#[derive(Debug, Clone, Copy)]
pub struct SerialOpener {
    baud_rate: u32,
}

impl SerialOpener {
    /// Open ports at the given baud rate, 8N1 without flow control
    pub fn new(baud_rate: u32) -> Self {
        Self { baud_rate }
    }

    /// Configured baud rate
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

impl Default for SerialOpener {
    fn default() -> Self {
        Self::new(DEFAULT_BAUD_RATE)
    }
}

impl PortOpener for SerialOpener {
    type Stream = SerialStream;

    fn open(&self, port: &str) -> Result<SerialStream, DetectError> {
        debug!("Opening {} at {} baud", port, self.baud_rate);

        tokio_serial::new(port, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open_native_async()
            .map_err(|e| DetectError::open_failed(port, e))
    }
}
