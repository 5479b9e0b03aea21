//! Virtual serial devices
//!
//! Each device runs as a background task writing into the device half of a
//! `tokio::io::duplex` pair. The host half is handed to the caller and reads
//! exactly like an opened port. A device goes idle (but keeps the stream
//! open) once it has nothing left to send, and exits when the host half is
//! dropped.

use std::io;
use std::time::Duration;

use hdlc_protocol::{encode_frame, encode_unchecked, fcs16};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};
use tracing::{debug, trace};

/// In-memory buffer between the device and host halves
const DUPLEX_CAPACITY: usize = 4096;

/// Sample sentence written by [`DeviceBehavior::Noise`] devices
const NMEA_SENTENCE: &[u8] =
    b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";

/// What a virtual device writes to its stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceBehavior {
    /// Valid HDLC frames
    Framed {
        /// Delay before the first frame
        initial_delay: Duration,
        /// Delay between frames
        interval: Duration,
        /// Number of frames to send before going idle (`None` = forever)
        count: Option<usize>,
    },
    /// Nothing at all
    Silent,
    /// Unframed ASCII text, one line per interval
    Noise {
        /// Delay between lines
        interval: Duration,
    },
    /// Frames whose FCS never matches
    Corrupt {
        /// Delay between frames
        interval: Duration,
    },
}

impl DeviceBehavior {
    /// Valid frames forever, starting immediately
    pub fn framed(interval: Duration) -> Self {
        Self::Framed {
            initial_delay: Duration::ZERO,
            interval,
            count: None,
        }
    }

    /// Valid frames forever, starting after `initial_delay`
    pub fn framed_after(initial_delay: Duration, interval: Duration) -> Self {
        Self::Framed {
            initial_delay,
            interval,
            count: None,
        }
    }
}

/// A simulated device attached to an in-memory stream
#[derive(Debug, Clone)]
pub struct VirtualDevice {
    behavior: DeviceBehavior,
    address: u8,
}

impl VirtualDevice {
    /// Create a device with the given behavior
    pub fn new(behavior: DeviceBehavior) -> Self {
        Self {
            behavior,
            address: 0xFF,
        }
    }

    /// Set the address byte carried in every frame
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Spawn the device task and return the host half of its stream
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> DuplexStream {
        let (host, device) = tokio::io::duplex(DUPLEX_CAPACITY);
        tokio::spawn(async move {
            if let Err(e) = self.run(device).await {
                trace!("Virtual device stopped: {}", e);
            }
        });
        host
    }

    /// Drive the device over `io` until the host side goes away
    pub async fn run<T>(self, mut io: T) -> io::Result<()>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        debug!("Virtual device starting: {:?}", self.behavior);

        match self.behavior {
            DeviceBehavior::Framed {
                initial_delay,
                interval,
                count,
            } => {
                tokio::time::sleep(initial_delay).await;
                let mut seq: u8 = 0;
                let mut sent = 0usize;
                while count.map_or(true, |limit| sent < limit) {
                    io.write_all(&encode_frame(&self.payload(seq))).await?;
                    seq = seq.wrapping_add(1);
                    sent += 1;
                    tokio::time::sleep(interval).await;
                }
            }
            DeviceBehavior::Silent => {}
            DeviceBehavior::Noise { interval } => loop {
                io.write_all(NMEA_SENTENCE).await?;
                tokio::time::sleep(interval).await;
            },
            DeviceBehavior::Corrupt { interval } => {
                let mut seq: u8 = 0;
                loop {
                    let payload = self.payload(seq);
                    let mut body = payload.clone();
                    body.extend_from_slice(&(!fcs16(&payload)).to_le_bytes());
                    io.write_all(&encode_unchecked(&body)).await?;
                    seq = seq.wrapping_add(1);
                    tokio::time::sleep(interval).await;
                }
            }
        }

        idle(&mut io).await
    }

    /// Address, UI control field and a sequence number
    fn payload(&self, seq: u8) -> Vec<u8> {
        vec![self.address, 0x03, seq]
    }
}

/// Hold the stream open until the host half is dropped
async fn idle<T>(io: &mut T) -> io::Result<()>
where
    T: AsyncRead + Unpin,
{
    let mut buf = [0u8; 64];
    while io.read(&mut buf).await? > 0 {}
    Ok(())
}
