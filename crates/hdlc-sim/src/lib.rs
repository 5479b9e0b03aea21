//! Serial Device Simulation Library
//!
//! This crate provides stand-ins for serial devices so that port detection
//! can be exercised without physical hardware. It includes:
//!
//! - **VirtualDevice**: writes HDLC frames, NMEA-style text, corrupt frames
//!   or nothing at all into one end of an in-memory duplex stream
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use hdlc_sim::{DeviceBehavior, VirtualDevice};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let stream = VirtualDevice::new(DeviceBehavior::framed(Duration::from_millis(10))).spawn();
//! // `stream` can now be read like an opened serial port
//! # drop(stream);
//! # }
//! ```

pub mod device;

pub use device::{DeviceBehavior, VirtualDevice};
