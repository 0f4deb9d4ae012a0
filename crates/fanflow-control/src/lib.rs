//! FanFlow Control - Device Output and Streaming
//!
//! This crate drives one fan controller:
//! - **Art-Net**: DMX-over-UDP packet encoding for the fan's pixels
//! - **Device API**: topology fetch and log access over HTTP
//! - **Streaming**: the capture → encode → transmit pipeline
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fanflow_control::{stream, DeviceAddress, DeviceClient, StreamConfig};
//! use fanflow_core::SolidColor;
//!
//! # fn main() -> fanflow_control::Result<()> {
//! let device = DeviceClient::new("192.168.4.1")?;
//! let endpoint = device.endpoint_info("concentric")?;
//!
//! stream(
//!     StreamConfig {
//!         device_ip: "192.168.4.1".parse().unwrap(),
//!         address: DeviceAddress::new(endpoint.net, 0, 0),
//!         sample_map: endpoint.sample_map()?,
//!         frames_per_second: 30,
//!     },
//!     Box::new(SolidColor::new(64, 64, [255, 128, 0])),
//! )?;
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]

/// Art-Net packet encoding
pub mod artnet;
/// Device HTTP API client
pub mod device;
/// Error types
pub mod error;
/// The streaming pipeline
pub mod stream;

// Re-exports
pub use artnet::{ArtNetEncoder, DeviceAddress, PacketBatch, ART_NET_PORT};
pub use device::{DeviceClient, EndpointInfo};
pub use error::{ControlError, Result};
pub use stream::{stream, StreamConfig, StreamPipeline, TransmitLoop};
