//! Device HTTP API client
//!
//! The fan controller exposes a small HTTP interface next to its Art-Net
//! listener: `GET /i` describes the advertised output endpoints (the
//! sampling topology) and `GET /log` returns the device's in-memory log.

use std::time::Duration;

use serde::Deserialize;

use fanflow_core::SampleMap;

use crate::{ControlError, Result};

/// One advertised output endpoint, as served under its name by `GET /i`.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointInfo {
    /// Art-Net net this endpoint listens on.
    pub net: u8,
    /// Flat `[x0, y0, x1, y1, ...]` fractional sample coordinates
    /// (concentric endpoints).
    #[serde(default)]
    pub pixels: Option<Vec<f32>>,
    /// Virtual screen width (cartesian endpoints).
    #[serde(default)]
    pub width: Option<u32>,
    /// Virtual screen height (cartesian endpoints).
    #[serde(default)]
    pub height: Option<u32>,
}

impl EndpointInfo {
    /// Derive the sample map this endpoint wants to be fed with.
    pub fn sample_map(&self) -> Result<SampleMap> {
        if let Some(pixels) = &self.pixels {
            if pixels.len() % 2 != 0 {
                return Err(ControlError::InvalidTopology(format!(
                    "odd coordinate count: {}",
                    pixels.len()
                )));
            }
            let coords = pixels.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();
            return Ok(SampleMap::Concentric { coords });
        }

        match (self.width, self.height) {
            (Some(width), Some(height)) => Ok(SampleMap::Cartesian { width, height }),
            _ => Err(ControlError::InvalidTopology(
                "endpoint advertises neither pixels nor a resolution".into(),
            )),
        }
    }
}

/// Blocking client for the controller's HTTP interface.
pub struct DeviceClient {
    client: reqwest::blocking::Client,
    base: String,
}

impl DeviceClient {
    /// Client for the device at `ip`.
    pub fn new(ip: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base: format!("http://{ip}"),
        })
    }

    /// Fetch the topology descriptor and return the endpoint named
    /// `endpoint`.
    pub fn endpoint_info(&self, endpoint: &str) -> Result<EndpointInfo> {
        let info: serde_json::Value = self
            .client
            .get(format!("{}/i", self.base))
            .send()?
            .error_for_status()?
            .json()?;

        let entry = info
            .get(endpoint)
            .cloned()
            .ok_or_else(|| ControlError::EndpointNotFound(endpoint.to_string()))?;

        Ok(serde_json::from_value(entry)?)
    }

    /// Fetch the device's log buffer.
    pub fn log(&self) -> Result<String> {
        Ok(self
            .client
            .get(format!("{}/log", self.base))
            .send()?
            .error_for_status()?
            .text()?)
    }
}
