//! Controller configuration parameters
//!
//! Tunables for the connection wait loops and the demo firmware's
//! link-health check.  Everything here is selected at startup; nothing
//! depends on conditional compilation.

use serde::{Deserialize, Serialize};

use crate::app::ports::Interface;

/// How the wait loops let the Wi-Fi driver make progress between status
/// checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServiceMode {
    /// Call the driver's poll entry point, then sleep briefly.
    Poll,
    /// Background servicing is guaranteed; only sleep.
    #[default]
    Background,
}

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Wait strategy used by the blocking connect variants
    pub service_mode: ServiceMode,
    /// Sleep after an explicit driver poll (milliseconds)
    pub poll_interval_ms: u32,
    /// Sleep when relying on background servicing (milliseconds)
    pub background_interval_ms: u32,
    /// Default bound for `connect_with_timeout` (milliseconds)
    pub connect_timeout_ms: u32,
    /// Demo firmware: link health check period (milliseconds)
    pub link_check_interval_ms: u32,
    /// Interface whose link status is queried
    pub interface: Interface,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            service_mode: ServiceMode::Background,
            poll_interval_ms: 5,
            background_interval_ms: 10,
            // Enterprise auth commonly takes 30-60 s.
            connect_timeout_ms: 60_000,
            link_check_interval_ms: 1_000,
            interface: Interface::Sta,
        }
    }
}

impl ControllerConfig {
    /// Sleep applied by one wait-loop iteration in the selected mode.
    pub fn wait_interval_ms(&self) -> u32 {
        match self.service_mode {
            ServiceMode::Poll => self.poll_interval_ms,
            ServiceMode::Background => self.background_interval_ms,
        }
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be non-zero");
        }
        if self.background_interval_ms == 0 {
            return Err("background_interval_ms must be non-zero");
        }
        if self.connect_timeout_ms == 0 {
            return Err("connect_timeout_ms must be non-zero");
        }
        if self.link_check_interval_ms == 0 {
            return Err("link_check_interval_ms must be non-zero");
        }
        if self.wait_interval_ms() >= self.connect_timeout_ms {
            return Err("wait interval must be shorter than connect_timeout_ms");
        }
        Ok(())
    }
}
