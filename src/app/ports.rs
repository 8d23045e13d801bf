//! Port traits: the boundary between the connection controller and the
//! outside world.
//!
//! ```text
//!   EnterpriseWifi ──▶ EnterpriseDriver ──▶ ConnectionController
//!   SystemClock    ──▶ Clock            ──┘
//! ```
//!
//! Driven adapters implement these traits.  The
//! [`ConnectionController`](super::controller::ConnectionController)
//! receives them as `&mut` arguments on every call, so it never owns the
//! Wi-Fi subsystem and tests can substitute recording doubles.
//!
//! ## Credential lifetimes
//!
//! [`EnterpriseDriver`] is parameterised by `'c`, the lifetime of the
//! credential buffers it may read.  A driver that keeps pointers into the
//! caller's buffers (ESP-IDF keeps the CA certificate by reference) is
//! therefore statically prevented from outliving them.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::credentials::CredentialSet;

// ───────────────────────────────────────────────────────────────
// Enterprise driver port (driven adapter: controller → Wi-Fi chip)
// ───────────────────────────────────────────────────────────────

/// Network interface whose link status is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interface {
    /// Station (client) interface.
    #[default]
    Sta,
    /// Soft access-point interface.
    Ap,
}

/// Non-zero status returned synchronously by a driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverError(pub i32);

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "driver status {}", self.0)
    }
}

/// Outcome of a synchronous driver call (`Ok` means status `0`).
pub type DriverResult = Result<(), DriverError>;

/// The already-initialised enterprise-authentication driver.
///
/// None of these calls block.  `join_enterprise` returns once the request
/// is accepted; progress is observed through `link_status`.
pub trait EnterpriseDriver<'c> {
    /// Whether the Wi-Fi subsystem has been brought up by the firmware.
    fn is_initialized(&self) -> bool;

    /// Turn on 802.1X/EAP for the station interface.
    fn enterprise_enable(&mut self) -> DriverResult;

    /// Turn off 802.1X/EAP for the station interface.
    fn enterprise_disable(&mut self) -> DriverResult;

    /// Hand the credential set to the driver for the next join.
    fn set_credentials(&mut self, credentials: &CredentialSet<'c>) -> DriverResult;

    /// Start an asynchronous join.  `channel` `None` lets the driver scan.
    fn join_enterprise(&mut self, ssid: &[u8], channel: Option<u8>) -> DriverResult;

    /// One synchronous link-status query (raw driver code, see
    /// [`LinkStatus`](super::link::LinkStatus)).
    fn link_status(&mut self, interface: Interface) -> i32;

    /// Service the driver's internal state machine.  Drivers that run
    /// their own background task keep the default no-op.
    fn poll(&mut self) {}
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: controller → system timer)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source and sleep primitive for the wait loops.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin (monotonic).
    fn now_ms(&self) -> u64;

    /// Block the calling task for `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}
