//! Application core: the enterprise join protocol, zero I/O.
//!
//! All interaction with the Wi-Fi chip and the system timer happens
//! through the **port traits** defined in [`ports`], keeping this layer
//! testable without real hardware.

pub mod controller;
pub mod credentials;
pub mod link;
pub mod ports;
