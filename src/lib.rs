//! WPA2-Enterprise connection controller library.
//!
//! Exposes the controller, its port traits and the platform adapters for
//! integration testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

// The ESP-IDF code paths are selected by target, the crates they need by
// feature.  Both must agree.
#[cfg(all(target_os = "espidf", not(feature = "espidf")))]
compile_error!("building for an ESP-IDF target requires `--features espidf`");

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;

pub use app::controller::ConnectionController;
pub use app::credentials::{CredentialBuffers, CredentialSet, EapMethod};
pub use app::link::LinkStatus;
pub use config::ControllerConfig;
pub use error::{Error, Result};
