//! Error taxonomy for the enterprise connection controller.
//!
//! Every controller operation returns either `Ok(())` or exactly one of
//! these variants.  All variants are `Copy` so they can be handed back
//! through the wait loops and logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Controller error
// ---------------------------------------------------------------------------

/// Result values surfaced by [`ConnectionController`](crate::app::controller::ConnectionController).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// Null/empty/out-of-range input or an uninitialised driver.
    /// Detected before any driver call.
    InvalidArgument,
    /// The driver reported bad authentication.
    AuthFailed,
    /// The driver found no network matching the SSID.
    NetworkNotFound,
    /// Any other negative link status.
    ConnectFailed,
    /// The deadline elapsed before a terminal link status was observed.
    Timeout,
    /// A driver call returned a non-zero status synchronously.
    GenericFailure,
}

impl Error {
    /// Every error variant, in platform-code order.
    pub const ALL: [Self; 6] = [
        Self::GenericFailure,
        Self::Timeout,
        Self::NetworkNotFound,
        Self::InvalidArgument,
        Self::AuthFailed,
        Self::ConnectFailed,
    ];

    /// Numeric platform error code (Pico-SDK numbering, `0` is success).
    pub const fn code(self) -> i32 {
        match self {
            Self::GenericFailure => -1,
            Self::Timeout => -2,
            Self::NetworkNotFound => -3,
            Self::InvalidArgument => -5,
            Self::AuthFailed => -7,
            Self::ConnectFailed => -8,
        }
    }

    /// Inverse of [`code`](Self::code).  `None` for `0` and unknown codes.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }

    /// Operator hint printed by the demo firmware next to a failure.
    pub const fn hint(self) -> &'static str {
        match self {
            Self::InvalidArgument => "check the SSID and credential fields",
            Self::AuthFailed => "check identity, username, password and CA certificate",
            Self::NetworkNotFound => "check the SSID and that the AP is in range",
            Self::ConnectFailed => "the access point refused the association",
            Self::Timeout => "enterprise authentication can take 30-60 s; retry or raise the timeout",
            Self::GenericFailure => "the Wi-Fi driver rejected the request",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::AuthFailed => write!(f, "authentication failed"),
            Self::NetworkNotFound => write!(f, "network not found"),
            Self::ConnectFailed => write!(f, "connection failed"),
            Self::Timeout => write!(f, "connection timed out"),
            Self::GenericFailure => write!(f, "driver failure"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
