//! Link status codes and their mapping onto controller results.
//!
//! The driver reports link progress as a signed integer: non-negative
//! values are progress states, negative values are failures.  The
//! failure mapping is a lookup table with a [`Error::ConnectFailed`]
//! fallback, so a status value this crate has never seen still ends the
//! wait loop as a failure instead of spinning.

use core::fmt;

use crate::error::Error;

/// Raw link codes (CYW43 numbering, shared by every driver in this crate).
pub const LINK_DOWN: i32 = 0;
pub const LINK_JOIN: i32 = 1;
pub const LINK_NOIP: i32 = 2;
pub const LINK_UP: i32 = 3;
pub const LINK_FAIL: i32 = -1;
pub const LINK_NONET: i32 = -2;
pub const LINK_BADAUTH: i32 = -3;

/// Negative link codes with a dedicated controller error.  Anything
/// negative and absent here maps to [`Error::ConnectFailed`].
const FAILURE_TABLE: [(i32, Error); 3] = [
    (LINK_BADAUTH, Error::AuthFailed),
    (LINK_NONET, Error::NetworkNotFound),
    (LINK_FAIL, Error::ConnectFailed),
];

/// Typed view of a raw link code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Down,
    Joining,
    /// Associated and authenticated, waiting for DHCP.
    NoIp,
    Up,
    Fail,
    NoNet,
    BadAuth,
    Unknown(i32),
}

impl LinkStatus {
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            LINK_DOWN => Self::Down,
            LINK_JOIN => Self::Joining,
            LINK_NOIP => Self::NoIp,
            LINK_UP => Self::Up,
            LINK_FAIL => Self::Fail,
            LINK_NONET => Self::NoNet,
            LINK_BADAUTH => Self::BadAuth,
            other => Self::Unknown(other),
        }
    }

    pub const fn raw(self) -> i32 {
        match self {
            Self::Down => LINK_DOWN,
            Self::Joining => LINK_JOIN,
            Self::NoIp => LINK_NOIP,
            Self::Up => LINK_UP,
            Self::Fail => LINK_FAIL,
            Self::NoNet => LINK_NONET,
            Self::BadAuth => LINK_BADAUTH,
            Self::Unknown(raw) => raw,
        }
    }

    pub const fn is_up(self) -> bool {
        matches!(self, Self::Up)
    }

    /// Up, or any failure.
    pub const fn is_terminal(self) -> bool {
        self.is_up() || self.raw() < 0
    }

    pub fn progress(self) -> Progress {
        classify(self.raw())
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down => write!(f, "Disconnected"),
            Self::Joining => write!(f, "Connecting..."),
            Self::NoIp => write!(f, "Connected but no IP address"),
            Self::Up => write!(f, "Connected with IP address"),
            Self::Fail => write!(f, "Connection failed"),
            Self::NoNet => write!(f, "Network not found"),
            Self::BadAuth => write!(f, "Authentication failed"),
            Self::Unknown(raw) => write!(f, "Unknown status ({})", raw),
        }
    }
}

/// Where a connection attempt stands after one status observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Not terminal yet; keep waiting.
    Pending,
    /// Fully up.
    Up,
    /// Terminal failure.
    Failed(Error),
}

impl Progress {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Error for a negative link code.
pub fn failure_for(raw: i32) -> Error {
    FAILURE_TABLE
        .iter()
        .find(|(code, _)| *code == raw)
        .map_or(Error::ConnectFailed, |(_, err)| *err)
}

/// Total mapping from raw link code to attempt progress.
pub fn classify(raw: i32) -> Progress {
    if raw == LINK_UP {
        Progress::Up
    } else if raw < 0 {
        Progress::Failed(failure_for(raw))
    } else {
        Progress::Pending
    }
}
