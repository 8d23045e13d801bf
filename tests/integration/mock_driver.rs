//! Mock enterprise driver and virtual clock for integration tests.
//!
//! Records every driver call so tests can assert on the full command
//! history without touching a real Wi-Fi chip.

use eapwifi::app::credentials::{CredentialSet, EapMethod};
use eapwifi::app::ports::{Clock, DriverError, DriverResult, EnterpriseDriver, Interface};

// ── Driver call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Enable,
    Disable,
    SetCredentials {
        identity: Vec<u8>,
        username: Vec<u8>,
        password: Vec<u8>,
        ca_len: usize,
        method: EapMethod,
        disable_time_check: bool,
    },
    Join { ssid: Vec<u8>, channel: Option<u8> },
    LinkStatus(Interface),
    Poll,
}

// ── MockDriver ────────────────────────────────────────────────

pub struct MockDriver {
    pub calls: Vec<DriverCall>,
    pub initialized: bool,
    /// Status returned by every synchronous call, `None` for success.
    pub reject_with: Option<i32>,
    /// Link codes replayed by `link_status`; the last entry repeats.
    script: Vec<i32>,
    queries: usize,
}

#[allow(dead_code)]
impl MockDriver {
    pub fn new(script: &[i32]) -> Self {
        Self {
            calls: Vec::new(),
            initialized: true,
            reject_with: None,
            script: script.to_vec(),
            queries: 0,
        }
    }

    pub fn uninitialized() -> Self {
        Self {
            initialized: false,
            ..Self::new(&[0])
        }
    }

    pub fn rejecting(code: i32) -> Self {
        Self {
            reject_with: Some(code),
            ..Self::new(&[0])
        }
    }

    pub fn count(&self, pred: impl Fn(&DriverCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn joins(&self) -> usize {
        self.count(|c| matches!(c, DriverCall::Join { .. }))
    }

    pub fn status_queries(&self) -> usize {
        self.count(|c| matches!(c, DriverCall::LinkStatus(_)))
    }

    pub fn polls(&self) -> usize {
        self.count(|c| *c == DriverCall::Poll)
    }

    fn status(&self) -> DriverResult {
        match self.reject_with {
            Some(code) => Err(DriverError(code)),
            None => Ok(()),
        }
    }
}

impl<'c> EnterpriseDriver<'c> for MockDriver {
    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn enterprise_enable(&mut self) -> DriverResult {
        self.calls.push(DriverCall::Enable);
        self.status()
    }

    fn enterprise_disable(&mut self) -> DriverResult {
        self.calls.push(DriverCall::Disable);
        self.status()
    }

    fn set_credentials(&mut self, credentials: &CredentialSet<'c>) -> DriverResult {
        self.calls.push(DriverCall::SetCredentials {
            identity: credentials.identity.to_vec(),
            username: credentials.username.to_vec(),
            password: credentials.password.to_vec(),
            ca_len: credentials.ca_certificate.len(),
            method: credentials.eap_method,
            disable_time_check: credentials.disable_time_check,
        });
        self.status()
    }

    fn join_enterprise(&mut self, ssid: &[u8], channel: Option<u8>) -> DriverResult {
        self.calls.push(DriverCall::Join {
            ssid: ssid.to_vec(),
            channel,
        });
        self.status()
    }

    fn link_status(&mut self, interface: Interface) -> i32 {
        self.calls.push(DriverCall::LinkStatus(interface));
        let i = self.queries.min(self.script.len().saturating_sub(1));
        self.queries += 1;
        self.script.get(i).copied().unwrap_or(0)
    }

    fn poll(&mut self) {
        self.calls.push(DriverCall::Poll);
    }
}

// ── VirtualClock ──────────────────────────────────────────────

/// Sleeping advances time instantly.
#[derive(Debug, Default)]
pub struct VirtualClock {
    pub now: u64,
    pub sleeps: Vec<u32>,
}

impl Clock for VirtualClock {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.now += u64::from(ms);
        self.sleeps.push(ms);
    }
}
