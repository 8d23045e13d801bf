//! Connection controller: the enterprise join protocol.
//!
//! [`ConnectionController`] validates arguments, forwards calls to the
//! [`EnterpriseDriver`] port, and runs the two wait loops that turn the
//! driver's asynchronous join into a blocking result.  The driver is
//! borrowed for each call and never stored, so the firmware keeps sole
//! ownership of the Wi-Fi subsystem.
//!
//! ```text
//!   Idle ──connect_async──▶ Joining ──▶ Up
//!                              │
//!                              └──▶ AuthFailed | NetworkNotFound
//!                                   | ConnectFailed | Timeout
//! ```
//!
//! Every non-Up outcome is terminal.  Retrying is the caller's business.

use log::{debug, info, warn};

use crate::config::{ControllerConfig, ServiceMode};
use crate::error::{Error, Result};

use super::credentials::{CredentialSet, MAX_SSID_LEN};
use super::link::{LinkStatus, Progress};
use super::ports::{Clock, EnterpriseDriver};

// ───────────────────────────────────────────────────────────────
// Pacer
// ───────────────────────────────────────────────────────────────

/// "Advance the driver and wait a short interval", in whichever
/// [`ServiceMode`] was configured at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    mode: ServiceMode,
    interval_ms: u32,
}

impl Pacer {
    pub fn from_config(config: &ControllerConfig) -> Self {
        Self {
            mode: config.service_mode,
            interval_ms: config.wait_interval_ms(),
        }
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn advance<'c>(&self, driver: &mut impl EnterpriseDriver<'c>, clock: &mut impl Clock) {
        if self.mode == ServiceMode::Poll {
            driver.poll();
        }
        clock.sleep_ms(self.interval_ms);
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectionAttempt
// ───────────────────────────────────────────────────────────────

/// Per-call state of one join.  Lives only for the duration of a
/// blocking connect call.
#[derive(Debug, Clone)]
pub struct ConnectionAttempt<'s> {
    ssid: &'s [u8],
    /// Absolute deadline in clock milliseconds; `None` waits forever.
    deadline: Option<u64>,
    /// Last observed link status; `None` until the first poll.
    status: Option<LinkStatus>,
    polls: u32,
}

impl<'s> ConnectionAttempt<'s> {
    pub fn new(ssid: &'s [u8], deadline: Option<u64>) -> Self {
        Self {
            ssid,
            deadline,
            status: None,
            polls: 0,
        }
    }

    /// Deadline `timeout_ms` after `now_ms`.
    pub fn with_timeout(ssid: &'s [u8], now_ms: u64, timeout_ms: u32) -> Self {
        Self::new(ssid, Some(now_ms.saturating_add(u64::from(timeout_ms))))
    }

    pub fn ssid(&self) -> &[u8] {
        self.ssid
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn status(&self) -> Option<LinkStatus> {
        self.status
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Record one raw status observation.
    pub fn observe(&mut self, raw: i32) -> Progress {
        let status = LinkStatus::from_raw(raw);
        self.status = Some(status);
        self.polls = self.polls.saturating_add(1);
        status.progress()
    }

    pub fn expired(&self, now_ms: u64) -> bool {
        self.deadline.is_some_and(|deadline| now_ms >= deadline)
    }
}

// ───────────────────────────────────────────────────────────────
// ConnectionController
// ───────────────────────────────────────────────────────────────

/// Enterprise connection controller.
pub struct ConnectionController<C: Clock> {
    config: ControllerConfig,
    pacer: Pacer,
    clock: C,
}

impl<C: Clock> ConnectionController<C> {
    pub fn new(config: ControllerConfig, clock: C) -> Self {
        let pacer = Pacer::from_config(&config);
        Self {
            config,
            pacer,
            clock,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    // ── Enterprise mode ───────────────────────────────────────

    /// Turn on enterprise authentication.  Calling it twice is fine.
    pub fn enable<'c>(&self, driver: &mut impl EnterpriseDriver<'c>) -> Result<()> {
        require_initialized(&*driver)?;
        driver.enterprise_enable().map_err(|e| {
            warn!("EAP: failed to enable WPA2-Enterprise: {}", e);
            Error::GenericFailure
        })?;
        info!("EAP: WPA2-Enterprise enabled");
        Ok(())
    }

    /// Turn off enterprise authentication.  Calling it twice is fine.
    pub fn disable<'c>(&self, driver: &mut impl EnterpriseDriver<'c>) -> Result<()> {
        require_initialized(&*driver)?;
        driver.enterprise_disable().map_err(|e| {
            warn!("EAP: failed to disable WPA2-Enterprise: {}", e);
            Error::GenericFailure
        })?;
        info!("EAP: WPA2-Enterprise disabled");
        Ok(())
    }

    // ── Credentials ───────────────────────────────────────────

    /// Hand `credentials` to the driver unchanged for the next join.
    ///
    /// Must not be called while a blocking connect on the same driver is
    /// in flight; the `&mut` borrow of the driver rules that out.
    pub fn configure_credentials<'c, D: EnterpriseDriver<'c>>(
        &self,
        driver: &mut D,
        credentials: &CredentialSet<'c>,
    ) -> Result<()> {
        require_initialized(&*driver)?;
        if !credentials.is_present() {
            return Err(Error::InvalidArgument);
        }
        driver.set_credentials(credentials).map_err(|e| {
            warn!("EAP: failed to set WPA2-Enterprise credentials: {}", e);
            Error::GenericFailure
        })?;
        info!(
            "EAP: credentials set (method={}, ca={}B)",
            credentials.eap_method,
            credentials.ca_certificate.len()
        );
        Ok(())
    }

    /// [`enable`](Self::enable) then
    /// [`configure_credentials`](Self::configure_credentials).  If the
    /// credentials are refused, enterprise mode is turned back off before
    /// the error is returned.
    pub fn start<'c, D: EnterpriseDriver<'c>>(&self, driver: &mut D, credentials: &CredentialSet<'c>) -> Result<()> {
        self.enable(driver)?;
        if let Err(err) = self.configure_credentials(driver, credentials) {
            if let Err(e) = self.disable(driver) {
                warn!("EAP: rollback after failed configuration also failed: {}", e);
            }
            return Err(err);
        }
        Ok(())
    }

    // ── Connect ───────────────────────────────────────────────

    /// Start a join and return as soon as the driver accepts it.
    /// `Ok` does not mean connected.
    pub fn connect_async<'c>(&self, driver: &mut impl EnterpriseDriver<'c>, ssid: &[u8]) -> Result<()> {
        require_initialized(&*driver)?;
        if ssid.is_empty() || ssid.len() > MAX_SSID_LEN {
            return Err(Error::InvalidArgument);
        }
        debug!(
            "EAP: attempting WPA2-Enterprise connection to SSID '{}'",
            String::from_utf8_lossy(ssid)
        );
        driver.join_enterprise(ssid, None).map_err(|e| {
            warn!("EAP: failed to start WPA2-Enterprise connection: {}", e);
            Error::GenericFailure
        })
    }

    /// Join and wait, without a time bound, until the link is up or fails.
    pub fn connect_blocking<'c>(&mut self, driver: &mut impl EnterpriseDriver<'c>, ssid: &[u8]) -> Result<()> {
        self.connect_async(driver, ssid)?;
        let mut attempt = ConnectionAttempt::new(ssid, None);
        self.wait_for_link(driver, &mut attempt)
    }

    /// Join and wait at most `timeout_ms` for the link to come up.
    pub fn connect_with_timeout<'c>(
        &mut self,
        driver: &mut impl EnterpriseDriver<'c>,
        ssid: &[u8],
        timeout_ms: u32,
    ) -> Result<()> {
        let mut attempt = ConnectionAttempt::with_timeout(ssid, self.clock.now_ms(), timeout_ms);
        self.connect_async(driver, ssid)?;
        self.wait_for_link(driver, &mut attempt)
    }

    /// [`connect_with_timeout`](Self::connect_with_timeout) using the
    /// configured default timeout.
    pub fn connect<'c>(&mut self, driver: &mut impl EnterpriseDriver<'c>, ssid: &[u8]) -> Result<()> {
        let timeout_ms = self.config.connect_timeout_ms;
        self.connect_with_timeout(driver, ssid, timeout_ms)
    }

    /// One non-blocking link-status query.
    pub fn link_status<'c>(&self, driver: &mut impl EnterpriseDriver<'c>) -> LinkStatus {
        LinkStatus::from_raw(driver.link_status(self.config.interface))
    }

    // ── Wait loop ─────────────────────────────────────────────

    /// Status first, then deadline, then yield.  A status that resolves
    /// on the deadline iteration therefore still wins.
    fn wait_for_link<'c>(
        &mut self,
        driver: &mut impl EnterpriseDriver<'c>,
        attempt: &mut ConnectionAttempt<'_>,
    ) -> Result<()> {
        loop {
            let raw = driver.link_status(self.config.interface);
            match attempt.observe(raw) {
                Progress::Up => {
                    info!(
                        "EAP: WPA2-Enterprise connection successful after {} polls",
                        attempt.polls()
                    );
                    return Ok(());
                }
                Progress::Failed(err) => {
                    warn!(
                        "EAP: WPA2-Enterprise connection failed with status {} ({})",
                        raw, err
                    );
                    return Err(err);
                }
                Progress::Pending => {}
            }

            if attempt.expired(self.clock.now_ms()) {
                warn!(
                    "EAP: WPA2-Enterprise connection timed out (last status: {:?})",
                    attempt.status()
                );
                return Err(Error::Timeout);
            }

            self.pacer.advance(driver, &mut self.clock);
        }
    }
}

fn require_initialized<'c>(driver: &impl EnterpriseDriver<'c>) -> Result<()> {
    if driver.is_initialized() {
        Ok(())
    } else {
        Err(Error::InvalidArgument)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
