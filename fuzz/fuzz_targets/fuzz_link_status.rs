//! Fuzz target: blocking connect against an arbitrary link-status script
//!
//! Each 4-byte chunk of input is one raw status code returned by the
//! driver.  The wait loop must never panic and must only report success
//! when the status it last saw was UP.
//!
//! cargo fuzz run fuzz_link_status

#![no_main]

use eapwifi::app::credentials::CredentialSet;
use eapwifi::app::link::{LINK_UP, LinkStatus, classify};
use eapwifi::app::ports::{Clock, DriverResult, EnterpriseDriver, Interface};
use eapwifi::{ConnectionController, ControllerConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct StepClock(u64);

impl Clock for StepClock {
    fn now_ms(&self) -> u64 {
        self.0
    }
    fn sleep_ms(&mut self, ms: u32) {
        self.0 += u64::from(ms);
    }
}

struct Script {
    codes: Vec<i32>,
    next: usize,
    last: i32,
}

impl<'c> EnterpriseDriver<'c> for Script {
    fn is_initialized(&self) -> bool {
        true
    }
    fn enterprise_enable(&mut self) -> DriverResult {
        Ok(())
    }
    fn enterprise_disable(&mut self) -> DriverResult {
        Ok(())
    }
    fn set_credentials(&mut self, _credentials: &CredentialSet<'c>) -> DriverResult {
        Ok(())
    }
    fn join_enterprise(&mut self, _ssid: &[u8], _channel: Option<u8>) -> DriverResult {
        Ok(())
    }
    fn link_status(&mut self, _interface: Interface) -> i32 {
        // Past the end of the script the link hangs in JOIN.
        self.last = self.codes.get(self.next).copied().unwrap_or(1);
        self.next += 1;
        self.last
    }
}

fuzz_target!(|data: &[u8]| {
    let codes: Vec<i32> = data
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    for &raw in &codes {
        // Mapping is total and agrees with the typed view.
        assert_eq!(classify(raw), LinkStatus::from_raw(raw).progress());
    }

    let mut drv = Script {
        codes,
        next: 0,
        last: 0,
    };
    let mut ctl = ConnectionController::new(ControllerConfig::default(), StepClock::default());
    let result = ctl.connect_with_timeout(&mut drv, b"fuzz", 500);

    assert_eq!(result.is_ok(), drv.last == LINK_UP);
});
