//! Fuzz target: `ConnectionController::connect_async` SSID validation
//!
//! Any byte string is offered as an SSID.  Lengths 1..=32 must produce
//! exactly one join carrying the same bytes; anything else must be
//! rejected without touching the driver.
//!
//! cargo fuzz run fuzz_connect_async

#![no_main]

use eapwifi::app::credentials::CredentialSet;
use eapwifi::app::ports::{Clock, DriverResult, EnterpriseDriver, Interface};
use eapwifi::{ConnectionController, ControllerConfig, Error};
use libfuzzer_sys::fuzz_target;

struct NoClock;

impl Clock for NoClock {
    fn now_ms(&self) -> u64 {
        0
    }
    fn sleep_ms(&mut self, _ms: u32) {}
}

#[derive(Default)]
struct Recorder {
    joined: Vec<Vec<u8>>,
}

impl<'c> EnterpriseDriver<'c> for Recorder {
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
    fn join_enterprise(&mut self, ssid: &[u8], _channel: Option<u8>) -> DriverResult {
        self.joined.push(ssid.to_vec());
        Ok(())
    }
    fn link_status(&mut self, _interface: Interface) -> i32 {
        0
    }
}

fuzz_target!(|data: &[u8]| {
    let ctl = ConnectionController::new(ControllerConfig::default(), NoClock);
    let mut drv = Recorder::default();

    match ctl.connect_async(&mut drv, data) {
        Ok(()) => {
            assert!((1..=32).contains(&data.len()));
            assert_eq!(drv.joined, vec![data.to_vec()]);
        }
        Err(e) => {
            assert_eq!(e, Error::InvalidArgument);
            assert!(data.is_empty() || data.len() > 32);
            assert!(drv.joined.is_empty());
        }
    }
});
