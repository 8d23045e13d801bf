//! Integration tests for the connection controller against the recording
//! mock driver.

use std::time::Instant;

use eapwifi::adapters::time::SystemClock;
use eapwifi::app::credentials::{CredentialSet, EapMethod};
use eapwifi::app::link::{LINK_BADAUTH, LINK_DOWN, LINK_FAIL, LINK_JOIN, LINK_NOIP, LINK_NONET, LINK_UP};
use eapwifi::app::ports::Interface;
use eapwifi::config::{ControllerConfig, ServiceMode};
use eapwifi::{ConnectionController, Error, LinkStatus};

use super::mock_driver::{DriverCall, MockDriver, VirtualClock};

const CA: &[u8] = b"-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";

fn controller() -> ConnectionController<VirtualClock> {
    ConnectionController::new(ControllerConfig::default(), VirtualClock::default())
}

fn peap() -> CredentialSet<'static> {
    CredentialSet::new(b"user@example.com", EapMethod::Peap)
        .with_password(b"user", b"secret")
        .with_ca_certificate(CA)
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn eduroam_peap_up_after_three_polls() {
    let mut drv = MockDriver::new(&[LINK_JOIN, LINK_NOIP, LINK_UP]);
    let mut ctl = controller();

    ctl.enable(&mut drv).unwrap();
    ctl.configure_credentials(&mut drv, &peap()).unwrap();
    assert_eq!(ctl.connect_with_timeout(&mut drv, b"eduroam", 60_000), Ok(()));

    assert_eq!(drv.joins(), 1);
    assert_eq!(drv.status_queries(), 3);
    assert!(drv.calls.contains(&DriverCall::Join {
        ssid: b"eduroam".to_vec(),
        channel: None,
    }));
    // Two waits between three queries.
    assert_eq!(ctl.clock().sleeps, vec![10, 10]);
}

#[test]
fn empty_ssid_never_reaches_driver() {
    let mut drv = MockDriver::new(&[LINK_UP]);
    let ctl = controller();
    assert_eq!(ctl.connect_async(&mut drv, b""), Err(Error::InvalidArgument));
    assert!(drv.calls.is_empty());
}

#[test]
fn oversized_ssid_never_reaches_driver() {
    let mut drv = MockDriver::new(&[LINK_UP]);
    let mut ctl = controller();
    let ssid = [b'a'; 33];
    assert_eq!(ctl.connect_blocking(&mut drv, &ssid), Err(Error::InvalidArgument));
    assert!(drv.calls.is_empty());
}

#[test]
fn max_length_ssid_is_accepted() {
    let mut drv = MockDriver::new(&[LINK_UP]);
    let ctl = controller();
    assert_eq!(ctl.connect_async(&mut drv, &[b'a'; 32]), Ok(()));
    assert_eq!(drv.joins(), 1);
}

#[test]
fn bad_auth_fails_immediately_in_both_variants() {
    let mut drv = MockDriver::new(&[LINK_BADAUTH]);
    let mut ctl = controller();
    assert_eq!(ctl.connect_blocking(&mut drv, b"eduroam"), Err(Error::AuthFailed));
    assert_eq!(drv.status_queries(), 1);

    let mut drv = MockDriver::new(&[LINK_BADAUTH]);
    assert_eq!(
        ctl.connect_with_timeout(&mut drv, b"eduroam", 60_000),
        Err(Error::AuthFailed)
    );
    assert_eq!(drv.status_queries(), 1);
    assert!(ctl.clock().sleeps.is_empty());
}

#[test]
fn failure_codes_map_to_errors() {
    for (code, expected) in [
        (LINK_NONET, Error::NetworkNotFound),
        (LINK_FAIL, Error::ConnectFailed),
        (-42, Error::ConnectFailed),
    ] {
        let mut drv = MockDriver::new(&[LINK_JOIN, code]);
        let mut ctl = controller();
        assert_eq!(ctl.connect_blocking(&mut drv, b"net"), Err(expected), "code={code}");
    }
}

#[test]
fn never_resolving_link_times_out() {
    let mut drv = MockDriver::new(&[LINK_JOIN]);
    let mut ctl = controller();
    assert_eq!(ctl.connect_with_timeout(&mut drv, b"net", 100), Err(Error::Timeout));

    let elapsed = ctl.clock().now;
    assert!((100..=110).contains(&elapsed), "elapsed={elapsed}");
}

#[test]
fn connect_uses_configured_timeout() {
    let config = ControllerConfig {
        connect_timeout_ms: 250,
        ..ControllerConfig::default()
    };
    let mut ctl = ConnectionController::new(config, VirtualClock::default());
    let mut drv = MockDriver::new(&[LINK_NOIP]);
    assert_eq!(ctl.connect(&mut drv, b"net"), Err(Error::Timeout));
    assert!((250..=260).contains(&ctl.clock().now));
}

#[test]
fn real_clock_timeout_is_bounded() {
    let config = ControllerConfig {
        background_interval_ms: 10,
        ..ControllerConfig::default()
    };
    let mut ctl = ConnectionController::new(config, SystemClock::new());
    let mut drv = MockDriver::new(&[LINK_JOIN]);

    let start = Instant::now();
    assert_eq!(ctl.connect_with_timeout(&mut drv, b"net", 100), Err(Error::Timeout));
    let elapsed = start.elapsed().as_millis();
    assert!((100..500).contains(&elapsed), "elapsed={elapsed}ms");
}

#[test]
fn poll_mode_services_driver_between_checks() {
    let config = ControllerConfig {
        service_mode: ServiceMode::Poll,
        ..ControllerConfig::default()
    };
    let mut ctl = ConnectionController::new(config, VirtualClock::default());
    let mut drv = MockDriver::new(&[LINK_JOIN, LINK_JOIN, LINK_UP]);

    assert_eq!(ctl.connect_blocking(&mut drv, b"net"), Ok(()));
    assert_eq!(drv.polls(), 2);
    assert_eq!(ctl.clock().sleeps, vec![5, 5]);
}

#[test]
fn background_mode_never_polls() {
    let mut drv = MockDriver::new(&[LINK_JOIN, LINK_UP]);
    let mut ctl = controller();
    assert_eq!(ctl.connect_blocking(&mut drv, b"net"), Ok(()));
    assert_eq!(drv.polls(), 0);
}

// ── Driver rejections ─────────────────────────────────────────

#[test]
fn driver_rejections_become_generic_failure() {
    let mut drv = MockDriver::rejecting(-12);
    let mut ctl = controller();
    assert_eq!(ctl.enable(&mut drv), Err(Error::GenericFailure));
    assert_eq!(ctl.disable(&mut drv), Err(Error::GenericFailure));
    assert_eq!(ctl.configure_credentials(&mut drv, &peap()), Err(Error::GenericFailure));
    assert_eq!(ctl.connect_async(&mut drv, b"net"), Err(Error::GenericFailure));
    assert_eq!(ctl.connect_blocking(&mut drv, b"net"), Err(Error::GenericFailure));
    // A rejected join is never followed by status queries.
    assert_eq!(drv.status_queries(), 0);
}

#[test]
fn uninitialized_driver_is_invalid_argument_everywhere() {
    let mut drv = MockDriver::uninitialized();
    let mut ctl = controller();
    assert_eq!(ctl.enable(&mut drv), Err(Error::InvalidArgument));
    assert_eq!(ctl.disable(&mut drv), Err(Error::InvalidArgument));
    assert_eq!(ctl.configure_credentials(&mut drv, &peap()), Err(Error::InvalidArgument));
    assert_eq!(ctl.connect_async(&mut drv, b"net"), Err(Error::InvalidArgument));
    assert_eq!(ctl.connect_with_timeout(&mut drv, b"net", 100), Err(Error::InvalidArgument));
    assert!(drv.calls.is_empty());
}

#[test]
fn enable_and_disable_are_idempotent() {
    let mut drv = MockDriver::new(&[LINK_DOWN]);
    let ctl = controller();
    for _ in 0..2 {
        assert_eq!(ctl.enable(&mut drv), Ok(()));
    }
    for _ in 0..2 {
        assert_eq!(ctl.disable(&mut drv), Ok(()));
    }
    assert_eq!(
        drv.calls,
        vec![DriverCall::Enable, DriverCall::Enable, DriverCall::Disable, DriverCall::Disable]
    );
}

// ── Credentials ───────────────────────────────────────────────

#[test]
fn credentials_pass_through_unchanged() {
    let mut drv = MockDriver::new(&[LINK_DOWN]);
    let ctl = controller();
    let creds = peap().with_time_check(true);
    ctl.configure_credentials(&mut drv, &creds).unwrap();

    assert_eq!(
        drv.calls,
        vec![DriverCall::SetCredentials {
            identity: b"user@example.com".to_vec(),
            username: b"user".to_vec(),
            password: b"secret".to_vec(),
            ca_len: CA.len(),
            method: EapMethod::Peap,
            disable_time_check: false,
        }]
    );
}

#[test]
fn missing_identity_is_rejected() {
    let mut drv = MockDriver::new(&[LINK_DOWN]);
    let ctl = controller();
    let creds = CredentialSet::new(b"", EapMethod::Tls);
    assert_eq!(ctl.configure_credentials(&mut drv, &creds), Err(Error::InvalidArgument));
    assert!(drv.calls.is_empty());
}

// ── Link status ───────────────────────────────────────────────

#[test]
fn link_status_queries_configured_interface_once() {
    let config = ControllerConfig {
        interface: Interface::Ap,
        ..ControllerConfig::default()
    };
    let ctl = ConnectionController::new(config, VirtualClock::default());
    let mut drv = MockDriver::new(&[LINK_NOIP]);
    assert_eq!(ctl.link_status(&mut drv), LinkStatus::NoIp);
    assert_eq!(drv.calls, vec![DriverCall::LinkStatus(Interface::Ap)]);
}

// ── Bring-up ──────────────────────────────────────────────────

#[test]
fn start_enables_then_configures() {
    let mut drv = MockDriver::new(&[LINK_DOWN]);
    let ctl = controller();
    assert_eq!(ctl.start(&mut drv, &peap()), Ok(()));
    assert_eq!(drv.calls[0], DriverCall::Enable);
    assert!(matches!(drv.calls[1], DriverCall::SetCredentials { .. }));
    assert_eq!(drv.calls.len(), 2);
}

#[test]
fn start_disables_again_when_credentials_are_refused() {
    let mut drv = MockDriver::new(&[LINK_DOWN]);
    let ctl = controller();
    let creds = CredentialSet::new(b"", EapMethod::Peap);
    assert_eq!(ctl.start(&mut drv, &creds), Err(Error::InvalidArgument));
    assert_eq!(drv.calls, vec![DriverCall::Enable, DriverCall::Disable]);
}

#[test]
fn start_stops_when_enable_fails() {
    let mut drv = MockDriver::rejecting(-1);
    let ctl = controller();
    assert_eq!(ctl.start(&mut drv, &peap()), Err(Error::GenericFailure));
    assert_eq!(drv.calls, vec![DriverCall::Enable]);
}
