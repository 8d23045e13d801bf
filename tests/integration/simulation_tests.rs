//! Controller against the host simulation of the enterprise Wi-Fi adapter.

use eapwifi::adapters::enterprise_wifi::EnterpriseWifi;
use eapwifi::app::credentials::{ClientCertificate, CredentialSet, EapMethod};
use eapwifi::app::ports::EnterpriseDriver;
use eapwifi::{ConnectionController, ControllerConfig, Error, LinkStatus};

use super::mock_driver::VirtualClock;

fn controller() -> ConnectionController<VirtualClock> {
    ConnectionController::new(ControllerConfig::default(), VirtualClock::default())
}

#[test]
fn peap_join_reaches_up() {
    let creds = CredentialSet::new(b"user@example.com", EapMethod::Peap).with_password(b"user", b"pw");
    let mut wifi = EnterpriseWifi::new();
    let mut ctl = controller();

    ctl.enable(&mut wifi).unwrap();
    ctl.configure_credentials(&mut wifi, &creds).unwrap();
    assert_eq!(ctl.connect(&mut wifi, b"eduroam"), Ok(()));
    assert_eq!(ctl.link_status(&mut wifi), LinkStatus::Up);
    // JOIN, JOIN, NOIP then UP: three waits.
    assert_eq!(ctl.clock().now, 30);
}

#[test]
fn join_without_enterprise_mode_is_generic_failure() {
    let mut wifi = EnterpriseWifi::new();
    let ctl = controller();
    assert_eq!(ctl.connect_async(&mut wifi, b"eduroam"), Err(Error::GenericFailure));
}

#[test]
fn tls_without_client_certificate_fails_auth() {
    let creds = CredentialSet::new(b"device", EapMethod::Tls);
    let mut wifi = EnterpriseWifi::new();
    let mut ctl = controller();
    ctl.enable(&mut wifi).unwrap();
    ctl.configure_credentials(&mut wifi, &creds).unwrap();
    assert_eq!(ctl.connect_blocking(&mut wifi, b"corp"), Err(Error::AuthFailed));
}

#[test]
fn tls_with_client_certificate_connects() {
    let creds = CredentialSet::new(b"device", EapMethod::Tls).with_client_certificate(ClientCertificate {
        certificate: b"cert",
        private_key: b"key",
        key_password: None,
    });
    let mut wifi = EnterpriseWifi::new();
    let mut ctl = controller();
    ctl.enable(&mut wifi).unwrap();
    ctl.configure_credentials(&mut wifi, &creds).unwrap();
    assert_eq!(ctl.connect_blocking(&mut wifi, b"corp"), Ok(()));
}

#[test]
fn out_of_range_network_is_not_found() {
    let creds = CredentialSet::new(b"id", EapMethod::Peap).with_password(b"u", b"p");
    let mut wifi = EnterpriseWifi::new();
    wifi.add_network(b"eduroam");
    let mut ctl = controller();
    ctl.enable(&mut wifi).unwrap();
    ctl.configure_credentials(&mut wifi, &creds).unwrap();
    assert_eq!(ctl.connect_blocking(&mut wifi, b"elsewhere"), Err(Error::NetworkNotFound));
}

#[test]
fn link_loss_then_rejoin() {
    let creds = CredentialSet::new(b"id", EapMethod::Ttls).with_password(b"u", b"p");
    let mut wifi = EnterpriseWifi::new();
    let mut ctl = controller();
    ctl.enable(&mut wifi).unwrap();
    ctl.configure_credentials(&mut wifi, &creds).unwrap();
    ctl.connect(&mut wifi, b"eduroam").unwrap();

    wifi.drop_link();
    assert_eq!(ctl.link_status(&mut wifi), LinkStatus::Down);

    ctl.connect_async(&mut wifi, b"eduroam").unwrap();
    assert_eq!(ctl.link_status(&mut wifi), LinkStatus::Joining);
    assert_eq!(ctl.connect(&mut wifi, b"eduroam"), Ok(()));
}

#[test]
fn disable_turns_enterprise_off() {
    let mut wifi = EnterpriseWifi::new();
    let ctl = controller();
    ctl.enable(&mut wifi).unwrap();
    assert!(wifi.is_enterprise_enabled());
    ctl.disable(&mut wifi).unwrap();
    assert!(!wifi.is_enterprise_enabled());
    assert!(wifi.is_initialized());
}

#[test]
fn network_info_reported_after_connect() {
    let creds = CredentialSet::new(b"id", EapMethod::Peap).with_password(b"u", b"p");
    let mut wifi = EnterpriseWifi::new();
    let mut ctl = controller();
    assert_eq!(wifi.network_info(), None);
    ctl.start(&mut wifi, &creds).unwrap();
    ctl.connect(&mut wifi, b"eduroam").unwrap();
    let net = wifi.network_info().unwrap();
    assert_eq!(net.gateway, std::net::Ipv4Addr::new(10, 0, 0, 1));
}
