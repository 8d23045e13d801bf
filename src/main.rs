//! eapwifi demo firmware: join a WPA2-Enterprise network and keep it up.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │   EnterpriseWifi (EnterpriseDriver)   SystemClock (Clock)│
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────────  │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │       ConnectionController (pure logic)            │  │
//! │  │  enable · configure · connect · link status        │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Credentials are baked in at build time from `EAP_SSID`, `EAP_IDENTITY`,
//! `EAP_USERNAME`, `EAP_PASSWORD`, `EAP_CA_CERT` and `EAP_METHOD`.
#![deny(unused_must_use)]

use anyhow::{Result, anyhow};
use log::{error, info, warn};

use eapwifi::adapters::enterprise_wifi::EnterpriseWifi;
use eapwifi::adapters::time::SystemClock;
use eapwifi::app::ports::Clock;
use eapwifi::{ConnectionController, ControllerConfig, CredentialBuffers, EapMethod, LinkStatus};

const DEFAULT_SSID: &str = "eduroam";
const DEFAULT_IDENTITY: &str = "user@example.com";
const DEFAULT_CA_CERT: &str = "-----BEGIN CERTIFICATE-----\n\
MIIDXTCCAkWgAwIBAgIJAKoK/heBjcOuMA0GCSqGSIb3DQEBBQUAMEUxCzAJBgNV\n\
-----END CERTIFICATE-----\n";

/// Fill the credential buffers from the build environment.
fn load_credentials(buffers: &mut CredentialBuffers) -> Result<()> {
    let ssid = option_env!("EAP_SSID").unwrap_or(DEFAULT_SSID);
    let identity = option_env!("EAP_IDENTITY").unwrap_or(DEFAULT_IDENTITY);
    let method: EapMethod = option_env!("EAP_METHOD").unwrap_or("peap").parse()?;

    buffers.set_ssid(ssid.as_bytes())?;
    buffers.set_identity(identity.as_bytes())?;
    buffers.set_method(method);

    if method.uses_password() {
        let username = option_env!("EAP_USERNAME").unwrap_or(identity);
        let password = option_env!("EAP_PASSWORD").unwrap_or_default();
        buffers.set_password_credentials(username.as_bytes(), password.as_bytes())?;
    }

    let ca = option_env!("EAP_CA_CERT").unwrap_or(DEFAULT_CA_CERT);
    for line in ca.lines() {
        buffers.append_ca_pem_line(line.as_bytes())?;
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
fn init_logging() -> Result<()> {
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn init_logging() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    Ok(())
}

#[cfg(target_os = "espidf")]
fn init_wifi<'c>() -> Result<EnterpriseWifi<'c>> {
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition};

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    Ok(EnterpriseWifi::new(peripherals.modem, sysloop, Some(nvs))?)
}

#[cfg(not(target_os = "espidf"))]
fn init_wifi<'c>() -> Result<EnterpriseWifi<'c>> {
    Ok(EnterpriseWifi::new())
}

fn main() -> Result<()> {
    // ── 1. Bootstrap ──────────────────────────────────────────
    init_logging()?;
    info!("eapwifi v{}", env!("CARGO_PKG_VERSION"));

    let config = ControllerConfig::default();
    config.validate().map_err(|e| anyhow!("invalid controller config: {}", e))?;

    // ── 2. Credentials (must outlive the driver) ──────────────
    // Heap-allocated: the CA buffer alone exceeds a small main-task stack.
    let mut buffers = Box::new(CredentialBuffers::new());
    load_credentials(&mut buffers)?;
    info!("{}", buffers.summary());
    let credentials = buffers.as_credential_set();
    let ssid = buffers.ssid();

    // ── 3. Driver + controller ────────────────────────────────
    let mut wifi = init_wifi()?;
    let mut controller = ConnectionController::new(config, SystemClock::new());

    controller.start(&mut wifi, &credentials)?;

    // ── 4. First join ─────────────────────────────────────────
    match controller.connect(&mut wifi, ssid) {
        Ok(()) => {
            info!("Connected to '{}'", String::from_utf8_lossy(ssid));
            if let Some(net) = wifi.network_info() {
                info!("Network: {}", net);
            }
        }
        Err(e @ eapwifi::Error::AuthFailed) => {
            // Rejoining with the same credentials cannot succeed.
            error!("Connection failed: {} ({})", e, e.hint());
            controller.disable(&mut wifi)?;
            return Err(e.into());
        }
        Err(e) => error!("Connection failed: {} ({})", e, e.hint()),
    }

    // ── 5. Link supervision ───────────────────────────────────
    let check_ms = controller.config().link_check_interval_ms;
    let mut last = controller.link_status(&mut wifi);
    loop {
        controller.clock_mut().sleep_ms(check_ms);

        let status = controller.link_status(&mut wifi);
        if status != last {
            info!("Link status: {}", status);
            last = status;
        }
        if matches!(status, LinkStatus::Up | LinkStatus::Joining | LinkStatus::NoIp) {
            continue;
        }

        warn!("Link not up ({}), rejoining '{}'", status, String::from_utf8_lossy(ssid));
        if let Err(e) = controller.connect_async(&mut wifi, ssid) {
            error!("Rejoin request failed: {} ({})", e, e.hint());
        }
    }
}
