//! WPA2-Enterprise station adapter.
//!
//! Implements [`EnterpriseDriver`] for the station interface.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: ESP-IDF `EspWifi` for station control,
//!   `esp_eap_client_*` for credentials, and a raw `WIFI_EVENT` handler
//!   that records the last disconnect reason so failures can be reported
//!   as BADAUTH / NONET / FAIL link codes.
//! - **all other targets**: a deterministic simulation for host runs.
//!   A join walks JOIN → JOIN → NOIP and then lands on UP, or on the
//!   failure the supplied credentials deserve.
//!
//! ## Credential buffers
//!
//! ESP-IDF keeps the CA certificate and client key by pointer and mbedTLS
//! wants PEM text NUL-terminated, so the ESP backend copies PEM material
//! into buffers it owns and clears the EAP client state on drop.  The
//! simulation keeps the caller's `CredentialSet<'c>` borrow instead.

use core::fmt;
use core::marker::PhantomData;
use core::net::Ipv4Addr;

use log::{info, warn};

use crate::app::credentials::CredentialSet;
use crate::app::link::{LINK_BADAUTH, LINK_FAIL, LINK_NONET};
use crate::app::ports::{DriverResult, EnterpriseDriver, Interface};

#[cfg(not(target_os = "espidf"))]
use crate::app::credentials::EapMethod;
#[cfg(not(target_os = "espidf"))]
use crate::app::link::{LINK_DOWN, LINK_JOIN, LINK_NOIP, LINK_UP};
#[cfg(not(target_os = "espidf"))]
use crate::app::ports::DriverError;

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicU32, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_hal::modem::Modem;
#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi},
};
#[cfg(target_os = "espidf")]
use esp_idf_sys::*;

// ───────────────────────────────────────────────────────────────
// Disconnect reasons
// ───────────────────────────────────────────────────────────────

/// ESP-IDF `wifi_err_reason_t` values that carry meaning for an
/// enterprise join.
mod reason {
    pub const AUTH_EXPIRE: u32 = 2;
    pub const FOURWAY_HANDSHAKE_TIMEOUT: u32 = 15;
    pub const IEEE_802_1X_AUTH_FAILED: u32 = 23;
    pub const NO_AP_FOUND: u32 = 201;
    pub const AUTH_FAIL: u32 = 202;
    pub const HANDSHAKE_TIMEOUT: u32 = 204;
    pub const NO_AP_FOUND_W_COMPATIBLE_SECURITY: u32 = 210;
    pub const NO_AP_FOUND_IN_AUTHMODE_THRESHOLD: u32 = 211;
    pub const NO_AP_FOUND_IN_RSSI_THRESHOLD: u32 = 212;
}

/// Map a station disconnect reason onto a negative link code.
pub fn link_code_for_disconnect(reason_code: u32) -> i32 {
    match reason_code {
        reason::NO_AP_FOUND
        | reason::NO_AP_FOUND_W_COMPATIBLE_SECURITY
        | reason::NO_AP_FOUND_IN_AUTHMODE_THRESHOLD
        | reason::NO_AP_FOUND_IN_RSSI_THRESHOLD => LINK_NONET,
        reason::AUTH_EXPIRE
        | reason::FOURWAY_HANDSHAKE_TIMEOUT
        | reason::IEEE_802_1X_AUTH_FAILED
        | reason::AUTH_FAIL
        | reason::HANDSHAKE_TIMEOUT => LINK_BADAUTH,
        _ => LINK_FAIL,
    }
}

/// Last `WIFI_EVENT_STA_DISCONNECTED` reason, `0` when none since the
/// last join request.
#[cfg(target_os = "espidf")]
static LAST_DISCONNECT_REASON: AtomicU32 = AtomicU32::new(0);

#[cfg(target_os = "espidf")]
unsafe extern "C" fn on_sta_disconnected(
    _arg: *mut core::ffi::c_void,
    _base: esp_event_base_t,
    _id: i32,
    data: *mut core::ffi::c_void,
) {
    if data.is_null() {
        return;
    }
    // SAFETY: ESP-IDF passes a `wifi_event_sta_disconnected_t` for this
    // event id, valid for the duration of the callback.
    let event = unsafe { &*(data as *const wifi_event_sta_disconnected_t) };
    LAST_DISCONNECT_REASON.store(u32::from(event.reason), Ordering::Release);
}

// ───────────────────────────────────────────────────────────────
// Simulation state
// ───────────────────────────────────────────────────────────────

/// Link codes a successful simulated join reports before UP.
#[cfg(not(target_os = "espidf"))]
const SIM_JOIN_SEQUENCE: [i32; 3] = [LINK_JOIN, LINK_JOIN, LINK_NOIP];

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, Copy)]
struct SimJoin {
    /// Link code once the join sequence has played out.
    outcome: i32,
    step: usize,
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

/// IPv4 configuration of the station interface once DHCP has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    pub ip: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
}

impl fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IP {} netmask {} gateway {}", self.ip, self.netmask, self.gateway)
    }
}

pub struct EnterpriseWifi<'c> {
    #[cfg(target_os = "espidf")]
    wifi: EspWifi<'static>,
    /// NUL-terminated copies of PEM material handed to ESP-IDF by pointer.
    #[cfg(target_os = "espidf")]
    ca_pem: Vec<u8>,
    #[cfg(target_os = "espidf")]
    client_pem: Vec<u8>,
    #[cfg(target_os = "espidf")]
    key_pem: Vec<u8>,

    #[cfg(not(target_os = "espidf"))]
    sim_credentials: Option<CredentialSet<'c>>,
    #[cfg(not(target_os = "espidf"))]
    sim_join: Option<SimJoin>,
    /// Simulation: SSIDs in range.  Empty means every SSID is in range.
    #[cfg(not(target_os = "espidf"))]
    sim_networks: Vec<Vec<u8>>,

    enterprise_enabled: bool,
    joining: bool,
    _credentials: PhantomData<&'c [u8]>,
}

impl<'c> EnterpriseWifi<'c> {
    pub fn is_enterprise_enabled(&self) -> bool {
        self.enterprise_enabled
    }

    /// Station address, or `None` until an address has been assigned.
    pub fn network_info(&self) -> Option<NetworkInfo> {
        self.platform_network_info()
    }

    /// Drop the current association, if any.
    pub fn disconnect(&mut self) {
        self.platform_disconnect();
        self.joining = false;
        info!("WiFi: disconnected");
    }
}

// ── ESP-IDF backend ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn driver_error(e: EspError) -> crate::app::ports::DriverError {
    crate::app::ports::DriverError(e.code())
}

#[cfg(target_os = "espidf")]
fn invalid_arg() -> crate::app::ports::DriverError {
    crate::app::ports::DriverError(ESP_ERR_INVALID_ARG)
}

/// Copy `src` into `dst`, appending the NUL mbedTLS expects after PEM.
#[cfg(target_os = "espidf")]
fn copy_pem(src: &[u8], dst: &mut Vec<u8>) {
    dst.clear();
    dst.extend_from_slice(src);
    if dst.last() != Some(&0) {
        dst.push(0);
    }
}

#[cfg(target_os = "espidf")]
fn ffi_len(buf: &[u8]) -> Result<i32, crate::app::ports::DriverError> {
    i32::try_from(buf.len()).map_err(|_| invalid_arg())
}

#[cfg(target_os = "espidf")]
impl<'c> EnterpriseWifi<'c> {
    /// Bring up the Wi-Fi subsystem in station mode.
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self, EspError> {
        let mut wifi = EspWifi::new(modem, sysloop, nvs)?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
        wifi.start()?;

        // SAFETY: registering a plain function with no user argument on the
        // default event loop that `EspSystemEventLoop` has already created.
        esp!(unsafe {
            esp_event_handler_register(
                WIFI_EVENT,
                wifi_event_t_WIFI_EVENT_STA_DISCONNECTED as i32,
                Some(on_sta_disconnected),
                core::ptr::null_mut(),
            )
        })?;

        info!("WiFi: station started");
        Ok(Self {
            wifi,
            ca_pem: Vec::new(),
            client_pem: Vec::new(),
            key_pem: Vec::new(),
            enterprise_enabled: false,
            joining: false,
            _credentials: PhantomData,
        })
    }

    fn platform_is_initialized(&self) -> bool {
        self.wifi.is_started().unwrap_or(false)
    }

    fn platform_enable(&mut self) -> DriverResult {
        esp!(unsafe { esp_wifi_sta_enterprise_enable() }).map_err(driver_error)
    }

    fn platform_disable(&mut self) -> DriverResult {
        esp!(unsafe { esp_wifi_sta_enterprise_disable() }).map_err(driver_error)
    }

    fn platform_set_credentials(&mut self, c: &CredentialSet<'c>) -> DriverResult {
        // SAFETY: identity/username/password are copied by ESP-IDF during
        // the call.  PEM pointers refer to `self`'s buffers, which outlive
        // the registration: they are replaced only by a later call here and
        // cleared in `Drop` before being freed.
        unsafe {
            esp!(esp_eap_client_set_identity(c.identity.as_ptr(), ffi_len(c.identity)?))
                .map_err(driver_error)?;

            if c.eap_method.uses_password() {
                esp!(esp_eap_client_set_username(c.username.as_ptr(), ffi_len(c.username)?))
                    .map_err(driver_error)?;
                esp!(esp_eap_client_set_password(c.password.as_ptr(), ffi_len(c.password)?))
                    .map_err(driver_error)?;
            } else {
                esp_eap_client_clear_username();
                esp_eap_client_clear_password();
            }

            if c.ca_certificate.is_empty() {
                warn!("WiFi: no CA certificate, server identity will not be verified");
                esp_eap_client_clear_ca_cert();
                self.ca_pem.clear();
            } else {
                copy_pem(c.ca_certificate, &mut self.ca_pem);
                esp!(esp_eap_client_set_ca_cert(self.ca_pem.as_ptr(), ffi_len(&self.ca_pem)?))
                    .map_err(driver_error)?;
            }

            match c.client_certificate {
                Some(client) => {
                    copy_pem(client.certificate, &mut self.client_pem);
                    copy_pem(client.private_key, &mut self.key_pem);
                    let (pw_ptr, pw_len) = match client.key_password {
                        Some(pw) => (pw.as_ptr(), ffi_len(pw)?),
                        None => (core::ptr::null(), 0),
                    };
                    esp!(esp_eap_client_set_certificate_and_key(
                        self.client_pem.as_ptr(),
                        ffi_len(&self.client_pem)?,
                        self.key_pem.as_ptr(),
                        ffi_len(&self.key_pem)?,
                        pw_ptr,
                        pw_len,
                    ))
                    .map_err(driver_error)?;
                }
                None => {
                    esp_eap_client_clear_certificate_and_key();
                    self.client_pem.clear();
                    self.key_pem.clear();
                }
            }

            if c.eap_method == crate::app::credentials::EapMethod::Ttls {
                esp!(esp_eap_client_set_ttls_phase2_method(
                    esp_eap_ttls_phase2_types_ESP_EAP_TTLS_PHASE2_MSCHAPV2
                ))
                .map_err(driver_error)?;
            }

            esp!(esp_eap_client_set_disable_time_check(c.disable_time_check)).map_err(driver_error)
        }
    }

    fn platform_join(&mut self, ssid: &[u8], channel: Option<u8>) -> DriverResult {
        let ssid = core::str::from_utf8(ssid).map_err(|_| invalid_arg())?;
        let mut ssid_buf = heapless::String::<32>::new();
        ssid_buf.push_str(ssid).map_err(|()| invalid_arg())?;

        let conf = Configuration::Client(ClientConfiguration {
            ssid: ssid_buf,
            auth_method: AuthMethod::WPA2Enterprise,
            channel,
            ..Default::default()
        });
        self.wifi.set_configuration(&conf).map_err(driver_error)?;

        LAST_DISCONNECT_REASON.store(0, Ordering::Release);
        // Non-blocking: returns once the request is queued.
        self.wifi.connect().map_err(driver_error)
    }

    fn platform_link_status(&mut self) -> i32 {
        use crate::app::link::{LINK_DOWN, LINK_JOIN, LINK_NOIP, LINK_UP};

        if self.wifi.is_connected().unwrap_or(false) {
            return if self.wifi.sta_netif().is_up().unwrap_or(false) {
                LINK_UP
            } else {
                LINK_NOIP
            };
        }
        match LAST_DISCONNECT_REASON.load(Ordering::Acquire) {
            0 if self.joining => LINK_JOIN,
            0 => LINK_DOWN,
            code => link_code_for_disconnect(code),
        }
    }

    fn platform_network_info(&self) -> Option<NetworkInfo> {
        // SAFETY: plain C struct, all-zero is a valid value.  The station
        // netif handle lives as long as `self.wifi`.
        let mut info: esp_netif_ip_info_t = unsafe { core::mem::zeroed() };
        esp!(unsafe { esp_netif_get_ip_info(self.wifi.sta_netif().handle(), &mut info) }).ok()?;
        if info.ip.addr == 0 {
            return None;
        }
        // lwIP stores addresses in network byte order.
        let addr = |a: esp_ip4_addr_t| Ipv4Addr::from(u32::from_be(a.addr));
        Some(NetworkInfo {
            ip: addr(info.ip),
            netmask: addr(info.netmask),
            gateway: addr(info.gw),
        })
    }

    fn platform_disconnect(&mut self) {
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi: disconnect failed: {:?}", e);
        }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for EnterpriseWifi<'_> {
    fn drop(&mut self) {
        // SAFETY: stop ESP-IDF from reading the PEM buffers about to be freed.
        unsafe {
            esp_eap_client_clear_ca_cert();
            esp_eap_client_clear_certificate_and_key();
            esp_event_handler_unregister(
                WIFI_EVENT,
                wifi_event_t_WIFI_EVENT_STA_DISCONNECTED as i32,
                Some(on_sta_disconnected),
            );
        }
    }
}

// ── Simulation backend ────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl Default for EnterpriseWifi<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl<'c> EnterpriseWifi<'c> {
    pub fn new() -> Self {
        info!("WiFi(sim): station started");
        Self {
            sim_credentials: None,
            sim_join: None,
            sim_networks: Vec::new(),
            enterprise_enabled: false,
            joining: false,
            _credentials: PhantomData,
        }
    }

    /// Simulation: put `ssid` in range.  Once any network is added, joins
    /// to SSIDs not added report NONET.
    pub fn add_network(&mut self, ssid: &[u8]) {
        self.sim_networks.push(ssid.to_vec());
    }

    /// Simulation: the AP drops the station.
    pub fn drop_link(&mut self) {
        self.sim_join = None;
        self.joining = false;
        warn!("WiFi(sim): link lost");
    }

    /// Link code the stored credentials earn for `ssid`.
    fn sim_outcome(&self, ssid: &[u8]) -> i32 {
        if !self.sim_networks.is_empty() && !self.sim_networks.iter().any(|n| n == ssid) {
            return LINK_NONET;
        }
        let Some(c) = self.sim_credentials else {
            return LINK_BADAUTH;
        };
        let authenticates = match c.eap_method {
            EapMethod::Peap | EapMethod::Ttls => !c.username.is_empty() && !c.password.is_empty(),
            EapMethod::Tls => c.client_certificate.is_some(),
        };
        if authenticates { LINK_UP } else { LINK_BADAUTH }
    }

    fn platform_is_initialized(&self) -> bool {
        true
    }

    fn platform_enable(&mut self) -> DriverResult {
        Ok(())
    }

    fn platform_disable(&mut self) -> DriverResult {
        self.sim_join = None;
        Ok(())
    }

    fn platform_set_credentials(&mut self, c: &CredentialSet<'c>) -> DriverResult {
        if c.ca_certificate.is_empty() {
            warn!("WiFi(sim): no CA certificate, server identity will not be verified");
        }
        self.sim_credentials = Some(*c);
        Ok(())
    }

    fn platform_join(&mut self, ssid: &[u8], _channel: Option<u8>) -> DriverResult {
        if !self.enterprise_enabled {
            warn!("WiFi(sim): enterprise join requested with enterprise mode off");
            return Err(DriverError(-1));
        }
        let outcome = self.sim_outcome(ssid);
        self.sim_join = Some(SimJoin { outcome, step: 0 });
        info!(
            "WiFi(sim): joining '{}' (outcome {})",
            String::from_utf8_lossy(ssid),
            outcome
        );
        Ok(())
    }

    fn platform_link_status(&mut self) -> i32 {
        let Some(join) = self.sim_join.as_mut() else {
            return LINK_DOWN;
        };
        let code = match (join.step, join.outcome) {
            (step, LINK_UP) => SIM_JOIN_SEQUENCE.get(step).copied().unwrap_or(LINK_UP),
            // Failures surface on the first query after the scan.
            (0, _) => LINK_JOIN,
            (_, outcome) => outcome,
        };
        join.step = join.step.saturating_add(1);
        code
    }

    fn platform_network_info(&self) -> Option<NetworkInfo> {
        // UP has been reported once the join sequence has played out.
        let join = self.sim_join?;
        (join.outcome == LINK_UP && join.step > SIM_JOIN_SEQUENCE.len()).then_some(NetworkInfo {
            ip: Ipv4Addr::new(10, 0, 0, 42),
            netmask: Ipv4Addr::new(255, 255, 255, 0),
            gateway: Ipv4Addr::new(10, 0, 0, 1),
        })
    }

    fn platform_disconnect(&mut self) {
        self.sim_join = None;
    }
}

// ───────────────────────────────────────────────────────────────
// EnterpriseDriver
// ───────────────────────────────────────────────────────────────

impl<'c> EnterpriseDriver<'c> for EnterpriseWifi<'c> {
    fn is_initialized(&self) -> bool {
        self.platform_is_initialized()
    }

    fn enterprise_enable(&mut self) -> DriverResult {
        self.platform_enable()?;
        self.enterprise_enabled = true;
        Ok(())
    }

    fn enterprise_disable(&mut self) -> DriverResult {
        self.platform_disable()?;
        self.enterprise_enabled = false;
        self.joining = false;
        Ok(())
    }

    fn set_credentials(&mut self, credentials: &CredentialSet<'c>) -> DriverResult {
        self.platform_set_credentials(credentials)
    }

    fn join_enterprise(&mut self, ssid: &[u8], channel: Option<u8>) -> DriverResult {
        self.platform_join(ssid, channel)?;
        self.joining = true;
        Ok(())
    }

    fn link_status(&mut self, interface: Interface) -> i32 {
        if interface != Interface::Sta {
            return crate::app::link::LINK_DOWN;
        }
        let code = self.platform_link_status();
        if code < 0 || code == crate::app::link::LINK_UP {
            self.joining = false;
        }
        code
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
