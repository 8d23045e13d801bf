//! EAP credential material.
//!
//! [`CredentialSet`] is the borrowed view handed to the driver.  Its
//! fields are byte slices rather than strings: identities, passwords and
//! PEM text are passed to the chip verbatim, and nothing here requires
//! them to be UTF-8.
//!
//! [`CredentialBuffers`] is fixed-capacity owned storage for credentials
//! entered at runtime.  It lends out a `CredentialSet<'_>`, which keeps
//! the buffers frozen for as long as the driver holds that borrow.

use core::fmt;
use core::str::FromStr;

use zeroize::Zeroize;

use crate::error::{Error, Result};

/// Radio limit on SSID length.
pub const MAX_SSID_LEN: usize = 32;

/// Capacity for identity, username and password buffers.
pub const MAX_CREDENTIAL_LEN: usize = 128;

/// Capacity for a PEM CA certificate (headers included).
pub const MAX_CERT_LEN: usize = 4096;

// ───────────────────────────────────────────────────────────────
// EAP method
// ───────────────────────────────────────────────────────────────

/// Outer EAP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EapMethod {
    /// PEAP with MSCHAPv2 inside (username/password).
    #[default]
    Peap,
    /// EAP-TLS (client certificate, no password).
    Tls,
    /// EAP-TTLS (username/password).
    Ttls,
}

impl EapMethod {
    /// Map the conventional `0 = PEAP, 1 = TLS, 2 = TTLS` numbering.
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Peap),
            1 => Some(Self::Tls),
            2 => Some(Self::Ttls),
            _ => None,
        }
    }

    pub const fn index(self) -> u8 {
        match self {
            Self::Peap => 0,
            Self::Tls => 1,
            Self::Ttls => 2,
        }
    }

    /// Whether the inner authentication uses username and password.
    pub const fn uses_password(self) -> bool {
        matches!(self, Self::Peap | Self::Ttls)
    }

    /// Long name including the inner method.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Peap => "PEAP-MSCHAPv2",
            Self::Tls => "EAP-TLS",
            Self::Ttls => "EAP-TTLS",
        }
    }
}

impl fmt::Display for EapMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peap => write!(f, "PEAP"),
            Self::Tls => write!(f, "TLS"),
            Self::Ttls => write!(f, "TTLS"),
        }
    }
}

impl FromStr for EapMethod {
    type Err = Error;

    /// Accepts `peap`/`tls`/`ttls` in any case, or the index digits.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("peap") || s == "0" {
            Ok(Self::Peap)
        } else if s.eq_ignore_ascii_case("tls") || s == "1" {
            Ok(Self::Tls)
        } else if s.eq_ignore_ascii_case("ttls") || s == "2" {
            Ok(Self::Ttls)
        } else {
            Err(Error::InvalidArgument)
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Borrowed credential set
// ───────────────────────────────────────────────────────────────

/// Client certificate material for EAP-TLS.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ClientCertificate<'c> {
    /// PEM client certificate.
    pub certificate: &'c [u8],
    /// PEM private key.
    pub private_key: &'c [u8],
    /// Passphrase for an encrypted private key.
    pub key_password: Option<&'c [u8]>,
}

impl fmt::Debug for ClientCertificate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("certificate_len", &self.certificate.len())
            .field("private_key_len", &self.private_key.len())
            .field("key_password", &self.key_password.map(|_| "<redacted>"))
            .finish()
    }
}

/// One EAP identity, as handed to the driver.
///
/// Every field borrows caller-owned memory for `'c`.  Nothing is copied
/// on the way to the driver, so the buffers must stay put until the
/// driver is done with them; the lifetime on
/// [`EnterpriseDriver`](super::ports::EnterpriseDriver) enforces that.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CredentialSet<'c> {
    pub identity: &'c [u8],
    pub username: &'c [u8],
    pub password: &'c [u8],
    /// PEM CA certificate used to validate the RADIUS server.
    pub ca_certificate: &'c [u8],
    pub eap_method: EapMethod,
    /// Skip certificate validity-period checks (no trusted RTC).
    pub disable_time_check: bool,
    pub client_certificate: Option<ClientCertificate<'c>>,
}

impl<'c> CredentialSet<'c> {
    /// Start a set with just an identity.  Time checking is disabled by
    /// default since most boards boot without wall-clock time.
    pub const fn new(identity: &'c [u8], eap_method: EapMethod) -> Self {
        Self {
            identity,
            username: &[],
            password: &[],
            ca_certificate: &[],
            eap_method,
            disable_time_check: true,
            client_certificate: None,
        }
    }

    #[must_use]
    pub const fn with_password(mut self, username: &'c [u8], password: &'c [u8]) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    #[must_use]
    pub const fn with_ca_certificate(mut self, pem: &'c [u8]) -> Self {
        self.ca_certificate = pem;
        self
    }

    #[must_use]
    pub const fn with_client_certificate(mut self, client: ClientCertificate<'c>) -> Self {
        self.client_certificate = Some(client);
        self
    }

    #[must_use]
    pub const fn with_time_check(mut self, enabled: bool) -> Self {
        self.disable_time_check = !enabled;
        self
    }

    /// A set without an identity counts as absent.
    pub fn is_present(&self) -> bool {
        !self.identity.is_empty()
    }
}

impl fmt::Debug for CredentialSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSet")
            .field("identity", &Lossy(self.identity))
            .field("username", &Lossy(self.username))
            .field("password_len", &self.password.len())
            .field("ca_certificate_len", &self.ca_certificate.len())
            .field("eap_method", &self.eap_method)
            .field("disable_time_check", &self.disable_time_check)
            .field("client_certificate", &self.client_certificate)
            .finish()
    }
}

/// Renders bytes as UTF-8, replacing invalid sequences.
struct Lossy<'a>(&'a [u8]);

impl fmt::Display for Lossy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.0.utf8_chunks() {
            f.write_str(chunk.valid())?;
            if !chunk.invalid().is_empty() {
                f.write_str("\u{FFFD}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Lossy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

// ───────────────────────────────────────────────────────────────
// Owned runtime buffers
// ───────────────────────────────────────────────────────────────

/// Fixed-capacity storage for credentials configured at runtime.
pub struct CredentialBuffers {
    ssid: heapless::Vec<u8, MAX_SSID_LEN>,
    identity: heapless::Vec<u8, MAX_CREDENTIAL_LEN>,
    username: heapless::Vec<u8, MAX_CREDENTIAL_LEN>,
    password: heapless::Vec<u8, MAX_CREDENTIAL_LEN>,
    ca_certificate: heapless::Vec<u8, MAX_CERT_LEN>,
    eap_method: EapMethod,
    disable_time_check: bool,
}

impl Default for CredentialBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CredentialBuffers {
    fn drop(&mut self) {
        scrub(&mut self.password);
    }
}

impl CredentialBuffers {
    pub const fn new() -> Self {
        Self {
            ssid: heapless::Vec::new(),
            identity: heapless::Vec::new(),
            username: heapless::Vec::new(),
            password: heapless::Vec::new(),
            ca_certificate: heapless::Vec::new(),
            eap_method: EapMethod::Peap,
            disable_time_check: true,
        }
    }

    pub fn ssid(&self) -> &[u8] {
        &self.ssid
    }

    pub fn eap_method(&self) -> EapMethod {
        self.eap_method
    }

    /// SSID and identity are both set.
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty() && !self.identity.is_empty()
    }

    pub fn set_ssid(&mut self, ssid: &[u8]) -> Result<()> {
        if ssid.is_empty() {
            return Err(Error::InvalidArgument);
        }
        fill(&mut self.ssid, ssid)
    }

    pub fn set_identity(&mut self, identity: &[u8]) -> Result<()> {
        if identity.is_empty() {
            return Err(Error::InvalidArgument);
        }
        fill(&mut self.identity, identity)
    }

    pub fn set_method(&mut self, method: EapMethod) {
        self.eap_method = method;
    }

    pub fn set_time_check(&mut self, enabled: bool) {
        self.disable_time_check = !enabled;
    }

    /// Username and password for PEAP/TTLS.  Both are checked before
    /// either is written.
    pub fn set_password_credentials(&mut self, username: &[u8], password: &[u8]) -> Result<()> {
        if username.len() > MAX_CREDENTIAL_LEN || password.len() > MAX_CREDENTIAL_LEN {
            return Err(Error::InvalidArgument);
        }
        fill(&mut self.username, username)?;
        scrub(&mut self.password);
        fill(&mut self.password, password)
    }

    pub fn set_ca_certificate(&mut self, pem: &[u8]) -> Result<()> {
        fill(&mut self.ca_certificate, pem)
    }

    pub fn clear_ca_certificate(&mut self) {
        self.ca_certificate.clear();
    }

    /// Append one PEM line (a trailing `\n` is added).  A line that would
    /// not fit is refused and the buffer is left unchanged.
    pub fn append_ca_pem_line(&mut self, line: &[u8]) -> Result<()> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if self.ca_certificate.len() + line.len() + 1 > MAX_CERT_LEN {
            return Err(Error::InvalidArgument);
        }
        self.ca_certificate
            .extend_from_slice(line)
            .map_err(|()| Error::InvalidArgument)?;
        self.ca_certificate
            .push(b'\n')
            .map_err(|_| Error::InvalidArgument)
    }

    /// Borrow the buffers as a driver-ready credential set.  Username and
    /// password are withheld for EAP-TLS.
    pub fn as_credential_set(&self) -> CredentialSet<'_> {
        let set = CredentialSet::new(&self.identity, self.eap_method)
            .with_ca_certificate(&self.ca_certificate)
            .with_time_check(!self.disable_time_check);
        if self.eap_method.uses_password() {
            set.with_password(&self.username, &self.password)
        } else {
            set
        }
    }

    /// Forget everything, zeroing the password first.
    pub fn clear(&mut self) {
        scrub(&mut self.password);
        self.ssid.clear();
        self.identity.clear();
        self.username.clear();
        self.ca_certificate.clear();
        self.eap_method = EapMethod::Peap;
        self.disable_time_check = true;
    }

    /// Human-readable configuration with the password masked.
    pub fn summary(&self) -> CredentialSummary<'_> {
        CredentialSummary(self)
    }
}

fn fill<const N: usize>(buf: &mut heapless::Vec<u8, N>, data: &[u8]) -> Result<()> {
    if data.len() > N {
        return Err(Error::InvalidArgument);
    }
    buf.clear();
    buf.extend_from_slice(data).map_err(|()| Error::InvalidArgument)
}

fn scrub<const N: usize>(buf: &mut heapless::Vec<u8, N>) {
    buf.as_mut_slice().zeroize();
    buf.clear();
}

/// Display adapter returned by [`CredentialBuffers::summary`].
pub struct CredentialSummary<'a>(&'a CredentialBuffers);

impl fmt::Display for CredentialSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.0;
        if !c.is_configured() {
            return write!(f, "No credentials configured");
        }
        writeln!(f, "SSID: {}", Lossy(&c.ssid))?;
        writeln!(f, "Identity: {}", Lossy(&c.identity))?;
        writeln!(f, "Method: {}", c.eap_method.description())?;
        if c.eap_method.uses_password() {
            writeln!(f, "Username: {}", Lossy(&c.username))?;
            writeln!(f, "Password: ********")?;
        }
        if c.ca_certificate.is_empty() {
            writeln!(f, "CA Certificate: Not set")?;
        } else {
            writeln!(f, "CA Certificate: Present ({} bytes)", c.ca_certificate.len())?;
        }
        write!(
            f,
            "Time check: {}",
            if c.disable_time_check { "disabled" } else { "enabled" }
        )
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
