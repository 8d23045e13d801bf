//! Fuzz target: `CredentialBuffers` PEM accumulation and setters
//!
//! Splits the input on newlines and feeds each piece through the
//! runtime credential store.  Capacity limits must hold, refused input
//! must leave the stored certificate untouched, and the summary must
//! never echo the password.
//!
//! cargo fuzz run fuzz_credential_buffers

#![no_main]

use eapwifi::app::credentials::{CredentialBuffers, MAX_CERT_LEN};
use libfuzzer_sys::fuzz_target;

const PASSWORD: &[u8] = b"\x01fuzz-secret\x01";

fuzz_target!(|data: &[u8]| {
    let mut buffers = CredentialBuffers::new();
    let _ = buffers.set_ssid(data);
    let _ = buffers.set_identity(data);
    let _ = buffers.set_password_credentials(data, PASSWORD);

    for line in data.split(|&b| b == b'\n') {
        let before = buffers.as_credential_set().ca_certificate.len();
        match buffers.append_ca_pem_line(line) {
            Ok(()) => assert!(buffers.as_credential_set().ca_certificate.len() > before),
            Err(_) => assert_eq!(buffers.as_credential_set().ca_certificate.len(), before),
        }
        assert!(buffers.as_credential_set().ca_certificate.len() <= MAX_CERT_LEN);
    }

    // SSID, identity and username echo the input; only check the password
    // when the input cannot have supplied the same text.
    if !data.windows(11).any(|w| w == b"fuzz-secret") {
        assert!(!buffers.summary().to_string().contains("fuzz-secret"));
    }
});
