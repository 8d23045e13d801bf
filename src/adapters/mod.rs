//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter           | Implements       | Connects to                 |
//! |-------------------|------------------|-----------------------------|
//! | `enterprise_wifi` | EnterpriseDriver | ESP-IDF WiFi STA + EAP client |
//! | `time`            | Clock            | ESP32 system timer          |

pub mod enterprise_wifi;
pub mod time;
