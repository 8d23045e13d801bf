fn main() {
    println!("cargo:rerun-if-env-changed=EAP_SSID");
    println!("cargo:rerun-if-env-changed=EAP_IDENTITY");
    println!("cargo:rerun-if-env-changed=EAP_USERNAME");
    println!("cargo:rerun-if-env-changed=EAP_PASSWORD");
    println!("cargo:rerun-if-env-changed=EAP_CA_CERT");
    println!("cargo:rerun-if-env-changed=EAP_METHOD");

    // Host builds link against the simulation backend and need no
    // ESP-IDF environment.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
