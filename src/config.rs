use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Clinicdesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Domain appended to usernames to form the login identity.
pub const LOGIN_DOMAIN: &str = "clinicdesk.local";

/// Get the application data directory
/// ~/Clinicdesk/ on all platforms (user-visible, on purpose)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Clinicdesk")
}

/// Path of the clinic database file.
pub fn database_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    format!("{}=info,tower_http=info", env!("CARGO_PKG_NAME"))
}

/// Bind address for the HTTP server. `CLINICDESK_BIND` overrides.
pub fn bind_addr() -> SocketAddr {
    std::env::var("CLINICDESK_BIND")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8240)))
}

/// Base URL of the local text-generation backend used for drug
/// suggestions. `CLINICDESK_SUGGEST_URL` overrides.
pub fn suggestion_base_url() -> String {
    std::env::var("CLINICDESK_SUGGEST_URL")
        .unwrap_or_else(|_| "http://localhost:11434".to_string())
}
