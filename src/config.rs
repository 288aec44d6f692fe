use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "ClinicDesk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the REST API.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Get the application data directory.
/// `CLINICDESK_DATA_DIR` overrides; defaults to ~/ClinicDesk/.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CLINICDESK_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("ClinicDesk")
}

/// Get the database path inside the data directory.
pub fn db_path() -> PathBuf {
    data_dir().join("clinicdesk.db")
}

/// Socket address the API server binds to (`CLINICDESK_ADDR` override).
pub fn bind_addr() -> SocketAddr {
    std::env::var("CLINICDESK_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            DEFAULT_BIND_ADDR
                .parse()
                .expect("default bind address is valid")
        })
}

/// Token signing secret (`CLINICDESK_JWT_SECRET`). Without one, a random
/// per-process secret is generated and issued tokens do not survive a
/// restart.
pub fn jwt_secret() -> String {
    match std::env::var("CLINICDESK_JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => secret,
        _ => {
            tracing::warn!(
                "CLINICDESK_JWT_SECRET not set, generating an ephemeral secret"
            );
            crate::auth::generate_secret()
        }
    }
}

/// Admin console credentials (`ADMIN_EMAIL` / `ADMIN_PASSWORD` overrides).
pub fn admin_credentials() -> (String, String) {
    let email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@clinicdesk.local".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
        tracing::warn!("ADMIN_PASSWORD not set, using development password");
        "changeme".to_string()
    });
    (email, password)
}

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "clinicdesk=info,tower_http=warn"
}
