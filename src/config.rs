use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Matrona";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the clinic API (localhost only).
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7420";

/// Get the application data directory.
/// ~/Matrona/ on all platforms unless MATRONA_DATA_DIR overrides it.
pub fn app_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MATRONA_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Matrona")
}

/// Path of the single clinic database file.
pub fn database_path() -> PathBuf {
    app_data_dir().join("matrona.db")
}

/// Bind address for the HTTP API, MATRONA_BIND overriding the default.
pub fn bind_addr() -> SocketAddr {
    std::env::var("MATRONA_BIND")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .expect("Invalid MATRONA_BIND address")
}

/// Default log filter when RUST_LOG is not set.
pub fn default_log_filter() -> String {
    format!("{}=info", env!("CARGO_PKG_NAME"))
}
