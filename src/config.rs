use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "HealthBridge";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Port the portal server has always listened on.
pub const DEFAULT_PORT: u16 = 5001;

/// Number of vitals records returned by a history query when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Special database location selecting an in-memory SQLite database.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Get the application data directory
/// ~/HealthBridge/ on all platforms, falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the portal database
pub fn database_path() -> PathBuf {
    app_data_dir().join("healthbridge.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "healthbridge_lib=info,healthbridge=info"
}

/// Runtime settings, read from `HEALTHBRIDGE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// `None` selects an in-memory database.
    pub database: Option<PathBuf>,
    pub history_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
            database: Some(database_path()),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Unparsable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(raw) = lookup("HEALTHBRIDGE_BIND") {
            match raw.parse::<SocketAddr>() {
                Ok(addr) => settings.bind_addr = addr,
                Err(e) => tracing::warn!(value = %raw, error = %e, "Ignoring invalid HEALTHBRIDGE_BIND"),
            }
        }

        if let Some(raw) = lookup("HEALTHBRIDGE_DB") {
            let trimmed = raw.trim();
            if trimmed == IN_MEMORY_DB {
                settings.database = None;
            } else if !trimmed.is_empty() {
                settings.database = Some(PathBuf::from(trimmed));
            }
        }

        if let Some(raw) = lookup("HEALTHBRIDGE_HISTORY_LIMIT") {
            match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => settings.history_limit = limit,
                _ => tracing::warn!(value = %raw, "Ignoring invalid HEALTHBRIDGE_HISTORY_LIMIT"),
            }
        }

        settings
    }
}
