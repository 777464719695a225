//! Application-level configuration loading, including polling cadence and room defaults.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PARTNER_QUIZ_CONFIG_PATH";

const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_POLL_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_EVENT_CAPACITY: usize = 64;
const DEFAULT_ROOM_NAME: &str = "Our Game";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Delay between two readiness/status polls.
    pub poll_interval: Duration,
    /// Budget of a single poll request.
    pub poll_timeout: Duration,
    /// Capacity of the room event broadcast channel.
    pub event_capacity: usize,
    /// Name given to rooms created without one.
    pub default_room_name: String,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        poll_interval_ms = app_config.poll_interval.as_millis() as u64,
                        poll_timeout_ms = app_config.poll_timeout.as_millis() as u64,
                        "loaded application config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document, filling absent keys with defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    poll_interval_ms: u64,
    poll_timeout_ms: u64,
    event_capacity: usize,
    default_room_name: String,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            default_room_name: DEFAULT_ROOM_NAME.to_owned(),
        }
    }
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let default_room_name = match value.default_room_name.trim() {
            "" => DEFAULT_ROOM_NAME.to_owned(),
            name => name.to_owned(),
        };
        Self {
            poll_interval: Duration::from_millis(value.poll_interval_ms.max(1)),
            poll_timeout: Duration::from_millis(value.poll_timeout_ms.max(1)),
            event_capacity: value.event_capacity.max(1),
            default_room_name,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
