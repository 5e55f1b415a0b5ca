//! Application-level configuration loading: countdown length, store bounds and fan-out tuning.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MATCH_CLOCK_CONFIG_PATH";

const DEFAULT_TIMER_DURATION: Duration = Duration::from_secs(360);
const DEFAULT_STORE_CAPACITY: usize = 100;
const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(500);
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_OBSERVER_BUFFER: usize = 32;
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Length of every countdown.
    pub timer_duration: Duration,
    /// Expiry window applied to each store write.
    pub store_ttl: Duration,
    /// Maximum number of timer records held at once.
    pub store_capacity: usize,
    /// Upper bound on a single store call.
    pub store_timeout: Duration,
    /// Period between pushes while a timer runs.
    pub tick_interval: Duration,
    /// Per-observer queue length before updates are dropped.
    pub observer_buffer: usize,
    /// Period of the background purge of expired store entries.
    pub sweep_interval: Duration,
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
                        duration_secs = app_config.timer_duration.as_secs(),
                        capacity = app_config.store_capacity,
                        "loaded timer configuration"
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

    /// Parse a JSON document, filling omitted or zero fields with defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timer_duration: DEFAULT_TIMER_DURATION,
            store_ttl: DEFAULT_TIMER_DURATION,
            store_capacity: DEFAULT_STORE_CAPACITY,
            store_timeout: DEFAULT_STORE_TIMEOUT,
            tick_interval: DEFAULT_TICK_INTERVAL,
            observer_buffer: DEFAULT_OBSERVER_BUFFER,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    timer_duration_secs: Option<u64>,
    store_ttl_secs: Option<u64>,
    store_capacity: Option<usize>,
    store_timeout_ms: Option<u64>,
    tick_interval_ms: Option<u64>,
    observer_buffer: Option<usize>,
    sweep_interval_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let timer_duration = positive("timer_duration_secs", raw.timer_duration_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMER_DURATION);
        Self {
            timer_duration,
            store_ttl: positive("store_ttl_secs", raw.store_ttl_secs)
                .map(Duration::from_secs)
                .unwrap_or(timer_duration),
            store_capacity: positive("store_capacity", raw.store_capacity)
                .unwrap_or(DEFAULT_STORE_CAPACITY),
            store_timeout: positive("store_timeout_ms", raw.store_timeout_ms)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_STORE_TIMEOUT),
            tick_interval: positive("tick_interval_ms", raw.tick_interval_ms)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TICK_INTERVAL),
            observer_buffer: positive("observer_buffer", raw.observer_buffer)
                .unwrap_or(DEFAULT_OBSERVER_BUFFER),
            sweep_interval: positive("sweep_interval_secs", raw.sweep_interval_secs)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),
        }
    }
}

/// Discard zero values, which would stall ticking or disable the store.
fn positive<T>(field: &'static str, value: Option<T>) -> Option<T>
where
    T: PartialEq + Default,
{
    match value {
        Some(v) if v == T::default() => {
            warn!(field, "zero is not allowed; using the default");
            None
        }
        other => other,
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
