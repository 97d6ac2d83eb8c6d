//! Live-mutable observability configuration.
//!
//! Readers sit on the query completion hot path, so the three knobs live in
//! an immutable snapshot behind an `ArcSwap`: reads are lock-free loads,
//! setters validate and swap in a new snapshot with exactly one field
//! replaced. A call in flight may observe a mix of old and new fields, which
//! is harmless. No cross-field atomicity is promised.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::error::ObserverError;
use crate::render::UNLIMITED;

/// Default slow-query threshold in milliseconds.
pub const DEFAULT_SLOW_QUERY_THRESHOLD_MS: u64 = 5_000;
/// Default rendered-statement length limit in characters.
pub const DEFAULT_MAX_QUERY_STRING_LENGTH: i32 = 500;
/// Default rendered-parameter length limit in characters.
pub const DEFAULT_MAX_PARAMETER_VALUE_LENGTH: i32 = 50;

#[derive(Debug, Clone, Copy)]
struct ConfigSnapshot {
    slow_query_threshold_ms: u64,
    max_query_string_length: i32,
    max_parameter_value_length: i32,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: DEFAULT_SLOW_QUERY_THRESHOLD_MS,
            max_query_string_length: DEFAULT_MAX_QUERY_STRING_LENGTH,
            max_parameter_value_length: DEFAULT_MAX_PARAMETER_VALUE_LENGTH,
        }
    }
}

/// Shared logger settings, mutable while the logger is running.
///
/// Created once, shared by reference with the logger, mutated arbitrarily
/// often; changes take effect for subsequent `record` calls without any
/// restart. Invalid writes are rejected and leave the prior value intact.
pub struct ObservabilityConfig {
    inner: ArcSwap<ConfigSnapshot>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ObservabilityConfig {
    pub fn new() -> Self {
        Self { inner: ArcSwap::from_pointee(ConfigSnapshot::default()) }
    }

    /// Seed a live config from loaded [`Settings`].
    pub fn from_settings(settings: &Settings) -> Result<Self, ObserverError> {
        validate_length("max_query_string_length", settings.max_query_string_length)?;
        validate_length("max_parameter_value_length", settings.max_parameter_value_length)?;
        Ok(Self {
            inner: ArcSwap::from_pointee(ConfigSnapshot {
                slow_query_threshold_ms: settings.slow_query_threshold_ms,
                max_query_string_length: settings.max_query_string_length,
                max_parameter_value_length: settings.max_parameter_value_length,
            }),
        })
    }

    /// Latency above which a successful query is reported as slow.
    pub fn slow_query_threshold_ms(&self) -> u64 {
        self.inner.load().slow_query_threshold_ms
    }

    /// Statement text limit: [`UNLIMITED`] or a positive character count.
    pub fn max_query_string_length(&self) -> i32 {
        self.inner.load().max_query_string_length
    }

    /// Per-value text limit: [`UNLIMITED`] or a positive character count.
    pub fn max_parameter_value_length(&self) -> i32 {
        self.inner.load().max_parameter_value_length
    }

    /// Replace the slow-query threshold. Negative thresholds are
    /// unrepresentable, so every `u64` is accepted.
    pub fn set_slow_query_threshold_ms(&self, value: u64) {
        self.inner.rcu(|cur| ConfigSnapshot { slow_query_threshold_ms: value, ..**cur });
    }

    /// Replace the statement text limit: -1 for unlimited, otherwise > 0.
    pub fn set_max_query_string_length(&self, value: i32) -> Result<(), ObserverError> {
        validate_length("max_query_string_length", value)?;
        self.inner.rcu(|cur| ConfigSnapshot { max_query_string_length: value, ..**cur });
        Ok(())
    }

    /// Replace the per-value text limit: -1 for unlimited, otherwise > 0.
    pub fn set_max_parameter_value_length(&self, value: i32) -> Result<(), ObserverError> {
        validate_length("max_parameter_value_length", value)?;
        self.inner.rcu(|cur| ConfigSnapshot { max_parameter_value_length: value, ..**cur });
        Ok(())
    }
}

fn validate_length(name: &str, value: i32) -> Result<(), ObserverError> {
    if value <= 0 && value != UNLIMITED {
        return Err(ObserverError::InvalidConfig(format!(
            "{} must be > 0 or -1, got {}",
            name, value
        )));
    }
    Ok(())
}

/// On-disk / environment representation of the logger settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_threshold")]
    pub slow_query_threshold_ms: u64,
    #[serde(default = "default_query_length")]
    pub max_query_string_length: i32,
    #[serde(default = "default_parameter_length")]
    pub max_parameter_value_length: i32,
}

fn default_threshold() -> u64 {
    DEFAULT_SLOW_QUERY_THRESHOLD_MS
}

fn default_query_length() -> i32 {
    DEFAULT_MAX_QUERY_STRING_LENGTH
}

fn default_parameter_length() -> i32 {
    DEFAULT_MAX_PARAMETER_VALUE_LENGTH
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            slow_query_threshold_ms: DEFAULT_SLOW_QUERY_THRESHOLD_MS,
            max_query_string_length: DEFAULT_MAX_QUERY_STRING_LENGTH,
            max_parameter_value_length: DEFAULT_MAX_PARAMETER_VALUE_LENGTH,
        }
    }
}

/// Load settings from an optional `query-observer` config file plus
/// `QUERY_OBSERVER__`-prefixed environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name("query-observer").required(false))
        .add_source(config::Environment::with_prefix("QUERY_OBSERVER").separator("__"))
        .build()?;

    let settings: Settings = cfg.try_deserialize()?;
    validate_settings(&settings)?;

    Ok(settings)
}

fn validate_settings(settings: &Settings) -> anyhow::Result<()> {
    validate_length("max_query_string_length", settings.max_query_string_length)?;
    validate_length("max_parameter_value_length", settings.max_parameter_value_length)?;
    Ok(())
}
