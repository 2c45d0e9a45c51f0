//! Configuration for the Collatz benchmark (`collatz.toml`).
//!
//! Every recognized option is an explicit field with a serde default, so an
//! empty file is a valid config. Unknown keys are reported as diagnostics
//! rather than rejected.

mod diagnostics;
mod logging;
mod schema;
mod validation;

use collatz_bench::BenchConfig;
use collatz_engine::EngineConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub use diagnostics::{
    ConfigDiagnostics, ConfigValidationError, ConfigWarning, ValidationDiagnostics,
};
pub use logging::{init_tracing, LoggingConfig};
pub use schema::json_schema;

/// A memory threshold in megabytes.
///
/// Accepts either an integer megabyte count (`400`) or a human-friendly size
/// string (`"1.5GB"`), which is rounded up to whole megabytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
#[schemars(transparent)]
pub struct ThresholdMb(pub u64);

impl Serialize for ThresholdMb {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> Deserialize<'de> for ThresholdMb {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Megabytes(u64),
            Human(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Megabytes(value) => Ok(ThresholdMb(value)),
            Repr::Human(value) => collatz_memory::parse_byte_size(&value)
                .map(|bytes| ThresholdMb(bytes.div_ceil(collatz_memory::MB)))
                .map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct CollatzConfig {
    /// Capacity of the trajectory cache.
    #[serde(default = "CollatzConfig::default_cache_size")]
    #[schemars(range(min = 1))]
    pub cache_size: usize,

    /// Process memory (MB) above which the cache is force-cleared.
    #[serde(default = "CollatzConfig::default_memory_threshold")]
    pub memory_threshold_mb: ThresholdMb,

    /// Numbers per benchmark batch.
    #[serde(default = "CollatzConfig::default_batch_size")]
    #[schemars(range(min = 1))]
    pub batch_size: u64,

    /// Trajectory steps between two memory polls.
    #[serde(default = "CollatzConfig::default_memory_check_frequency")]
    #[schemars(range(min = 1))]
    pub memory_check_frequency: u64,

    /// Minimum time between two real memory samples, in milliseconds.
    #[serde(default = "CollatzConfig::default_memory_check_interval_ms")]
    pub memory_check_interval_ms: u64,

    /// Backpressure pause taken under memory pressure, in milliseconds.
    #[serde(default = "CollatzConfig::default_pressure_pause_ms")]
    pub pressure_pause_ms: u64,

    /// Measured repetitions per batch.
    #[serde(default = "CollatzConfig::default_sample_size")]
    #[schemars(range(min = 1))]
    pub sample_size: u32,

    /// Discarded priming passes before measurement.
    #[serde(default = "CollatzConfig::default_warmup_runs")]
    pub warmup_runs: u32,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CollatzConfig {
    fn default_cache_size() -> usize {
        EngineConfig::DEFAULT_CACHE_SIZE
    }

    fn default_memory_threshold() -> ThresholdMb {
        ThresholdMb(EngineConfig::DEFAULT_MEMORY_THRESHOLD_MB)
    }

    fn default_batch_size() -> u64 {
        BenchConfig::DEFAULT_BATCH_SIZE
    }

    fn default_memory_check_frequency() -> u64 {
        EngineConfig::DEFAULT_MEMORY_CHECK_FREQUENCY
    }

    fn default_memory_check_interval_ms() -> u64 {
        EngineConfig::DEFAULT_MEMORY_CHECK_INTERVAL.as_millis() as u64
    }

    fn default_pressure_pause_ms() -> u64 {
        EngineConfig::DEFAULT_PRESSURE_PAUSE.as_millis() as u64
    }

    fn default_sample_size() -> u32 {
        BenchConfig::DEFAULT_SAMPLE_SIZE
    }

    fn default_warmup_runs() -> u32 {
        BenchConfig::DEFAULT_WARMUP_RUNS
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            cache_size: self.cache_size,
            memory_threshold_mb: self.memory_threshold_mb.0,
            memory_check_frequency: self.memory_check_frequency,
            memory_check_interval: Duration::from_millis(self.memory_check_interval_ms),
            pressure_pause: Duration::from_millis(self.pressure_pause_ms),
        }
    }

    pub fn bench_config(&self) -> BenchConfig {
        BenchConfig {
            batch_size: self.batch_size,
            sample_size: self.sample_size,
            warmup_runs: self.warmup_runs,
        }
    }
}

impl Default for CollatzConfig {
    fn default() -> Self {
        Self {
            cache_size: Self::default_cache_size(),
            memory_threshold_mb: Self::default_memory_threshold(),
            batch_size: Self::default_batch_size(),
            memory_check_frequency: Self::default_memory_check_frequency(),
            memory_check_interval_ms: Self::default_memory_check_interval_ms(),
            pressure_pause_ms: Self::default_pressure_pause_ms(),
            sample_size: Self::default_sample_size(),
            warmup_runs: Self::default_warmup_runs(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` embeds a source snippet; keep just the message.
        ConfigError::Toml(err.message().to_string())
    }
}

impl CollatzConfig {
    /// Load a config file from TOML.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = read_config(path.as_ref())?;
        Ok(toml::from_str(&text)?)
    }

    /// Load a config file from TOML and return diagnostics (unknown keys and
    /// semantic validation results).
    pub fn load_from_path_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let text = read_config(path.as_ref())?;
        Self::load_from_str_with_diagnostics(&text)
    }

    /// Load a config from a TOML string and return diagnostics.
    pub fn load_from_str_with_diagnostics(
        text: &str,
    ) -> Result<(Self, ConfigDiagnostics), ConfigError> {
        let (config, unknown_keys) =
            diagnostics::deserialize_toml_with_unknown_keys::<CollatzConfig>(text)?;

        let mut diagnostics = ConfigDiagnostics {
            unknown_keys,
            ..ConfigDiagnostics::default()
        };
        diagnostics.extend_validation(config.validate());

        Ok((config, diagnostics))
    }
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}
