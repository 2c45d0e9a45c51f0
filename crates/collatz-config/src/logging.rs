use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

static TRACING_INIT: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When disabled, logs are dropped.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "warn".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// Filter directives `level` stands for.
    ///
    /// Plain level names are matched case-insensitively (`warning` is accepted
    /// for `warn`); anything else is passed through as an `EnvFilter` string.
    pub fn directives(&self) -> String {
        let level = self.level.trim();
        if level.is_empty() {
            return Self::default_level();
        }
        if level.eq_ignore_ascii_case("warning") {
            return LevelFilter::WARN.to_string().to_ascii_lowercase();
        }
        match level.parse::<LevelFilter>() {
            Ok(filter) => filter.to_string().to_ascii_lowercase(),
            Err(_) => level.to_owned(),
        }
    }

    /// Effective filter: the configured directives, with `RUST_LOG` merged on top.
    ///
    /// Falls back to `RUST_LOG` alone, then to the configured directives, then
    /// to `warn`, taking the first candidate that parses.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = self.directives();
        let from_env = std::env::var(EnvFilter::DEFAULT_ENV)
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        let mut candidates = Vec::with_capacity(3);
        if let Some(from_env) = from_env {
            candidates.push(format!("{configured},{from_env}"));
            candidates.push(from_env);
        }
        candidates.push(configured);

        candidates
            .into_iter()
            .find_map(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::WARN.into()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

/// Install the global tracing subscriber.
///
/// Safe to call multiple times; only the first call installs a subscriber, and
/// an already-installed foreign subscriber is left in place.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let make_writer = if config.stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::sink)
        };

        let layer: Box<dyn tracing_subscriber::Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(make_writer)
                .with_ansi(false)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(filter).with(layer);
        if let Err(err) = subscriber.try_init() {
            eprintln!("collatz: tracing subscriber already installed: {err}");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_level(level: &str) -> LoggingConfig {
        LoggingConfig {
            level: level.to_owned(),
            ..LoggingConfig::default()
        }
    }

    #[test]
    fn level_names_are_normalized() {
        assert_eq!(with_level(" WARNING ").directives(), "warn");
        assert_eq!(with_level("Debug").directives(), "debug");
        assert_eq!(with_level("off").directives(), "off");
        assert_eq!(with_level("").directives(), "warn");
        assert_eq!(
            with_level("collatz.engine=debug").directives(),
            "collatz.engine=debug"
        );
    }

    #[test]
    fn unparsable_level_still_yields_a_filter() {
        let filter = with_level("collatz=[").env_filter();
        assert!(!filter.to_string().is_empty());
    }

    #[test]
    fn init_is_idempotent() {
        let config = LoggingConfig {
            stderr: false,
            ..LoggingConfig::default()
        };
        init_tracing(&config);
        init_tracing(&config);
        tracing::info!(target = "collatz.config", "tracing initialized twice");
    }
}
