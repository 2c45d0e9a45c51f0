use crate::diagnostics::{ConfigValidationError, ConfigWarning, ValidationDiagnostics};
use crate::CollatzConfig;

impl CollatzConfig {
    /// Validate semantic invariants.
    ///
    /// Reports every problem found in one pass instead of stopping at the first.
    #[must_use]
    pub fn validate(&self) -> ValidationDiagnostics {
        let mut out = ValidationDiagnostics::default();

        validate_engine(self, &mut out);
        validate_bench(self, &mut out);
        validate_logging(self, &mut out);

        out
    }
}

fn must_be_positive(out: &mut ValidationDiagnostics, toml_path: &str, value: u64) {
    if value == 0 {
        out.errors.push(ConfigValidationError::InvalidValue {
            toml_path: toml_path.to_string(),
            message: "must be >= 1".to_string(),
        });
    }
}

fn validate_engine(config: &CollatzConfig, out: &mut ValidationDiagnostics) {
    must_be_positive(out, "cache_size", config.cache_size as u64);
    must_be_positive(out, "memory_threshold_mb", config.memory_threshold_mb.0);
    must_be_positive(out, "memory_check_frequency", config.memory_check_frequency);

    if config.memory_check_interval_ms == 0 {
        out.warnings.push(ConfigWarning::MemoryCheckIntervalZero);
    }
}

fn validate_bench(config: &CollatzConfig, out: &mut ValidationDiagnostics) {
    must_be_positive(out, "batch_size", config.batch_size);
    must_be_positive(out, "sample_size", u64::from(config.sample_size));

    if config.cache_size > 0 && config.batch_size > config.cache_size as u64 {
        out.warnings.push(ConfigWarning::BatchLargerThanCache {
            batch_size: config.batch_size,
            cache_size: config.cache_size,
        });
    }
}

fn validate_logging(config: &CollatzConfig, out: &mut ValidationDiagnostics) {
    let normalized = config.logging.directives();
    if !config.logging.level.trim().is_empty()
        && tracing_subscriber::EnvFilter::try_new(normalized.as_str()).is_err()
    {
        out.warnings.push(ConfigWarning::LoggingLevelInvalid {
            value: config.logging.level.clone(),
            normalized,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_cleanly() {
        let diagnostics = CollatzConfig::default().validate();
        assert!(diagnostics.is_ok());
        assert!(diagnostics.warnings.is_empty());
    }

    #[test]
    fn zero_values_are_errors() {
        let config = CollatzConfig {
            cache_size: 0,
            batch_size: 0,
            sample_size: 0,
            ..CollatzConfig::default()
        };
        let paths: Vec<String> = config
            .validate()
            .errors
            .into_iter()
            .map(|err| match err {
                ConfigValidationError::InvalidValue { toml_path, .. } => toml_path,
            })
            .collect();
        assert_eq!(paths, vec!["cache_size", "batch_size", "sample_size"]);
    }

    #[test]
    fn oversized_batches_warn() {
        let config = CollatzConfig {
            cache_size: 10,
            batch_size: 11,
            ..CollatzConfig::default()
        };
        let diagnostics = config.validate();
        assert!(diagnostics.is_ok());
        assert_eq!(
            diagnostics.warnings,
            vec![ConfigWarning::BatchLargerThanCache {
                batch_size: 11,
                cache_size: 10
            }]
        );
    }
}
