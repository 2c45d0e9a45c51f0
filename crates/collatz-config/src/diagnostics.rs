use serde::de::DeserializeOwned;

/// Combined diagnostics produced while loading and validating a config.
///
/// Loading is best effort: callers always get a `CollatzConfig` when
/// deserialization succeeds, plus whatever problems were found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Keys present in the input TOML that the config does not recognize
    /// (collected via `serde_ignored`, e.g. `logging.levle`).
    pub unknown_keys: Vec<String>,
    pub warnings: Vec<ConfigWarning>,
    /// Semantic failures; a config with errors must not be used to run.
    pub errors: Vec<ConfigValidationError>,
}

impl ConfigDiagnostics {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unknown_keys.is_empty() && self.warnings.is_empty() && self.errors.is_empty()
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn extend_validation(&mut self, validation: ValidationDiagnostics) {
        self.warnings.extend(validation.warnings);
        self.errors.extend(validation.errors);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationDiagnostics {
    pub warnings: Vec<ConfigWarning>,
    pub errors: Vec<ConfigValidationError>,
}

impl ValidationDiagnostics {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Batches larger than the cache evict entries before the batch finishes.
    BatchLargerThanCache { batch_size: u64, cache_size: usize },
    /// Every memory poll hits the OS.
    MemoryCheckIntervalZero,
    LoggingLevelInvalid { value: String, normalized: String },
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    InvalidValue { toml_path: String, message: String },
}

pub(crate) fn deserialize_toml_with_unknown_keys<T: DeserializeOwned>(
    text: &str,
) -> Result<(T, Vec<String>), toml::de::Error> {
    let mut unknown = Vec::<String>::new();
    let deserializer = toml::de::Deserializer::new(text);
    let value = serde_ignored::deserialize(deserializer, |path| {
        unknown.push(normalize_serde_ignored_path(path));
    })?;
    unknown.sort();
    unknown.dedup();
    Ok((value, unknown))
}

fn normalize_serde_ignored_path(path: serde_ignored::Path) -> String {
    // `serde_ignored::Path` renders with a leading `.` for root paths.
    path.to_string().trim_start_matches('.').to_string()
}
