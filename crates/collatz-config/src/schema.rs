use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::CollatzConfig;

/// JSON schema for `collatz.toml`, for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(CollatzConfig)
}
