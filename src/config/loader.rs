// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{BuildFile, RawBuildFile};
use crate::errors::Result;

/// Load a build description and return the raw `RawBuildFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawBuildFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    let raw: RawBuildFile = toml::from_str(&contents)?;
    Ok(raw)
}

/// Load a build description from path and validate it.
///
/// Checks for:
/// - at least one job,
/// - unknown or self-referencing `after` entries,
/// - cycles,
/// - malformed daemon addresses.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BuildFile> {
    let raw = load_from_path(&path)?;
    BuildFile::try_from(raw)
}
