//! YAML manifest parsing and validation for the tasksmith task runner.
//!
//! This crate handles:
//! - Reading and parsing the manifest file (`tasksmith-core` owns the data
//!   model it deserializes into)
//! - Validating task/workflow/stage references and deriving task names
//! - Building the task-level dependency graph the scheduler runs over

pub mod error;
pub mod load;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use load::{parse_manifest, read_manifest};
pub use validate::{validate, ValidatedManifest};

/// Read, parse, and validate a manifest file in one call.
pub fn load_and_validate(path: impl AsRef<std::path::Path>) -> ConfigResult<ValidatedManifest> {
    let manifest = read_manifest(path)?;
    validate(manifest)
}
