//! Manifest file reading and YAML parsing.

use std::path::Path;

use tasksmith_core::Manifest;

use crate::{ConfigError, ConfigResult};

/// Parse a manifest document from its YAML text.
pub fn parse_manifest(yaml: &str) -> ConfigResult<Manifest> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read and parse a manifest file from disk.
pub fn read_manifest(path: impl AsRef<Path>) -> ConfigResult<Manifest> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_manifest(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_manifest() {
        let yaml = r#"
version: "1"
workflows:
  default:
    build:
      run:
        - cmd: "echo hi"
tasks:
  - path: ./svc
"#;
        let manifest = parse_manifest(yaml).unwrap();
        assert_eq!(manifest.version, "1");
        assert_eq!(manifest.tasks.len(), 1);
        assert!(manifest.workflows.contains_key("default"));
    }

    #[test]
    fn empty_manifest_parses_to_defaults() {
        let manifest = parse_manifest("").unwrap();
        assert!(manifest.tasks.is_empty());
        assert!(manifest.workflows.is_empty());
    }

    #[test]
    fn read_manifest_reports_missing_file() {
        let err = read_manifest("/no/such/manifest.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn read_manifest_round_trips_through_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskfile.yaml");
        std::fs::write(&path, "version: \"1\"\ntasks: []\n").unwrap();
        let manifest = read_manifest(&path).unwrap();
        assert_eq!(manifest.version, "1");
    }
}
