//! The project manifest (`nexema.yaml`), grounded in the original
//! `NexemaConfig` struct (`original_source/nexema/config.go`).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NexemaError, NexemaResult};

/// Generator-specific settings, stored unparsed and handed to the matching
/// `Generator` implementation — the manifest schema has no opinion
/// on what a generator's own config looks like.
pub type GeneratorConfig = serde_yaml::Value;

/// The parsed contents of `nexema.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NexemaManifest {
    pub version: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Glob patterns matched relative to the manifest's directory; matching
    /// files are excluded from the build.
    #[serde(default)]
    pub skip: Vec<String>,
    /// Generator name to its arbitrary config, at least one required for
    /// `generate`; an empty map is still a valid manifest for `build`.
    #[serde(default)]
    pub generators: BTreeMap<String, GeneratorConfig>,
}

impl NexemaManifest {
    /// The manifest file name expected at a project root.
    pub const FILE_NAME: &'static str = "nexema.yaml";

    /// Reads and parses `nexema.yaml` from `project_root`. A missing or
    /// malformed manifest is a fatal I/O error, not a diagnostic — the
    /// loader cannot even begin without knowing the skip globs.
    pub fn load(project_root: &Path) -> NexemaResult<NexemaManifest> {
        let path = project_root.join(Self::FILE_NAME);
        let contents = std::fs::read_to_string(&path).map_err(|source| NexemaError::ManifestRead {
            path: path.clone(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| NexemaError::ManifestParse { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_manifest() {
        let manifest: NexemaManifest = serde_yaml::from_str("version: 1\n").unwrap();
        assert_eq!(manifest.version, 1);
        assert_eq!(manifest.name, None);
        assert!(manifest.skip.is_empty());
        assert!(manifest.generators.is_empty());
    }

    #[test]
    fn parses_a_full_manifest() {
        let yaml = r#"
version: 2
name: shapes
author: Ada Lovelace
skip:
  - "generated/**"
  - "*.tmp.nex"
generators:
  json:
    outputPath: ./out
"#;
        let manifest: NexemaManifest = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("shapes"));
        assert_eq!(manifest.skip, vec!["generated/**".to_string(), "*.tmp.nex".to_string()]);
        assert!(manifest.generators.contains_key("json"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = NexemaManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, NexemaError::ManifestRead { .. }));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(NexemaManifest::FILE_NAME), "version: [this is not valid\n").unwrap();
        let err = NexemaManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, NexemaError::ManifestParse { .. }));
    }

    #[test]
    fn missing_version_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(NexemaManifest::FILE_NAME), "name: no-version\n").unwrap();
        let err = NexemaManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, NexemaError::ManifestParse { .. }));
    }
}
