//! Package manifest parsing (package.json)
//!
//! Only the handful of fields the bundler needs are read; everything else in the
//! manifest is ignored.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading package.json
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("Failed to read manifest {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON
    #[error("Failed to parse manifest: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Validation error
    #[error("Invalid manifest: {0}")]
    ValidationError(String),
}

/// The subset of package.json the bundler cares about
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageManifest {
    /// Package name, used as the module identifier prefix
    pub name: String,

    /// Declared typings entry (`types`, or the legacy `typings`), relative to
    /// the project root
    #[serde(default, alias = "typings", skip_serializing_if = "Option::is_none")]
    pub types: Option<String>,
}

impl PackageManifest {
    /// Read `package.json` from a project root
    pub fn from_dir(project_root: &Path) -> Result<Self, ManifestError> {
        Self::from_file(&project_root.join("package.json"))
    }

    /// Parse a manifest from a file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse a manifest from a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ManifestError> {
        let manifest: PackageManifest = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.trim().is_empty() {
            return Err(ManifestError::ValidationError(
                "Package name cannot be empty".to_string(),
            ));
        }

        if self.name.contains('\\') || self.name.contains('\'') {
            return Err(ManifestError::ValidationError(format!(
                "Invalid package name: {}",
                self.name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_manifest() {
        let manifest = PackageManifest::from_str(r#"{ "name": "demo" }"#).unwrap();
        assert_eq!(manifest.name, "demo");
        assert!(manifest.types.is_none());
    }

    #[test]
    fn test_parse_scoped_package_with_typings() {
        let json = r#"{
            "name": "@org/lib",
            "version": "1.2.3",
            "main": "dist/index.js",
            "typings": "dist/index.d.ts",
            "dependencies": { "left-pad": "^1.0.0" }
        }"#;

        let manifest = PackageManifest::from_str(json).unwrap();
        assert_eq!(manifest.name, "@org/lib");
        assert_eq!(manifest.types.as_deref(), Some("dist/index.d.ts"));
    }

    #[test]
    fn test_reject_empty_name() {
        let err = PackageManifest::from_str(r#"{ "name": "  " }"#).unwrap_err();
        assert!(matches!(err, ManifestError::ValidationError(_)));
    }

    #[test]
    fn test_missing_name_is_parse_error() {
        let err = PackageManifest::from_str(r#"{ "version": "1.0.0" }"#).unwrap_err();
        assert!(matches!(err, ManifestError::ParseError(_)));
    }

    #[test]
    fn test_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        let err = PackageManifest::from_dir(temp.path()).unwrap_err();
        assert!(matches!(err, ManifestError::IoError { .. }));
    }
}
