use indexmap::IndexMap;
use semver::Version;
use serde::Deserialize;

use crate::error::CascadeError;

fn default_root_manifest() -> String {
    "Cargo.toml".to_string()
}

/// Cascade configuration, typically loaded from a TOML snippet in the
/// repository's release settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CascadeConfig {
    /// Path of the workspace manifest naming the member packages.
    #[serde(default = "default_root_manifest")]
    pub root_manifest: String,
    /// Shared lockfile path; falls back to the strategy default when unset.
    pub lockfile: Option<String>,
    /// Explicit next versions per package, overriding the computed patch
    /// bump for cascade-only releases.
    #[serde(default)]
    pub release_as: IndexMap<String, String>,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            root_manifest: default_root_manifest(),
            lockfile: None,
            release_as: IndexMap::new(),
        }
    }
}

impl CascadeConfig {
    /// # Errors
    ///
    /// Returns `CascadeError::Config` if the text is not valid TOML for
    /// this shape.
    pub fn from_toml(text: &str) -> Result<Self, CascadeError> {
        Ok(toml::from_str(text)?)
    }

    /// Parsed per-package overrides. An unparsable override is a
    /// configuration error for the run.
    ///
    /// # Errors
    ///
    /// Returns `CascadeError::InvalidOverride` naming the package.
    pub fn overrides(&self) -> Result<IndexMap<String, Version>, CascadeError> {
        self.release_as
            .iter()
            .map(|(package, raw)| {
                Version::parse(raw.trim().trim_start_matches('v'))
                    .map(|v| (package.clone(), v))
                    .map_err(|source| CascadeError::InvalidOverride {
                        package: package.clone(),
                        version: raw.clone(),
                        source,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CascadeConfig::default();
        assert_eq!(config.root_manifest, "Cargo.toml");
        assert!(config.lockfile.is_none());
        assert!(config.release_as.is_empty());
    }

    #[test]
    fn deserialize_full_config() {
        let toml = r#"
            root-manifest = "Cargo.toml"
            lockfile = "Cargo.lock"

            [release-as]
            "crate-b" = "3.0.0"
        "#;

        let config = CascadeConfig::from_toml(toml).expect("should deserialize");
        assert_eq!(config.lockfile.as_deref(), Some("Cargo.lock"));

        let overrides = config.overrides().expect("overrides parse");
        assert_eq!(overrides.get("crate-b"), Some(&Version::new(3, 0, 0)));
    }

    #[test]
    fn deserialize_partial_config_uses_defaults() {
        let config = CascadeConfig::from_toml("lockfile = \"Cargo.lock\"\n")
            .expect("should deserialize");
        assert_eq!(config.root_manifest, "Cargo.toml");
    }

    #[test]
    fn invalid_override_is_a_configuration_error() {
        let config = CascadeConfig::from_toml("[release-as]\n\"crate-b\" = \"soon\"\n")
            .expect("should deserialize");

        let err = config.overrides().expect_err("should fail");
        assert!(matches!(err, CascadeError::InvalidOverride { .. }));
    }

    #[test]
    fn invalid_toml_is_a_configuration_error() {
        assert!(matches!(
            CascadeConfig::from_toml("lockfile = ["),
            Err(CascadeError::Config(_))
        ));
    }
}
