use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse manifest TOML")]
    Parse {
        #[source]
        source: toml_edit::TomlError,
    },

    #[error("manifest is missing required field '{field}'")]
    MissingField { field: String },

    #[error("invalid version '{version}' in manifest")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },
}
