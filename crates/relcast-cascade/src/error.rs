use thiserror::Error;

use relcast_core::SourceError;
use relcast_graph::GraphError;
use relcast_manifest::ManifestError;

#[derive(Debug, Error)]
pub enum CascadeError {
    #[error("workspace manifest '{path}' not found")]
    MissingWorkspaceManifest { path: String },

    #[error("member manifest '{path}' not found")]
    MissingMemberManifest { path: String },

    #[error("invalid manifest '{path}'")]
    Manifest {
        path: String,
        #[source]
        source: ManifestError,
    },

    #[error("invalid version override '{version}' for package '{package}'")]
    InvalidOverride {
        package: String,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to parse cascade configuration")]
    Config(#[from] toml::de::Error),
}
