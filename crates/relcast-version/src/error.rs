use thiserror::Error;

#[derive(Debug, Error)]
pub enum VersionError {
    #[error("failed to parse previous version '{version}' for tag '{tag}'")]
    InvalidPreviousVersion {
        tag: String,
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("cannot increment pre-release suffix '{pre}'")]
    InvalidPrerelease { pre: String },
}
