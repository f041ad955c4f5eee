mod edit;
mod error;
mod lockfile;

pub use edit::{
    dependency_versions, package_name, package_version, package_version_raw, parse_document,
    set_dependency_version, set_package_version, workspace_members,
};
pub use error::ManifestError;
pub use lockfile::reconcile_lockfile;

pub type Result<T> = std::result::Result<T, ManifestError>;
