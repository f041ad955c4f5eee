mod changelog;
mod error;
mod forge;
mod render;

pub use changelog::Changelog;
pub use error::ChangelogError;
pub use forge::{Forge, RepositoryInfo};
pub use render::{
    ReleaseMetadata, changelog_empty, dependency_entry, merge_section, render_entry,
};

pub type Result<T> = std::result::Result<T, ChangelogError>;
