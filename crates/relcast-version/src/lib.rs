mod bump;
mod error;
mod resolve;

pub use bump::{BumpOptions, BumpSuggestion, apply_level, suggest_bump};
pub use error::VersionError;
pub use resolve::{PreviousRelease, ResolveOptions, next_prerelease, resolve_candidate};

pub type Result<T> = std::result::Result<T, VersionError>;
