pub mod error;
pub mod source;
pub mod strategy;
pub mod types;

pub use error::*;
pub use source::{CommitSource, DirectoryFileSource, FileContents, FileSource, MemoryFileSource};
pub use strategy::{Ecosystem, ReleaseStrategy, default_sections};
pub use types::*;
