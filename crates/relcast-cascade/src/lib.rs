mod config;
mod error;
mod resolver;
mod workspace;

pub use config::CascadeConfig;
pub use error::CascadeError;
pub use resolver::{CascadeOptions, CascadeOutcome, CascadeState, cascade};
pub use workspace::{MemberManifest, build_graph, load_members};

pub type Result<T> = std::result::Result<T, CascadeError>;
