mod error;
mod graph;

pub use error::GraphError;
pub use graph::DependencyGraph;

pub type Result<T> = std::result::Result<T, GraphError>;
