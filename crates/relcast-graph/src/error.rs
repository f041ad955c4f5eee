use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("package '{package}' depends on '{dependency}', which is not in the graph")]
    UnknownDependency {
        package: String,
        dependency: String,
    },

    #[error("dependency cycle detected: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },
}
