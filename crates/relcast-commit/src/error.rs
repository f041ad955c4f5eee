use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("empty commit message")]
    Empty,

    #[error("header does not follow 'type(scope)!: subject': '{line}'")]
    Header { line: String },
}
