use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::SourceError;
use crate::types::Commit;

/// A file's current content plus an opaque identity (e.g. a blob sha) the
/// publishing layer can use for optimistic updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    pub text: String,
    pub identity: String,
}

impl FileContents {
    #[must_use]
    pub fn new(text: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            identity: identity.into(),
        }
    }
}

/// Read access to the repository's current file contents.
///
/// Implemented by the out-of-scope remote client. `Ok(None)` means the file
/// does not exist, which callers treat as "create new"; every other failure
/// propagates. Fetches must be idempotent within one run.
pub trait FileSource {
    /// # Errors
    ///
    /// Returns `SourceError` for any failure other than the file not
    /// existing.
    fn fetch_file(&self, path: &str) -> Result<Option<FileContents>, SourceError>;
}

/// Supplies the raw commits since a marker (tag or sha), newest first by
/// convention; optionally restricted to commits touching `path`.
pub trait CommitSource {
    /// # Errors
    ///
    /// Returns `SourceError` if history cannot be read.
    fn commits_since(
        &self,
        marker: Option<&str>,
        path: Option<&str>,
    ) -> Result<Vec<Commit>, SourceError>;
}

/// In-memory [`FileSource`] used in tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSource {
    files: IndexMap<String, String>,
}

impl MemoryFileSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }
}

impl FileSource for MemoryFileSource {
    fn fetch_file(&self, path: &str) -> Result<Option<FileContents>, SourceError> {
        Ok(self
            .files
            .get(path)
            .map(|text| FileContents::new(text.clone(), path.to_string())))
    }
}

/// [`FileSource`] backed by a directory on disk, for local runs.
#[derive(Debug, Clone)]
pub struct DirectoryFileSource {
    root: PathBuf,
}

impl DirectoryFileSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(Path::new(path))
    }
}

impl FileSource for DirectoryFileSource {
    fn fetch_file(&self, path: &str) -> Result<Option<FileContents>, SourceError> {
        let full = self.resolve(path);
        match std::fs::read_to_string(&full) {
            Ok(text) => Ok(Some(FileContents::new(text, path.to_string()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SourceError::Io { path: full, source }),
        }
    }
}
