use std::fmt;

use indexmap::IndexMap;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::strategy::Ecosystem;

/// Severity of a version bump. Ordering is total: `Patch < Minor < Major`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpLevel {
    Patch,
    Minor,
    Major,
}

impl fmt::Display for BumpLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        };
        write!(f, "{s}")
    }
}

/// A raw commit as supplied by the history collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: Option<String>,
    pub message: String,
    pub files: Vec<String>,
}

impl Commit {
    #[must_use]
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sha: Some(sha.into()),
            message: message.into(),
            files: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_files(mut self, files: Vec<String>) -> Self {
        self.files = files;
        self
    }

    /// True when the commit touched a file under `prefix`. Used as a filter
    /// so a package only considers commits affecting its own directory.
    #[must_use]
    pub fn touches_path(&self, prefix: &str) -> bool {
        self.files.iter().any(|f| f.starts_with(prefix))
    }
}

/// A breaking-change (or other) note extracted from a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub title: String,
    pub text: String,
}

/// An issue or PR reference extracted from a `Key #value` footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub action: String,
    pub issue: String,
}

/// The footer key carrying an explicit next-version override.
pub const RELEASE_AS_FOOTER: &str = "Release-As";

/// A structured conventional-commit record.
///
/// `sha` carries over from the raw commit; footers that were themselves
/// nested commit messages are interpreted as additional records sharing the
/// same sha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommit {
    pub sha: Option<String>,
    pub commit_type: String,
    pub scope: Option<String>,
    pub breaking: bool,
    pub subject: String,
    pub body: String,
    pub notes: Vec<Note>,
    pub footers: IndexMap<String, String>,
    pub references: Vec<Reference>,
}

impl ParsedCommit {
    /// The `Release-As` override carried by this commit, if present and
    /// syntactically valid semver. A leading `v` is tolerated.
    #[must_use]
    pub fn release_as(&self) -> Option<Version> {
        self.footers.iter().find_map(|(key, value)| {
            if key.eq_ignore_ascii_case(RELEASE_AS_FOOTER) {
                Version::parse(value.trim().trim_start_matches('v')).ok()
            } else {
                None
            }
        })
    }
}

/// The authoritative outcome of bump resolution for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCandidate {
    pub version: Version,
    pub previous_tag: Option<String>,
}

/// File mode of a produced content delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    #[default]
    File,
    Executable,
}

/// A pending content change for one file, consumed by the publishing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub content: String,
    pub mode: FileMode,
}

impl FileChange {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            mode: FileMode::File,
        }
    }
}

/// Per-package release configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageConfig {
    pub ecosystem: Ecosystem,
    /// Explicit next version for this package, taking precedence over any
    /// computed bump.
    pub release_as: Option<Version>,
}

impl PackageConfig {
    #[must_use]
    pub fn new(ecosystem: Ecosystem) -> Self {
        Self {
            ecosystem,
            release_as: None,
        }
    }
}

/// One package's staged release: its resolved version plus the file deltas
/// and changelog entry that realize it. Created by per-package resolution;
/// the cascade may amend `changes` and `changelog_entry` (never downgrade
/// `version`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUpdate {
    pub path: String,
    pub package_name: String,
    pub config: PackageConfig,
    pub version: Version,
    pub changes: IndexMap<String, FileChange>,
    pub changelog_entry: Option<String>,
}

impl PackageUpdate {
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        package_name: impl Into<String>,
        config: PackageConfig,
        version: Version,
    ) -> Self {
        Self {
            path: path.into(),
            package_name: package_name.into(),
            config,
            version,
            changes: IndexMap::new(),
            changelog_entry: None,
        }
    }
}

/// One changelog section: which commit type feeds it, the rendered title,
/// and whether it is hidden. Hidden sections still count toward bump
/// inference but are omitted from rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SectionConfig {
    pub commit_type: String,
    pub title: String,
    #[serde(default)]
    pub hidden: bool,
}

impl SectionConfig {
    #[must_use]
    pub fn new(commit_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            title: title.into(),
            hidden: false,
        }
    }

    #[must_use]
    pub fn hidden(commit_type: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            commit_type: commit_type.into(),
            title: title.into(),
            hidden: true,
        }
    }
}
