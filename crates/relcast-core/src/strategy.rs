use semver::Version;
use serde::{Deserialize, Serialize};

use crate::types::SectionConfig;

/// Package ecosystem a workspace member belongs to. The cascade only
/// rewrites manifests of the tracked ecosystem; everything else passes
/// through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Ecosystem {
    #[default]
    Cargo,
    Node,
    Python,
    Go,
    Generic,
}

/// Per-ecosystem release parameters.
///
/// One record per ecosystem replaces a subclass per ecosystem: everything
/// that used to vary by inheritance is data here. Ecosystem-specific file
/// mutation stays with the external updater collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseStrategy {
    pub ecosystem: Ecosystem,
    /// Manifest file names this ecosystem records its version in.
    pub manifest_files: Vec<&'static str>,
    /// Shared lockfile name, when the ecosystem has one.
    pub lockfile: Option<&'static str>,
    /// Version used for a package that has never been released.
    pub initial_version: Version,
    /// Separator between a package component and the version in tag names.
    pub tag_separator: char,
    pub sections: Vec<SectionConfig>,
}

impl ReleaseStrategy {
    #[must_use]
    pub fn for_ecosystem(ecosystem: Ecosystem) -> Self {
        match ecosystem {
            Ecosystem::Cargo => Self {
                ecosystem,
                manifest_files: vec!["Cargo.toml"],
                lockfile: Some("Cargo.lock"),
                initial_version: Version::new(0, 1, 0),
                tag_separator: '-',
                sections: default_sections(),
            },
            Ecosystem::Node => Self {
                ecosystem,
                manifest_files: vec!["package.json"],
                lockfile: Some("package-lock.json"),
                initial_version: Version::new(1, 0, 0),
                tag_separator: '-',
                sections: default_sections(),
            },
            Ecosystem::Python => Self {
                ecosystem,
                manifest_files: vec!["pyproject.toml"],
                lockfile: None,
                initial_version: Version::new(0, 1, 0),
                tag_separator: '-',
                sections: default_sections(),
            },
            Ecosystem::Go => Self {
                ecosystem,
                manifest_files: vec!["go.mod"],
                lockfile: Some("go.sum"),
                initial_version: Version::new(0, 1, 0),
                tag_separator: '/',
                sections: default_sections(),
            },
            Ecosystem::Generic => Self {
                ecosystem,
                manifest_files: Vec::new(),
                lockfile: None,
                initial_version: Version::new(0, 1, 0),
                tag_separator: '-',
                sections: default_sections(),
            },
        }
    }

    /// Tag name for a release, component-prefixed for workspace members.
    #[must_use]
    pub fn tag_name(&self, component: Option<&str>, version: &Version) -> String {
        match component {
            Some(name) => format!("{name}{}v{version}", self.tag_separator),
            None => format!("v{version}"),
        }
    }
}

/// The default changelog section set. Hidden sections still feed bump
/// inference.
#[must_use]
pub fn default_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig::new("feat", "Features"),
        SectionConfig::new("fix", "Bug Fixes"),
        SectionConfig::new("perf", "Performance Improvements"),
        SectionConfig::new("deps", "Dependencies"),
        SectionConfig::new("revert", "Reverts"),
        SectionConfig::hidden("docs", "Documentation"),
        SectionConfig::hidden("style", "Styles"),
        SectionConfig::hidden("chore", "Miscellaneous Chores"),
        SectionConfig::hidden("refactor", "Code Refactoring"),
        SectionConfig::hidden("test", "Tests"),
        SectionConfig::hidden("build", "Build System"),
        SectionConfig::hidden("ci", "Continuous Integration"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cargo_strategy_defaults() {
        let strategy = ReleaseStrategy::for_ecosystem(Ecosystem::Cargo);
        assert_eq!(strategy.manifest_files, vec!["Cargo.toml"]);
        assert_eq!(strategy.lockfile, Some("Cargo.lock"));
        assert_eq!(strategy.initial_version, Version::new(0, 1, 0));
    }

    #[test]
    fn node_strategy_starts_at_one() {
        let strategy = ReleaseStrategy::for_ecosystem(Ecosystem::Node);
        assert_eq!(strategy.initial_version, Version::new(1, 0, 0));
    }

    #[test]
    fn tag_name_without_component() {
        let strategy = ReleaseStrategy::for_ecosystem(Ecosystem::Cargo);
        assert_eq!(strategy.tag_name(None, &Version::new(1, 2, 3)), "v1.2.3");
    }

    #[test]
    fn tag_name_with_component_uses_separator() {
        let strategy = ReleaseStrategy::for_ecosystem(Ecosystem::Cargo);
        assert_eq!(
            strategy.tag_name(Some("my-crate"), &Version::new(1, 2, 3)),
            "my-crate-v1.2.3"
        );
    }

    #[test]
    fn go_tag_uses_slash_separator() {
        let strategy = ReleaseStrategy::for_ecosystem(Ecosystem::Go);
        assert_eq!(
            strategy.tag_name(Some("mod"), &Version::new(0, 2, 0)),
            "mod/v0.2.0"
        );
    }

    #[test]
    fn default_sections_hide_chores() {
        let sections = default_sections();
        let chore = sections
            .iter()
            .find(|s| s.commit_type == "chore")
            .expect("chore section exists");
        assert!(chore.hidden);

        let feat = sections
            .iter()
            .find(|s| s.commit_type == "feat")
            .expect("feat section exists");
        assert!(!feat.hidden);
    }
}
