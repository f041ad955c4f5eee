use semver::Version;

use relcast_core::{BumpLevel, ParsedCommit};

/// Policy knobs for bump inference.
#[derive(Debug, Clone, Copy, Default)]
pub struct BumpOptions {
    /// The package has not reached 1.0.0. Breaking changes bump minor
    /// instead of major, and features bump minor (or patch, below).
    pub pre_major: bool,
    /// With `pre_major`, fold feature commits into a patch bump instead of
    /// a minor one.
    pub bump_patch_for_minor_pre_major: bool,
}

/// An inferred release severity and the reason it was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpSuggestion {
    pub level: BumpLevel,
    pub reason: String,
}

/// Infers the release severity for a set of interpreted commits.
///
/// Breaking changes win over features, features over fixes. The pre-major
/// capping lives here and only here: while `pre_major` is set a breaking
/// change yields a minor bump and features yield minor or patch depending
/// on `bump_patch_for_minor_pre_major`.
///
/// Callers wanting to exclude commits (wrong scope, unrelated paths) filter
/// the slice before calling; filtered-out commits affect neither severity
/// nor changelog.
#[must_use]
pub fn suggest_bump(commits: &[ParsedCommit], options: &BumpOptions) -> BumpSuggestion {
    let breaking = commits.iter().filter(|c| c.breaking).count();
    let features = commits
        .iter()
        .filter(|c| c.commit_type == "feat")
        .count();

    let level = if breaking > 0 {
        if options.pre_major {
            BumpLevel::Minor
        } else {
            BumpLevel::Major
        }
    } else if features > 0 {
        if options.pre_major && options.bump_patch_for_minor_pre_major {
            BumpLevel::Patch
        } else {
            BumpLevel::Minor
        }
    } else {
        BumpLevel::Patch
    };

    let mut reason = format!(
        "{breaking} breaking change{} and {features} feature{}",
        plural(breaking),
        plural(features)
    );
    if options.pre_major && (breaking > 0 || features > 0) {
        reason.push_str(" (pre-major)");
    }

    BumpSuggestion { level, reason }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

/// Applies a severity to a version using standard semver increment rules.
/// Any pre-release or build suffix on the input is discarded.
#[must_use]
pub fn apply_level(version: &Version, level: BumpLevel) -> Version {
    let mut next = Version::new(version.major, version.minor, version.patch);

    match level {
        BumpLevel::Major => {
            next.major += 1;
            next.minor = 0;
            next.patch = 0;
        }
        BumpLevel::Minor => {
            next.minor += 1;
            next.patch = 0;
        }
        BumpLevel::Patch => {
            next.patch += 1;
        }
    }

    next
}
