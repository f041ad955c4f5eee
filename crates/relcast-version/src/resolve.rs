use semver::{Prerelease, Version};
use tracing::debug;

use relcast_core::{ParsedCommit, ReleaseCandidate};

use crate::bump::{BumpSuggestion, apply_level};
use crate::error::VersionError;

const DEFAULT_PRERELEASE_PREFIX: &str = "alpha";

/// The tag a package was last released under, with its raw version string.
/// The version is parsed here so that an unparsable previous version fails
/// this package's resolution and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviousRelease {
    pub tag: String,
    pub version: String,
}

impl PreviousRelease {
    #[must_use]
    pub fn new(tag: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            version: version.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Produce a pre-release instead of a final version.
    pub prerelease: bool,
    /// Version used when the package has never been tagged.
    pub initial_version: Version,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            prerelease: false,
            initial_version: Version::new(0, 1, 0),
        }
    }
}

/// Resolves the concrete next version for one package.
///
/// Precedence:
/// 1. The first commit in the given order carrying a valid `Release-As`
///    footer wins outright; later matches are ignored. Input order is
///    newest-first by convention, so this honors the most recent override.
/// 2. With no previous release, the configured initial version is used.
/// 3. Otherwise the suggested severity is applied to the previous version;
///    in pre-release mode an existing pre-release suffix has its trailing
///    integer incremented, and a first `-alpha1` suffix is appended to a
///    stable version without touching the numeric triple.
///
/// # Errors
///
/// Returns `VersionError::InvalidPreviousVersion` when the previous version
/// string cannot be parsed — fatal for this package only.
pub fn resolve_candidate(
    commits: &[ParsedCommit],
    suggestion: &BumpSuggestion,
    previous: Option<&PreviousRelease>,
    options: &ResolveOptions,
) -> Result<ReleaseCandidate, VersionError> {
    let previous_tag = previous.map(|p| p.tag.clone());

    if let Some(version) = commits.iter().find_map(ParsedCommit::release_as) {
        debug!(%version, "honoring Release-As override");
        return Ok(ReleaseCandidate {
            version,
            previous_tag,
        });
    }

    let Some(previous) = previous else {
        return Ok(ReleaseCandidate {
            version: options.initial_version.clone(),
            previous_tag,
        });
    };

    let raw = previous.version.trim().trim_start_matches('v');
    let previous_version =
        Version::parse(raw).map_err(|source| VersionError::InvalidPreviousVersion {
            tag: previous.tag.clone(),
            version: previous.version.clone(),
            source,
        })?;

    let version = if options.prerelease {
        next_prerelease(&previous_version)?
    } else {
        apply_level(&previous_version, suggestion.level)
    };

    Ok(ReleaseCandidate {
        version,
        previous_tag,
    })
}

/// Computes the next pre-release of `version`: an existing suffix has its
/// trailing integer incremented (`alpha9` -> `alpha10`), a stable version
/// gains `-alpha1` with the numeric triple unchanged.
///
/// # Errors
///
/// Returns `VersionError::InvalidPrerelease` when the existing suffix's
/// trailing integer does not fit or the built suffix is not legal semver.
pub fn next_prerelease(version: &Version) -> Result<Version, VersionError> {
    let pre = version.pre.as_str();

    let next_pre = if pre.is_empty() {
        format!("{DEFAULT_PRERELEASE_PREFIX}1")
    } else {
        let split = pre.len() - pre.chars().rev().take_while(char::is_ascii_digit).count();
        let (prefix, digits) = pre.split_at(split);
        let counter: u64 = if digits.is_empty() {
            0
        } else {
            digits
                .parse()
                .map_err(|_| VersionError::InvalidPrerelease {
                    pre: pre.to_string(),
                })?
        };
        format!("{prefix}{}", counter + 1)
    };

    let mut next = Version::new(version.major, version.minor, version.patch);
    next.pre = Prerelease::new(&next_pre).map_err(|_| VersionError::InvalidPrerelease {
        pre: next_pre.clone(),
    })?;

    Ok(next)
}
