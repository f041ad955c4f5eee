use indexmap::IndexMap;
use semver::Version;
use toml_edit::{DocumentMut, Item, value};

use crate::error::ManifestError;

const DEPENDENCY_SECTIONS: [&str; 3] = ["dependencies", "dev-dependencies", "build-dependencies"];

/// Parses manifest text into an editable document. The engine works on
/// fetched content, not files; callers attach path context to errors.
///
/// # Errors
///
/// Returns `ManifestError::Parse` if the TOML is malformed.
pub fn parse_document(content: &str) -> Result<DocumentMut, ManifestError> {
    content
        .parse::<DocumentMut>()
        .map_err(|source| ManifestError::Parse { source })
}

/// # Errors
///
/// Returns `ManifestError::MissingField` if `package.name` is absent.
pub fn package_name(doc: &DocumentMut) -> Result<String, ManifestError> {
    doc.get("package")
        .and_then(|p| p.get("name"))
        .and_then(Item::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ManifestError::MissingField {
            field: "package.name".to_string(),
        })
}

/// The raw `package.version` string, left unparsed so callers can decide
/// whether a non-semver value is fatal or tolerated.
///
/// # Errors
///
/// Returns `ManifestError::MissingField` if `package.version` is absent.
pub fn package_version_raw(doc: &DocumentMut) -> Result<String, ManifestError> {
    doc.get("package")
        .and_then(|p| p.get("version"))
        .and_then(Item::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ManifestError::MissingField {
            field: "package.version".to_string(),
        })
}

/// # Errors
///
/// Returns `ManifestError::MissingField` if `package.version` is absent or
/// `ManifestError::InvalidVersion` if it is not valid semver.
pub fn package_version(doc: &DocumentMut) -> Result<Version, ManifestError> {
    let version_str = package_version_raw(doc)?;

    Version::parse(&version_str).map_err(|source| ManifestError::InvalidVersion {
        version: version_str.clone(),
        source,
    })
}

/// Member paths of a workspace manifest. An absent `workspace.members`
/// list is a configuration error for the run.
///
/// # Errors
///
/// Returns `ManifestError::MissingField` if `workspace.members` is absent.
pub fn workspace_members(doc: &DocumentMut) -> Result<Vec<String>, ManifestError> {
    let members = doc
        .get("workspace")
        .and_then(|w| w.get("members"))
        .and_then(Item::as_array)
        .ok_or_else(|| ManifestError::MissingField {
            field: "workspace.members".to_string(),
        })?;

    Ok(members
        .iter()
        .filter_map(|v| v.as_str().map(ToString::to_string))
        .collect())
}

/// Version strings a manifest records for its dependencies, across
/// `[dependencies]`, `[dev-dependencies]` and `[build-dependencies]`.
/// Both `name = "1.2.3"` and table-form entries with a `version` key are
/// read; entries without an explicit version (path-only, `workspace = true`)
/// are skipped.
#[must_use]
pub fn dependency_versions(doc: &DocumentMut) -> IndexMap<String, String> {
    let mut versions = IndexMap::new();

    for section in DEPENDENCY_SECTIONS {
        let Some(deps) = doc.get(section).and_then(Item::as_table_like) else {
            continue;
        };

        for (name, entry) in deps.iter() {
            if let Some(version) = entry.as_str() {
                versions.insert(name.to_string(), version.to_string());
            } else if let Some(table) = entry.as_table_like() {
                if let Some(version) = table.get("version").and_then(Item::as_str) {
                    versions.insert(name.to_string(), version.to_string());
                }
            }
        }
    }

    versions
}

/// Sets `package.version`, replacing an inherited `version.workspace = true`
/// form with the literal.
///
/// # Errors
///
/// Returns `ManifestError::MissingField` if there is no `[package]` table.
pub fn set_package_version(doc: &mut DocumentMut, version: &Version) -> Result<(), ManifestError> {
    let package = doc
        .get_mut("package")
        .and_then(Item::as_table_like_mut)
        .ok_or_else(|| ManifestError::MissingField {
            field: "package".to_string(),
        })?;

    package.insert("version", value(version.to_string()));
    Ok(())
}

/// Updates the recorded version of `dependency` in every dependency section
/// it appears in. String-form entries are replaced in place; table-form
/// entries only when they carry an explicit `version` key and are not
/// `workspace = true`. Returns whether anything changed.
pub fn set_dependency_version(
    doc: &mut DocumentMut,
    dependency: &str,
    version: &Version,
) -> bool {
    let mut changed = false;

    for section in DEPENDENCY_SECTIONS {
        let Some(deps) = doc.get_mut(section) else {
            continue;
        };
        if update_dep_entry(deps, dependency, version) {
            changed = true;
        }
    }

    changed
}

fn update_dep_entry(deps: &mut Item, dep_name: &str, new_version: &Version) -> bool {
    let Some(entry) = deps.get_mut(dep_name) else {
        return false;
    };

    if entry.as_str().is_some() {
        *entry = value(new_version.to_string());
        return true;
    }

    if let Some(table) = entry.as_table_like_mut() {
        let inherits_workspace = table
            .get("workspace")
            .and_then(Item::as_bool)
            .unwrap_or(false);
        if inherits_workspace {
            return false;
        }

        if table.get("version").is_some() {
            table.insert("version", value(new_version.to_string()));
            return true;
        }
    }

    false
}
