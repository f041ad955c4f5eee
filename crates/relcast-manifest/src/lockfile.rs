use indexmap::IndexMap;
use semver::Version;
use toml_edit::{Item, value};

use crate::edit::parse_document;
use crate::error::ManifestError;

/// Rewrites every `[[package]]` entry of a lockfile whose name appears in
/// `versions` to the new version. Returns `None` when nothing changed, so
/// callers can skip staging an identical file.
///
/// # Errors
///
/// Returns `ManifestError::Parse` if the lockfile is not valid TOML.
pub fn reconcile_lockfile(
    content: &str,
    versions: &IndexMap<String, Version>,
) -> Result<Option<String>, ManifestError> {
    let mut doc = parse_document(content)?;
    let mut changed = false;

    if let Some(packages) = doc
        .get_mut("package")
        .and_then(Item::as_array_of_tables_mut)
    {
        for package in packages.iter_mut() {
            let Some(name) = package.get("name").and_then(Item::as_str) else {
                continue;
            };
            let Some(next) = versions.get(name) else {
                continue;
            };

            let current = package.get("version").and_then(Item::as_str);
            if current != Some(next.to_string().as_str()) {
                package.insert("version", value(next.to_string()));
                changed = true;
            }
        }
    }

    Ok(changed.then(|| doc.to_string()))
}
