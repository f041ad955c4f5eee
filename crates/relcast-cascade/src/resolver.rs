use chrono::NaiveDate;
use indexmap::IndexMap;
use semver::Version;
use tracing::{debug, warn};

use relcast_changelog::{dependency_entry, merge_section};
use relcast_core::{
    BumpLevel, Ecosystem, FileChange, FileSource, PackageConfig, PackageUpdate, ReleaseStrategy,
};
use relcast_manifest::{
    parse_document, reconcile_lockfile, set_dependency_version, set_package_version,
};
use relcast_version::apply_level;

use crate::config::CascadeConfig;
use crate::error::CascadeError;
use crate::workspace::{MemberManifest, build_graph, load_members};

#[derive(Debug, Clone)]
pub struct CascadeOptions {
    /// Release date stamped on synthesized changelog entries.
    pub date: NaiveDate,
    pub strategy: ReleaseStrategy,
}

impl CascadeOptions {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            strategy: ReleaseStrategy::for_ecosystem(Ecosystem::Cargo),
        }
    }
}

/// The resolved releases going into a cascade run: the version map (keyed
/// by package path) and the updates staged by per-package resolution.
#[derive(Debug, Clone, Default)]
pub struct CascadeState {
    pub versions: IndexMap<String, Version>,
    pub updates: Vec<PackageUpdate>,
}

/// The expanded result: the widened version map, the original updates
/// (possibly decorated) plus synthetic cascade-only ones, and the
/// reconciled lockfile when it changed.
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    pub versions: IndexMap<String, Version>,
    pub updates: Vec<PackageUpdate>,
    pub lockfile_change: Option<(String, FileChange)>,
}

struct DependencyBump {
    name: String,
    from: String,
    to: Version,
}

/// Walks the workspace graph dependency-first and re-versions every member
/// whose in-workspace dependencies changed.
///
/// Members already updated keep their version (never downgraded) and gain a
/// rewritten manifest plus dependency notes; members without an update of
/// their own get a patch bump (or their configured override) and a
/// synthetic update. A member whose own version does not parse is logged
/// and left unchanged rather than failing the run. Updates for packages
/// outside the tracked ecosystem pass through untouched.
///
/// # Errors
///
/// Graph integrity violations, missing workspace configuration and
/// unreadable manifests are fatal.
pub fn cascade(
    files: &dyn FileSource,
    config: &CascadeConfig,
    options: &CascadeOptions,
    state: CascadeState,
) -> Result<CascadeOutcome, CascadeError> {
    let members = load_members(files, config)?;
    let order = build_graph(&members).post_order()?;
    let overrides = config.overrides()?;

    let by_name: IndexMap<&str, &MemberManifest> =
        members.iter().map(|m| (m.name.as_str(), m)).collect();
    let path_to_name: IndexMap<&str, &str> = members
        .iter()
        .map(|m| (m.path.as_str(), m.name.as_str()))
        .collect();

    let CascadeState {
        versions: input_versions,
        mut updates,
    } = state;

    let mut versions_by_name: IndexMap<String, Version> = IndexMap::new();
    for (path, version) in &input_versions {
        if let Some(name) = path_to_name.get(path.as_str()) {
            versions_by_name.insert((*name).to_string(), version.clone());
        }
    }

    let mut update_index: IndexMap<String, usize> = IndexMap::new();
    for (i, update) in updates.iter().enumerate() {
        if update.config.ecosystem != options.strategy.ecosystem {
            debug!(
                package = %update.package_name,
                "update outside the tracked ecosystem passes through"
            );
            continue;
        }
        if !by_name.contains_key(update.package_name.as_str()) {
            continue;
        }
        update_index.insert(update.package_name.clone(), i);
        versions_by_name
            .entry(update.package_name.clone())
            .or_insert_with(|| update.version.clone());
    }

    let section_title = dependency_section_title(&options.strategy);

    for name in &order {
        let Some(member) = by_name.get(name.as_str()).copied() else {
            continue;
        };

        let mut dep_changes: Vec<DependencyBump> = Vec::new();
        for (dep, recorded) in &member.dependencies {
            let Some(next) = versions_by_name.get(dep) else {
                continue;
            };
            match Version::parse(recorded) {
                Ok(current) if current == *next => {}
                Ok(_) => dep_changes.push(DependencyBump {
                    name: dep.clone(),
                    from: recorded.clone(),
                    to: next.clone(),
                }),
                Err(_) => {
                    warn!(
                        package = %member.name,
                        dependency = %dep,
                        version = %recorded,
                        "non-semver dependency version passed through untouched"
                    );
                }
            }
        }

        if dep_changes.is_empty() {
            continue;
        }

        let notes = note_lines(&dep_changes);

        if let Some(idx) = update_index.get(name.as_str()).copied() {
            let update = &mut updates[idx];
            let content = rewrite_manifest(member, &update.version, &dep_changes)?;
            update
                .changes
                .insert(member.manifest_path.clone(), FileChange::new(content));

            update.changelog_entry = Some(match update.changelog_entry.take() {
                Some(existing) => merge_section(&existing, section_title, &notes),
                None => dependency_entry(&update.version, options.date, section_title, &notes),
            });
        } else {
            let current = match Version::parse(&member.version) {
                Ok(version) => version,
                Err(error) => {
                    warn!(
                        package = %member.name,
                        version = %member.version,
                        %error,
                        "cannot bump dependent with unparsable version; leaving it unchanged"
                    );
                    continue;
                }
            };

            let next = overrides
                .get(member.name.as_str())
                .cloned()
                .unwrap_or_else(|| apply_level(&current, BumpLevel::Patch));
            debug!(
                package = %member.name,
                %current,
                %next,
                "cascading bump for changed dependencies"
            );

            let content = rewrite_manifest(member, &next, &dep_changes)?;
            let mut update = PackageUpdate::new(
                member.path.clone(),
                member.name.clone(),
                PackageConfig::new(options.strategy.ecosystem),
                next.clone(),
            );
            update
                .changes
                .insert(member.manifest_path.clone(), FileChange::new(content));
            update.changelog_entry =
                Some(dependency_entry(&next, options.date, section_title, &notes));

            versions_by_name.insert(member.name.clone(), next);
            update_index.insert(member.name.clone(), updates.len());
            updates.push(update);
        }
    }

    let lockfile_change =
        reconcile_shared_lockfile(files, config, &options.strategy, &versions_by_name)?;

    let mut versions = input_versions;
    for member in &members {
        if let Some(version) = versions_by_name.get(member.name.as_str()) {
            versions.insert(member.path.clone(), version.clone());
        }
    }

    Ok(CascadeOutcome {
        versions,
        updates,
        lockfile_change,
    })
}

fn dependency_section_title(strategy: &ReleaseStrategy) -> &str {
    strategy
        .sections
        .iter()
        .find(|s| s.commit_type == "deps")
        .map_or("Dependencies", |s| s.title.as_str())
}

fn note_lines(dep_changes: &[DependencyBump]) -> Vec<String> {
    dep_changes
        .iter()
        .map(|bump| format!("* {} bumped from {} to {}", bump.name, bump.from, bump.to))
        .collect()
}

fn rewrite_manifest(
    member: &MemberManifest,
    version: &Version,
    dep_changes: &[DependencyBump],
) -> Result<String, CascadeError> {
    let mut doc =
        parse_document(&member.manifest_text).map_err(|source| CascadeError::Manifest {
            path: member.manifest_path.clone(),
            source,
        })?;

    set_package_version(&mut doc, version).map_err(|source| CascadeError::Manifest {
        path: member.manifest_path.clone(),
        source,
    })?;

    for bump in dep_changes {
        set_dependency_version(&mut doc, &bump.name, &bump.to);
    }

    Ok(doc.to_string())
}

fn reconcile_shared_lockfile(
    files: &dyn FileSource,
    config: &CascadeConfig,
    strategy: &ReleaseStrategy,
    versions_by_name: &IndexMap<String, Version>,
) -> Result<Option<(String, FileChange)>, CascadeError> {
    let Some(path) = config
        .lockfile
        .clone()
        .or_else(|| strategy.lockfile.map(ToString::to_string))
    else {
        return Ok(None);
    };

    let Some(contents) = files.fetch_file(&path)? else {
        return Ok(None);
    };

    let updated = reconcile_lockfile(&contents.text, versions_by_name).map_err(|source| {
        CascadeError::Manifest {
            path: path.clone(),
            source,
        }
    })?;

    Ok(updated.map(|content| (path, FileChange::new(content))))
}
