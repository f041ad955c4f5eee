use indexmap::{IndexMap, IndexSet};

use relcast_core::FileSource;
use relcast_graph::DependencyGraph;
use relcast_manifest::{
    dependency_versions, package_name, package_version_raw, parse_document, workspace_members,
};

use crate::config::CascadeConfig;
use crate::error::CascadeError;

/// One workspace member's manifest, read once per run.
#[derive(Debug, Clone)]
pub struct MemberManifest {
    pub name: String,
    /// Member directory relative to the repository root.
    pub path: String,
    pub manifest_path: String,
    /// Raw recorded version; parsed lazily so a malformed value only fails
    /// the member that needs arithmetic on it.
    pub version: String,
    /// All recorded dependency versions, in-workspace or not.
    pub dependencies: IndexMap<String, String>,
    /// The manifest text, kept for format-preserving rewrites.
    pub manifest_text: String,
}

fn member_manifest_path(member_dir: &str) -> String {
    let dir = member_dir.trim_end_matches('/');
    if dir.is_empty() || dir == "." {
        "Cargo.toml".to_string()
    } else {
        format!("{dir}/Cargo.toml")
    }
}

/// Reads the workspace manifest and every member manifest through the file
/// collaborator. A missing workspace manifest, a missing `members` list or
/// a missing member manifest is a fatal configuration error.
///
/// # Errors
///
/// Returns `CascadeError` naming the offending path.
pub fn load_members(
    files: &dyn FileSource,
    config: &CascadeConfig,
) -> Result<Vec<MemberManifest>, CascadeError> {
    let root =
        files
            .fetch_file(&config.root_manifest)?
            .ok_or_else(|| CascadeError::MissingWorkspaceManifest {
                path: config.root_manifest.clone(),
            })?;

    let root_doc = parse_document(&root.text).map_err(|source| CascadeError::Manifest {
        path: config.root_manifest.clone(),
        source,
    })?;
    let member_dirs = workspace_members(&root_doc).map_err(|source| CascadeError::Manifest {
        path: config.root_manifest.clone(),
        source,
    })?;

    let mut members = Vec::with_capacity(member_dirs.len());

    for dir in member_dirs {
        let manifest_path = member_manifest_path(&dir);
        let contents = files.fetch_file(&manifest_path)?.ok_or_else(|| {
            CascadeError::MissingMemberManifest {
                path: manifest_path.clone(),
            }
        })?;

        let doc = parse_document(&contents.text).map_err(|source| CascadeError::Manifest {
            path: manifest_path.clone(),
            source,
        })?;
        let name = package_name(&doc).map_err(|source| CascadeError::Manifest {
            path: manifest_path.clone(),
            source,
        })?;
        let version = package_version_raw(&doc).map_err(|source| CascadeError::Manifest {
            path: manifest_path.clone(),
            source,
        })?;

        members.push(MemberManifest {
            name,
            path: dir,
            manifest_path,
            version,
            dependencies: dependency_versions(&doc),
            manifest_text: contents.text,
        });
    }

    Ok(members)
}

/// Builds the workspace dependency graph: one node per member, edges for
/// dependencies that are themselves members. External dependencies never
/// enter the graph.
#[must_use]
pub fn build_graph(members: &[MemberManifest]) -> DependencyGraph {
    let names: IndexSet<&str> = members.iter().map(|m| m.name.as_str()).collect();

    let mut graph = DependencyGraph::new();
    for member in members {
        let deps: Vec<&str> = member
            .dependencies
            .keys()
            .map(String::as_str)
            .filter(|dep| names.contains(dep))
            .collect();
        graph.add_package(member.name.clone(), deps);
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use relcast_core::MemoryFileSource;

    fn workspace_source() -> MemoryFileSource {
        MemoryFileSource::new()
            .with_file(
                "Cargo.toml",
                "[workspace]\nmembers = [\"crates/a\", \"crates/b\"]\n",
            )
            .with_file(
                "crates/a/Cargo.toml",
                "[package]\nname = \"crate-a\"\nversion = \"1.1.1\"\n",
            )
            .with_file(
                "crates/b/Cargo.toml",
                "[package]\nname = \"crate-b\"\nversion = \"2.2.2\"\n\n[dependencies]\ncrate-a = { version = \"1.1.1\", path = \"../a\" }\nserde = \"1.0\"\n",
            )
    }

    #[test]
    fn loads_all_members() {
        let members =
            load_members(&workspace_source(), &CascadeConfig::default()).expect("loads");

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "crate-a");
        assert_eq!(members[1].name, "crate-b");
        assert_eq!(members[1].version, "2.2.2");
        assert_eq!(
            members[1].dependencies.get("crate-a").map(String::as_str),
            Some("1.1.1")
        );
    }

    #[test]
    fn missing_workspace_manifest_is_fatal() {
        let err = load_members(&MemoryFileSource::new(), &CascadeConfig::default())
            .expect_err("should fail");
        assert!(matches!(err, CascadeError::MissingWorkspaceManifest { .. }));
    }

    #[test]
    fn missing_members_list_is_fatal() {
        let files = MemoryFileSource::new().with_file("Cargo.toml", "[workspace]\n");
        let err =
            load_members(&files, &CascadeConfig::default()).expect_err("should fail");
        assert!(matches!(err, CascadeError::Manifest { .. }));
    }

    #[test]
    fn missing_member_manifest_is_fatal() {
        let files = MemoryFileSource::new()
            .with_file("Cargo.toml", "[workspace]\nmembers = [\"crates/ghost\"]\n");
        let err =
            load_members(&files, &CascadeConfig::default()).expect_err("should fail");
        match err {
            CascadeError::MissingMemberManifest { path } => {
                assert_eq!(path, "crates/ghost/Cargo.toml");
            }
            other => panic!("expected missing member manifest, got {other}"),
        }
    }

    #[test]
    fn graph_only_contains_workspace_edges() {
        let members =
            load_members(&workspace_source(), &CascadeConfig::default()).expect("loads");
        let graph = build_graph(&members);

        assert_eq!(graph.len(), 2);
        let deps = graph.dependencies("crate-b").expect("crate-b in graph");
        assert!(deps.contains("crate-a"));
        assert!(!deps.contains("serde"));

        let order = graph.post_order().expect("orders");
        assert_eq!(order, vec!["crate-a".to_string(), "crate-b".to_string()]);
    }

    #[test]
    fn root_member_dir_maps_to_root_manifest() {
        assert_eq!(member_manifest_path("."), "Cargo.toml");
        assert_eq!(member_manifest_path("crates/x/"), "crates/x/Cargo.toml");
    }
}
