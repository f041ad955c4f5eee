use indexmap::{IndexMap, IndexSet};

use crate::error::GraphError;

/// A directed dependency graph over package names.
///
/// Must be acyclic, and every referenced dependency must exist as a node;
/// both violations are fatal when ordering.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package and its dependency names. Adding the same package
    /// again merges the dependency sets.
    pub fn add_package<I, S>(&mut self, name: impl Into<String>, deps: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.nodes.entry(name.into()).or_default();
        entry.extend(deps.into_iter().map(Into::into));
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    #[must_use]
    pub fn dependencies(&self, name: &str) -> Option<&IndexSet<String>> {
        self.nodes.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Orders the graph dependency-first: every dependency precedes every
    /// package that depends on it. Every node is visited, so disconnected
    /// components are covered; the relative order of independent branches
    /// follows insertion order but is otherwise unspecified.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Cycle` naming every node on the cycle, or
    /// `GraphError::UnknownDependency` for a dependency missing from the
    /// graph.
    pub fn post_order(&self) -> Result<Vec<String>, GraphError> {
        let mut visited: IndexSet<&str> = IndexSet::new();
        let mut path: Vec<&str> = Vec::new();
        let mut order: Vec<String> = Vec::with_capacity(self.nodes.len());

        for name in self.nodes.keys() {
            self.visit(name, &mut visited, &mut path, &mut order)?;
        }

        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &'a str,
        visited: &mut IndexSet<&'a str>,
        path: &mut Vec<&'a str>,
        order: &mut Vec<String>,
    ) -> Result<(), GraphError> {
        if visited.contains(name) {
            return Ok(());
        }

        if let Some(start) = path.iter().position(|n| *n == name) {
            let mut cycle: Vec<String> = path[start..].iter().map(ToString::to_string).collect();
            cycle.push(name.to_string());
            return Err(GraphError::Cycle { path: cycle });
        }

        path.push(name);
        let deps = self
            .nodes
            .get(name)
            .ok_or_else(|| GraphError::UnknownDependency {
                package: path[path.len().saturating_sub(2)].to_string(),
                dependency: name.to_string(),
            })?;

        for dep in deps {
            self.visit(dep, visited, path, order)?;
        }
        path.pop();

        visited.insert(name);
        order.push(name.to_string());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(order: &[String], name: &str) -> usize {
        order
            .iter()
            .position(|n| n == name)
            .unwrap_or_else(|| panic!("'{name}' missing from order {order:?}"))
    }

    #[test]
    fn dependencies_precede_dependents() {
        let mut graph = DependencyGraph::new();
        graph.add_package("c", ["b"]);
        graph.add_package("b", ["a"]);
        graph.add_package("a", Vec::<String>::new());

        let order = graph.post_order().expect("acyclic graph orders");

        assert_eq!(order.len(), 3);
        assert!(position(&order, "a") < position(&order, "b"));
        assert!(position(&order, "b") < position(&order, "c"));
    }

    #[test]
    fn ordering_holds_for_any_insertion_order() {
        let insertions: [&[&str]; 3] = [&["a", "b", "c"], &["c", "a", "b"], &["b", "c", "a"]];

        for names in insertions {
            let mut graph = DependencyGraph::new();
            for name in names {
                match *name {
                    "a" => graph.add_package("a", Vec::<String>::new()),
                    "b" => graph.add_package("b", ["a"]),
                    _ => graph.add_package("c", ["a", "b"]),
                }
            }

            let order = graph.post_order().expect("acyclic graph orders");
            assert!(position(&order, "a") < position(&order, "b"));
            assert!(position(&order, "b") < position(&order, "c"));
        }
    }

    #[test]
    fn disconnected_components_all_visited() {
        let mut graph = DependencyGraph::new();
        graph.add_package("a", Vec::<String>::new());
        graph.add_package("b", ["a"]);
        graph.add_package("x", Vec::<String>::new());
        graph.add_package("y", ["x"]);

        let order = graph.post_order().expect("acyclic graph orders");

        assert_eq!(order.len(), 4);
        assert!(position(&order, "x") < position(&order, "y"));
    }

    #[test]
    fn diamond_orders_once() {
        let mut graph = DependencyGraph::new();
        graph.add_package("base", Vec::<String>::new());
        graph.add_package("left", ["base"]);
        graph.add_package("right", ["base"]);
        graph.add_package("top", ["left", "right"]);

        let order = graph.post_order().expect("acyclic graph orders");

        assert_eq!(order.len(), 4);
        assert_eq!(order.iter().filter(|n| *n == "base").count(), 1);
        assert!(position(&order, "base") < position(&order, "left"));
        assert!(position(&order, "base") < position(&order, "right"));
        assert!(position(&order, "left") < position(&order, "top"));
    }

    #[test]
    fn cycle_error_names_every_node_on_it() {
        let mut graph = DependencyGraph::new();
        graph.add_package("a", ["b"]);
        graph.add_package("b", ["c"]);
        graph.add_package("c", ["a"]);

        let err = graph.post_order().expect_err("cycle should fail");

        match err {
            GraphError::Cycle { path } => {
                for name in ["a", "b", "c"] {
                    assert!(path.iter().any(|n| n == name), "{name} missing from {path:?}");
                }
                assert_eq!(path.first(), path.last());
            }
            other @ GraphError::UnknownDependency { .. } => {
                panic!("expected cycle error, got {other}")
            }
        }
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_package("a", ["a"]);

        let err = graph.post_order().expect_err("self-cycle should fail");
        assert!(matches!(err, GraphError::Cycle { .. }));
    }

    #[test]
    fn unknown_dependency_is_fatal() {
        let mut graph = DependencyGraph::new();
        graph.add_package("a", ["ghost"]);

        let err = graph.post_order().expect_err("missing node should fail");
        match err {
            GraphError::UnknownDependency {
                package,
                dependency,
            } => {
                assert_eq!(package, "a");
                assert_eq!(dependency, "ghost");
            }
            GraphError::Cycle { .. } => panic!("expected unknown dependency error"),
        }
    }

    #[test]
    fn merging_repeated_add_unions_dependencies() {
        let mut graph = DependencyGraph::new();
        graph.add_package("a", Vec::<String>::new());
        graph.add_package("b", Vec::<String>::new());
        graph.add_package("c", ["a"]);
        graph.add_package("c", ["b"]);

        let deps = graph.dependencies("c").expect("c exists");
        assert!(deps.contains("a") && deps.contains("b"));
    }
}
