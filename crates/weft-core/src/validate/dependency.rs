//! Dependency graph between the tasks of one workflow.
//!
//! Design:
//! - Forward edges: task -> tasks it depends on (waits for)
//! - Reverse edges: task -> tasks that depend on it (waiting tasks)
//! - Invariant: edges and reverse_edges must be kept in sync

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Dependency graph keyed by task name.
///
/// `BTreeMap`/`BTreeSet` keep iteration order stable, so the reported cycle
/// is the same every time for the same spec.
#[derive(Debug, Default)]
pub struct TaskGraph {
    /// Forward edges: task -> tasks it depends on (waits for)
    edges: BTreeMap<String, BTreeSet<String>>,

    /// Reverse edges: task -> tasks that depend on it (waiting tasks)
    reverse_edges: BTreeMap<String, BTreeSet<String>>,

    nodes: BTreeSet<String>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, task: &str) {
        self.nodes.insert(task.to_string());
    }

    /// Add a dependency: `task` depends on `depends_on`.
    ///
    /// Example: add_dependency("b", "a") means "b waits for a"
    pub fn add_dependency(&mut self, task: &str, depends_on: &str) {
        self.add_node(task);
        self.add_node(depends_on);
        self.edges
            .entry(task.to_string())
            .or_default()
            .insert(depends_on.to_string());
        self.reverse_edges
            .entry(depends_on.to_string())
            .or_default()
            .insert(task.to_string());
    }

    pub fn get_dependencies(&self, task: &str) -> Vec<&str> {
        self.edges
            .get(task)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn get_waiting_tasks(&self, task: &str) -> Vec<&str> {
        self.reverse_edges
            .get(task)
            .map(|waiting| waiting.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Detect a cycle with Kahn's algorithm (topological sort), O(V + E).
    ///
    /// Repeatedly removes tasks with no outstanding dependencies. Whatever
    /// cannot be removed lies on a cycle or waits on one; those tasks are
    /// returned, sorted. `None` means the graph is a DAG.
    pub fn detect_cycle(&self) -> Option<Vec<String>> {
        let mut remaining: BTreeMap<&str, usize> = self
            .nodes
            .iter()
            .map(|node| (node.as_str(), self.get_dependencies(node).len()))
            .collect();

        let mut ready: VecDeque<&str> = remaining
            .iter()
            .filter(|(_, deps)| **deps == 0)
            .map(|(node, _)| *node)
            .collect();

        while let Some(node) = ready.pop_front() {
            remaining.remove(node);
            for waiting in self.get_waiting_tasks(node) {
                if let Some(deps) = remaining.get_mut(waiting) {
                    *deps -= 1;
                    if *deps == 0 {
                        ready.push_back(waiting);
                    }
                }
            }
        }

        if remaining.is_empty() {
            None
        } else {
            Some(remaining.keys().map(|node| node.to_string()).collect())
        }
    }
}
