use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashMap;
use std::fmt::Write as _;

use super::task::{TaskKind, TaskNode};

/// Validated, acyclic task graph
///
/// Construct through [`GraphBuilder`](super::GraphBuilder). Nodes keep their
/// insertion order; edges keep declaration order per node.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    nodes: Vec<TaskNode>,
    index: HashMap<String, usize>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    order: Vec<usize>,
}

impl TaskGraph {
    pub(super) fn from_parts(
        nodes: Vec<TaskNode>,
        index: HashMap<String, usize>,
        successors: Vec<Vec<usize>>,
        predecessors: Vec<Vec<usize>>,
        order: Vec<usize>,
    ) -> Self {
        Self {
            nodes,
            index,
            successors,
            predecessors,
            order,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    pub fn node(&self, task_id: &str) -> Option<&TaskNode> {
        self.index.get(task_id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, task_id: &str) -> bool {
        self.index.contains_key(task_id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.iter()
    }

    /// `(from, to)` pairs
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.successors.iter().enumerate().flat_map(move |(from, tos)| {
            tos.iter()
                .map(move |&to| (self.name(from), self.name(to)))
        })
    }

    pub fn predecessors(&self, task_id: &str) -> Vec<&str> {
        self.neighbours(task_id, &self.predecessors)
    }

    pub fn successors(&self, task_id: &str) -> Vec<&str> {
        self.neighbours(task_id, &self.successors)
    }

    pub fn in_degree(&self, task_id: &str) -> usize {
        self.index
            .get(task_id)
            .map_or(0, |&idx| self.predecessors[idx].len())
    }

    pub fn out_degree(&self, task_id: &str) -> usize {
        self.index
            .get(task_id)
            .map_or(0, |&idx| self.successors[idx].len())
    }

    /// Tasks without predecessors
    pub fn roots(&self) -> Vec<&str> {
        (0..self.nodes.len())
            .filter(|&idx| self.predecessors[idx].is_empty())
            .map(|idx| self.name(idx))
            .collect()
    }

    /// Tasks without successors
    pub fn leaves(&self) -> Vec<&str> {
        (0..self.nodes.len())
            .filter(|&idx| self.successors[idx].is_empty())
            .map(|idx| self.name(idx))
            .collect()
    }

    /// One valid execution order
    pub fn topological_order(&self) -> Vec<&str> {
        self.order.iter().map(|&idx| self.name(idx)).collect()
    }

    /// Tasks whose [`TaskKind::as_str`] equals `kind`, in insertion order
    pub fn tasks_of_kind(&self, kind: &str) -> Vec<&TaskNode> {
        self.nodes.iter().filter(|n| n.kind.as_str() == kind).collect()
    }

    pub fn sql_tasks(&self) -> Vec<&TaskNode> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.kind, TaskKind::SqlExecution { .. }))
            .collect()
    }

    /// Graphviz rendering
    pub fn to_dot(&self, name: &str) -> String {
        let mut dot = format!("digraph \"{}\" {{\n    rankdir=LR;\n", dot_escape(name));
        for node in &self.nodes {
            let shape = if node.kind.is_barrier() { "point" } else { "box" };
            let _ = writeln!(dot, "    \"{}\" [shape={shape}];", dot_escape(&node.task_id));
        }
        for (from, to) in self.edges() {
            let _ = writeln!(dot, "    \"{}\" -> \"{}\";", dot_escape(from), dot_escape(to));
        }
        dot.push_str("}\n");
        dot
    }

    fn name(&self, idx: usize) -> &str {
        &self.nodes[idx].task_id
    }

    fn neighbours(&self, task_id: &str, adjacency: &[Vec<usize>]) -> Vec<&str> {
        self.index
            .get(task_id)
            .map(|&idx| adjacency[idx].iter().map(|&n| self.name(n)).collect())
            .unwrap_or_default()
    }
}

/// Quoted DOT ids: backslash and double quote are escaped
fn dot_escape(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}

#[derive(serde::Serialize)]
struct EdgeView<'a> {
    from: &'a str,
    to: &'a str,
}

impl Serialize for TaskGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let edges: Vec<EdgeView<'_>> = self
            .edges()
            .map(|(from, to)| EdgeView { from, to })
            .collect();

        let mut state = serializer.serialize_struct("TaskGraph", 2)?;
        state.serialize_field("tasks", &self.nodes)?;
        state.serialize_field("edges", &edges)?;
        state.end()
    }
}
