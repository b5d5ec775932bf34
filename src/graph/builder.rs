use std::collections::{HashMap, HashSet, VecDeque};
use tracing::trace;

use super::task::TaskNode;
use super::task_graph::TaskGraph;
use crate::error::{Result, WorkflowError};

/// Accumulates tasks and dependency edges, validated once in [`GraphBuilder::build`].
///
/// Task names are checked as they are added so that a collision fails before
/// any further work. Edges are checked at build time, together with the
/// acyclicity check.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: Vec<TaskNode>,
    index: HashMap<String, usize>,
    edges: Vec<(String, String)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_task(&mut self, node: TaskNode) -> Result<()> {
        if self.index.contains_key(&node.task_id) {
            return Err(WorkflowError::DuplicateTaskName { name: node.task_id });
        }
        trace!(task_id = %node.task_id, kind = node.kind.as_str(), "Adding task");
        self.index.insert(node.task_id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Declare that `to` runs after `from`
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.edges.push((from.into(), to.into()));
    }

    /// Resolve edges, reject unknown endpoints and cycles
    pub fn build(self) -> Result<TaskGraph> {
        let node_count = self.nodes.len();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for (from, to) in &self.edges {
            let from_idx = self.resolve(from)?;
            let to_idx = self.resolve(to)?;
            // repeated declarations collapse into one edge
            if seen.insert((from_idx, to_idx)) {
                successors[from_idx].push(to_idx);
                predecessors[to_idx].push(from_idx);
            }
        }

        let order = topological_order(&successors, &predecessors).map_err(|remaining| {
            let mut names: Vec<String> = remaining
                .into_iter()
                .map(|idx| self.nodes[idx].task_id.clone())
                .collect();
            names.sort();
            WorkflowError::CycleDetected { remaining: names }
        })?;

        Ok(TaskGraph::from_parts(
            self.nodes,
            self.index,
            successors,
            predecessors,
            order,
        ))
    }

    fn resolve(&self, task_id: &str) -> Result<usize> {
        self.index
            .get(task_id)
            .copied()
            .ok_or_else(|| WorkflowError::UnknownTask {
                name: task_id.to_string(),
            })
    }
}

/// Kahn's algorithm; on a cycle returns the nodes that were never released.
fn topological_order(
    successors: &[Vec<usize>],
    predecessors: &[Vec<usize>],
) -> std::result::Result<Vec<usize>, Vec<usize>> {
    let mut in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();
    let mut ready: VecDeque<usize> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(idx, _)| idx)
        .collect();

    let mut order = Vec::with_capacity(successors.len());
    while let Some(idx) = ready.pop_front() {
        order.push(idx);
        for &next in &successors[idx] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if order.len() == successors.len() {
        Ok(order)
    } else {
        Err(in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree > 0)
            .map(|(idx, _)| idx)
            .collect())
    }
}
