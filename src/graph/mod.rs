//! # Task Graph
//!
//! Named tasks joined by dependency edges. [`GraphBuilder`] accumulates tasks
//! and edges and validates them once (unique names, known endpoints, no
//! cycles), producing an immutable [`TaskGraph`] for the host scheduler.

mod builder;
mod task;
mod task_graph;

pub use builder::GraphBuilder;
pub use task::{TaskKind, TaskNode};
pub use task_graph::TaskGraph;
