use serde::{Deserialize, Serialize};

/// What a task does when the scheduler runs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskKind {
    /// Shell task refreshing the SQL checkout
    RepositoryPull { command: String },
    EntryBarrier,
    ExitBarrier,
    ConnectionStart { connection_id: String },
    ConnectionEnd { connection_id: String },
    /// Runs one SQL file against one connection
    SqlExecution {
        connection_id: String,
        /// Path relative to the template search path
        sql: String,
        autocommit: bool,
    },
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::RepositoryPull { .. } => "repository_pull",
            TaskKind::EntryBarrier => "entry_barrier",
            TaskKind::ExitBarrier => "exit_barrier",
            TaskKind::ConnectionStart { .. } => "connection_start",
            TaskKind::ConnectionEnd { .. } => "connection_end",
            TaskKind::SqlExecution { .. } => "sql_execution",
        }
    }

    /// No-op join/fan-out task
    pub fn is_barrier(&self) -> bool {
        matches!(
            self,
            TaskKind::EntryBarrier
                | TaskKind::ExitBarrier
                | TaskKind::ConnectionStart { .. }
                | TaskKind::ConnectionEnd { .. }
        )
    }

    pub fn connection_id(&self) -> Option<&str> {
        match self {
            TaskKind::ConnectionStart { connection_id }
            | TaskKind::ConnectionEnd { connection_id }
            | TaskKind::SqlExecution { connection_id, .. } => Some(connection_id),
            _ => None,
        }
    }
}

/// A named node of the task graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    pub task_id: String,
    #[serde(flatten)]
    pub kind: TaskKind,
    /// Whether the per-task failure callback is attached
    pub notify_on_failure: bool,
}

impl TaskNode {
    pub fn new(task_id: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            task_id: task_id.into(),
            kind,
            notify_on_failure: false,
        }
    }

    pub fn with_failure_notification(mut self) -> Self {
        self.notify_on_failure = true;
        self
    }
}
