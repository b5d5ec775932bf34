//! Graph shape of the SQL rollout:
//!
//! ```text
//! [git_pull] -> dummy_start -> dummy_start_<conn> -> sql_<conn>_<file> -> dummy_end_<conn> -> dummy_end
//! ```
//!
//! One start/end barrier pair per connection, one SQL task per file and
//! connection.

use crate::constants::task_names;
use crate::error::Result;
use crate::graph::{GraphBuilder, TaskGraph, TaskKind, TaskNode};
use crate::sql_folder::SqlFileRef;

pub fn connection_start_id(connection_id: &str) -> String {
    format!("{}{connection_id}", task_names::CONNECTION_START_PREFIX)
}

pub fn connection_end_id(connection_id: &str) -> String {
    format!("{}{connection_id}", task_names::CONNECTION_END_PREFIX)
}

pub fn sql_task_id(connection_id: &str, task_token: &str) -> String {
    format!("{}{connection_id}_{task_token}", task_names::SQL_TASK_PREFIX)
}

/// Shell command refreshing the checkout at `sql_root`
pub fn repository_pull_command(sql_root: &str) -> String {
    format!("cd {sql_root}; git pull")
}

/// Inputs of one graph build
#[derive(Debug, Clone, Default)]
pub struct GraphLayout<'a> {
    pub connections: &'a [String],
    pub files: &'a [SqlFileRef],
    /// Version folder name used in SQL template paths
    pub version: &'a str,
    /// Prepends a repository pull task running this command
    pub repository_pull: Option<String>,
}

impl GraphLayout<'_> {
    /// Expected task count: entry, exit, a barrier pair per connection, one
    /// SQL task per connection and file, plus the optional pull task.
    pub fn expected_task_count(&self) -> usize {
        let pull = usize::from(self.repository_pull.is_some());
        pull + 2 + 2 * self.connections.len() + self.connections.len() * self.files.len()
    }

    pub fn build(&self) -> Result<TaskGraph> {
        let mut builder = GraphBuilder::new();

        if let Some(command) = &self.repository_pull {
            builder.add_task(
                TaskNode::new(
                    task_names::REPOSITORY_PULL,
                    TaskKind::RepositoryPull {
                        command: command.clone(),
                    },
                )
                .with_failure_notification(),
            )?;
            builder.add_edge(task_names::REPOSITORY_PULL, task_names::ENTRY_BARRIER);
        }

        builder.add_task(TaskNode::new(task_names::ENTRY_BARRIER, TaskKind::EntryBarrier))?;
        builder.add_task(TaskNode::new(task_names::EXIT_BARRIER, TaskKind::ExitBarrier))?;

        for connection_id in self.connections {
            let start = connection_start_id(connection_id);
            let end = connection_end_id(connection_id);

            builder.add_task(TaskNode::new(
                start.clone(),
                TaskKind::ConnectionStart {
                    connection_id: connection_id.clone(),
                },
            ))?;
            builder.add_task(TaskNode::new(
                end.clone(),
                TaskKind::ConnectionEnd {
                    connection_id: connection_id.clone(),
                },
            ))?;
            builder.add_edge(task_names::ENTRY_BARRIER, start.clone());
            builder.add_edge(end.clone(), task_names::EXIT_BARRIER);

            for file in self.files {
                let task_id = sql_task_id(connection_id, &file.task_token);
                builder.add_task(
                    TaskNode::new(
                        task_id.clone(),
                        TaskKind::SqlExecution {
                            connection_id: connection_id.clone(),
                            sql: file.template_path(self.version),
                            autocommit: true,
                        },
                    )
                    .with_failure_notification(),
                )?;
                builder.add_edge(start.clone(), task_id.clone());
                builder.add_edge(task_id, end.clone());
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WorkflowError;

    fn files(names: &[&str]) -> Vec<SqlFileRef> {
        names.iter().map(|n| SqlFileRef::new(*n)).collect()
    }

    fn conns(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_task_names() {
        assert_eq!(connection_start_id("db_a"), "dummy_start_db_a");
        assert_eq!(connection_end_id("db_a"), "dummy_end_db_a");
        assert_eq!(sql_task_id("db_a", "users"), "sql_db_a_users");
        assert_eq!(repository_pull_command("/srv/sql"), "cd /srv/sql; git pull");
    }

    #[test]
    fn test_single_connection_shape() {
        let connections = conns(&["db_a"]);
        let files = files(&["users.sql", "orders.sql"]);
        let layout = GraphLayout {
            connections: &connections,
            files: &files,
            version: "v3",
            repository_pull: None,
        };
        let graph = layout.build().unwrap();

        assert_eq!(graph.len(), layout.expected_task_count());
        assert_eq!(graph.len(), 6);
        assert_eq!(
            graph.successors("dummy_start_db_a"),
            vec!["sql_db_a_users", "sql_db_a_orders"]
        );
        assert_eq!(graph.successors("sql_db_a_orders"), vec!["dummy_end_db_a"]);
        assert_eq!(graph.successors("dummy_end_db_a"), vec!["dummy_end"]);

        match &graph.node("sql_db_a_orders").unwrap().kind {
            TaskKind::SqlExecution { sql, autocommit, .. } => {
                assert_eq!(sql, "v3/orders.sql");
                assert!(autocommit);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_repository_pull_precedes_entry() {
        let connections = conns(&["db_a"]);
        let layout = GraphLayout {
            connections: &connections,
            files: &[],
            version: "v3",
            repository_pull: Some(repository_pull_command("/srv/sql")),
        };
        let graph = layout.build().unwrap();

        // With no files nothing feeds the connection's end barrier
        assert_eq!(graph.roots(), vec!["git_pull", "dummy_end_db_a"]);
        assert_eq!(graph.successors("git_pull"), vec!["dummy_start"]);
        assert!(graph.node("git_pull").unwrap().notify_on_failure);
        assert_eq!(graph.len(), layout.expected_task_count());
    }

    #[test]
    fn test_repository_pull_is_sole_root_with_files() {
        let connections = conns(&["db_a", "db_b"]);
        let files = files(&["users.sql"]);
        let graph = GraphLayout {
            connections: &connections,
            files: &files,
            version: "v3",
            repository_pull: Some(repository_pull_command("/srv/sql")),
        }
        .build()
        .unwrap();

        assert_eq!(graph.roots(), vec!["git_pull"]);
        assert_eq!(graph.leaves(), vec!["dummy_end"]);
    }

    #[test]
    fn test_failure_callback_only_on_work_tasks() {
        let connections = conns(&["db_a"]);
        let files = files(&["users.sql"]);
        let graph = GraphLayout {
            connections: &connections,
            files: &files,
            version: "v3",
            repository_pull: Some("true".to_string()),
        }
        .build()
        .unwrap();

        for node in graph.nodes() {
            assert_eq!(node.notify_on_failure, !node.kind.is_barrier(), "{}", node.task_id);
        }
    }

    #[test]
    fn test_cross_connection_name_collision() {
        // sql_db_a_b_c from both (db_a, b_c) and (db_a_b, c)
        let connections = conns(&["db_a", "db_a_b"]);
        let files = files(&["b_c.sql", "c.sql"]);
        let err = GraphLayout {
            connections: &connections,
            files: &files,
            version: "v3",
            repository_pull: None,
        }
        .build()
        .unwrap_err();

        assert_eq!(
            err,
            WorkflowError::DuplicateTaskName {
                name: "sql_db_a_b_c".to_string()
            }
        );
    }
}
