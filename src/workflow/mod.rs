//! # SQL Rollout Workflow
//!
//! Builds the complete [`WorkflowDefinition`] handed to the host scheduler:
//! metadata, default task arguments, notification wiring and the task graph.
//!
//! Every build re-reads the connection registry and the version folder; any
//! failure along the way aborts the build and nothing partial is returned.
//!
//! ```rust,no_run
//! use sql_version_control::config::ConfigLoader;
//! use sql_version_control::registry::InMemoryConnectionRegistry;
//! use sql_version_control::workflow::build_workflow;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! let registry = InMemoryConnectionRegistry::new(["db_orders", "db_billing"]);
//! let definition = build_workflow(&config, &registry).await?;
//! println!("{}", definition.summary());
//! # Ok(())
//! # }
//! ```

pub mod layout;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::config::WorkflowConfig;
use crate::error::Result;
use crate::graph::TaskGraph;
use crate::logging::{log_error, log_graph_operation, log_registry_operation};
use crate::registry::ConnectionRegistry;
use crate::sql_folder::{list_sql_files, SqlFileRef};

pub use layout::{
    connection_end_id, connection_start_id, repository_pull_command, sql_task_id, GraphLayout,
};

/// Arguments applied to every task unless overridden
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultArgs {
    pub owner: String,
    pub start_date: DateTime<Utc>,
    pub depends_on_past: bool,
    pub email: Vec<String>,
    pub email_on_failure: bool,
}

/// Which lifecycle hooks the scheduler must invoke
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationWiring {
    pub destination_id: String,
    /// Graph-level success hook
    pub on_success: bool,
    /// Tasks carrying the per-task failure hook
    pub on_failure_tasks: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowDefinition {
    pub dag_id: String,
    pub description: String,
    pub version: String,
    pub schedule: Option<String>,
    pub run_timeout_seconds: u64,
    /// SQL templates resolve relative to this folder
    pub template_searchpath: PathBuf,
    pub default_args: DefaultArgs,
    pub notifications: NotificationWiring,
    pub connections: Vec<String>,
    pub sql_files: Vec<SqlFileRef>,
    pub graph: TaskGraph,
}

impl WorkflowDefinition {
    pub fn summary(&self) -> BuildSummary {
        BuildSummary {
            dag_id: self.dag_id.clone(),
            connections: self.connections.len(),
            sql_files: self.sql_files.len(),
            tasks: self.graph.len(),
            edges: self.graph.edge_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub dag_id: String,
    pub connections: usize,
    pub sql_files: usize,
    pub tasks: usize,
    pub edges: usize,
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} connections, {} sql files, {} tasks, {} edges",
            self.dag_id, self.connections, self.sql_files, self.tasks, self.edges
        )
    }
}

/// Build the workflow definition for the current moment
pub async fn build_workflow(
    config: &WorkflowConfig,
    registry: &dyn ConnectionRegistry,
) -> Result<WorkflowDefinition> {
    build_workflow_at(config, registry, Utc::now()).await
}

/// Build the workflow definition as of `now` (drives the default start date)
#[instrument(skip(config, registry), fields(dag_id = %config.dag.dag_id))]
pub async fn build_workflow_at(
    config: &WorkflowConfig,
    registry: &dyn ConnectionRegistry,
    now: DateTime<Utc>,
) -> Result<WorkflowDefinition> {
    config.validate()?;
    let version = config.version()?;
    let prefix = config.registry.connection_prefix.as_str();

    let connections = registry
        .list_connection_ids(prefix)
        .await
        .inspect_err(|e| log_error("workflow", "list_connection_ids", &e.to_string(), Some(prefix)))?;
    log_registry_operation("list_connection_ids", prefix, Some(connections.len()), "ok", None);

    let version_folder = config.sql.root_folder.join(&version);
    let sql_files = list_sql_files(&version_folder).inspect_err(|e| {
        log_error(
            "workflow",
            "list_sql_files",
            &e.to_string(),
            Some(&version_folder.display().to_string()),
        )
    })?;

    let repository_pull = config
        .dag
        .pull_repository
        .then(|| repository_pull_command(&config.sql.root_folder.display().to_string()));

    let graph = GraphLayout {
        connections: &connections,
        files: &sql_files,
        version: &version,
        repository_pull,
    }
    .build()
    .inspect_err(|e| log_error("workflow", "build_graph", &e.to_string(), None))?;

    log_graph_operation(
        "build_workflow",
        &config.dag.dag_id,
        Some(graph.len()),
        Some(graph.edge_count()),
        "ok",
        None,
    );

    let on_failure_tasks = graph
        .nodes()
        .filter(|n| n.notify_on_failure)
        .map(|n| n.task_id.clone())
        .collect();

    let definition = WorkflowDefinition {
        dag_id: config.dag.dag_id.clone(),
        description: config.dag.description.clone(),
        version,
        schedule: config.dag.schedule.clone(),
        run_timeout_seconds: config.run_timeout().as_secs(),
        template_searchpath: config.sql.root_folder.clone(),
        default_args: DefaultArgs {
            owner: config.dag.owner.clone(),
            start_date: days_ago(now, config.dag.start_days_ago),
            depends_on_past: config.dag.depends_on_past,
            email: config.dag.email.clone(),
            email_on_failure: config.dag.email_on_failure,
        },
        notifications: NotificationWiring {
            destination_id: config.notifications.destination_id.clone(),
            on_success: true,
            on_failure_tasks,
        },
        connections,
        sql_files,
        graph,
    };

    info!(summary = %definition.summary(), "Workflow definition built");
    Ok(definition)
}

/// Midnight UTC, `days` days before `now`
pub fn days_ago(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    (now - Duration::days(i64::from(days)))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}
