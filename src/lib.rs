#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # SQL Version Control
//!
//! Builds the task graph that rolls one version of a SQL repository out to
//! every registered database connection, and provides the chat notification
//! hooks the scheduler calls while running it.
//!
//! ## Overview
//!
//! A build pass:
//!
//! 1. lists connection identifiers matching a prefix from the registry
//! 2. lists the SQL files of the version folder (`<SQL root>/<version>`)
//! 3. composes the graph: a shared entry and exit barrier, one barrier pair per
//!    connection, and one SQL task per connection and file
//!
//! Scheduling, SQL execution and retries belong to the host scheduler that
//! consumes the resulting [`WorkflowDefinition`].
//!
//! ## Module Organization
//!
//! - [`config`] - Layered configuration
//! - [`registry`] - Connection registry backends
//! - [`sql_folder`] - Version folder enumeration
//! - [`graph`] - Task graph builder and queries
//! - [`workflow`] - Graph layout and workflow definition
//! - [`notifications`] - Success and failure hooks
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use sql_version_control::sql_folder::SqlFileRef;
//! use sql_version_control::workflow::GraphLayout;
//!
//! let connections = vec!["db_orders".to_string(), "db_billing".to_string()];
//! let files = vec![SqlFileRef::new("functions.sql"), SqlFileRef::new("views.sql")];
//!
//! let graph = GraphLayout {
//!     connections: &connections,
//!     files: &files,
//!     version: "v3",
//!     repository_pull: None,
//! }
//! .build()
//! .unwrap();
//!
//! assert_eq!(graph.len(), 2 + 2 * 2 + 2 * 2);
//! assert_eq!(graph.successors("sql_db_orders_views"), vec!["dummy_end_db_orders"]);
//! ```

pub mod config;
pub mod constants;
#[cfg(feature = "postgres")]
pub mod database;
pub mod error;
pub mod graph;
pub mod logging;
pub mod notifications;
pub mod registry;
pub mod sql_folder;
pub mod workflow;

pub use config::{ConfigLoader, WorkflowConfig};
pub use error::{Result, WorkflowError};
pub use graph::{GraphBuilder, TaskGraph, TaskKind, TaskNode};
pub use notifications::{DispatchOutcome, ExecutionContext, Notifier};
pub use registry::{ConnectionRegistry, InMemoryConnectionRegistry};
#[cfg(feature = "postgres")]
pub use registry::PgConnectionRegistry;
pub use sql_folder::SqlFileRef;
pub use workflow::{build_workflow, GraphLayout, WorkflowDefinition};
