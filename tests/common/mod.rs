#![allow(dead_code)]

use async_trait::async_trait;
use chrono::DateTime;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

use sql_version_control::notifications::{ExecutionContext, MessageChannel};
use sql_version_control::registry::ConnectionRegistry;
use sql_version_control::{Result, WorkflowConfig, WorkflowError};

/// SQL root holding one version folder with the given (empty) files
pub fn sql_root_with(version: &str, files: &[&str]) -> TempDir {
    let root = tempfile::tempdir().expect("temp dir");
    let folder = root.path().join(version);
    fs::create_dir_all(&folder).expect("version folder");
    for file in files {
        fs::write(folder.join(file), format!("-- {file}\nselect 1;\n")).expect("sql file");
    }
    root
}

pub fn config_for(root: &Path) -> WorkflowConfig {
    let mut config = WorkflowConfig::default();
    config.sql.root_folder = root.to_path_buf();
    config
}

/// Registry whose backend is down
pub struct UnreachableRegistry;

#[async_trait]
impl ConnectionRegistry for UnreachableRegistry {
    async fn list_connection_ids(&self, _prefix: &str) -> Result<Vec<String>> {
        Err(WorkflowError::DatabaseError(
            "registry unreachable: connection refused".to_string(),
        ))
    }
}

/// Channel that keeps every message it is asked to send
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingChannel {
    pub fn bodies(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("lock")
            .iter()
            .map(|(_, body)| body.clone())
            .collect()
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, destination_id: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .expect("lock")
            .push((destination_id.to_string(), body.to_string()));
        Ok(())
    }
}

pub fn execution_context(dag_id: &str, task_id: &str) -> ExecutionContext {
    ExecutionContext {
        dag_id: dag_id.to_string(),
        task_id: task_id.to_string(),
        execution_date: DateTime::parse_from_rfc3339("2024-03-01T10:00:00.123456+02:00")
            .expect("timestamp"),
        log_url: "http://localhost:8080/log?id=42".to_string(),
    }
}
