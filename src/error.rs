//! Error types for building and notifying on the SQL rollout workflow.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkflowError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("File system error: {0}")]
    FileSystemError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Notification error: {0}")]
    NotificationError(String),
    #[error("IP lookup error: {0}")]
    IpLookupError(String),
    #[error("Duplicate task name: {name}")]
    DuplicateTaskName { name: String },
    #[error("Edge references unknown task: {name}")]
    UnknownTask { name: String },
    #[error("Task graph contains a cycle through: {}", remaining.join(", "))]
    CycleDetected { remaining: Vec<String> },
}

impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        WorkflowError::DatabaseError(err.to_string())
    }
}

impl From<reqwest::Error> for WorkflowError {
    fn from(err: reqwest::Error) -> Self {
        WorkflowError::NotificationError(err.to_string())
    }
}

impl From<serde_json::Error> for WorkflowError {
    fn from(error: serde_json::Error) -> Self {
        WorkflowError::ValidationError(format!("JSON serialization error: {error}"))
    }
}

impl From<config::ConfigError> for WorkflowError {
    fn from(error: config::ConfigError) -> Self {
        WorkflowError::ConfigurationError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_tasks() {
        let err = WorkflowError::CycleDetected {
            remaining: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Task graph contains a cycle through: a, b");
    }
}
