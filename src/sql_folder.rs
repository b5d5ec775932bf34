//! # Version Folder Enumeration
//!
//! Lists the SQL payloads in one version folder. Each regular file becomes one
//! SQL task; its task token is the file name up to the first `.`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, WorkflowError};

/// One SQL payload inside a version folder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlFileRef {
    pub file_name: String,
    pub task_token: String,
}

impl SqlFileRef {
    pub fn new(file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let task_token = task_token(&file_name).to_string();
        Self {
            file_name,
            task_token,
        }
    }

    /// Path relative to the SQL root, as handed to the SQL operator
    pub fn template_path(&self, version: &str) -> String {
        format!("{version}/{}", self.file_name)
    }
}

/// `report.v2.sql` -> `report`
pub fn task_token(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Regular files of `dir` (symlinks resolved), sorted by file name.
///
/// Subdirectories and entries without a task token (dotfiles such as
/// `.gitkeep`) are skipped. Two files sharing a token are both returned; the
/// graph builder rejects the collision.
pub fn list_sql_files(dir: &Path) -> Result<Vec<SqlFileRef>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        WorkflowError::FileSystemError(format!("cannot read {}: {e}", dir.display()))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            WorkflowError::FileSystemError(format!("cannot read {}: {e}", dir.display()))
        })?;
        // Follows symlinks; a dangling link is an error, not a skipped entry
        let metadata = std::fs::metadata(entry.path()).map_err(|e| {
            WorkflowError::FileSystemError(format!(
                "cannot stat {}: {e}",
                entry.path().display()
            ))
        })?;

        let file_name = entry.file_name().into_string().map_err(|raw| {
            WorkflowError::ValidationError(format!(
                "non UTF-8 file name in {}: {}",
                dir.display(),
                raw.to_string_lossy()
            ))
        })?;

        if !metadata.is_file() {
            debug!(entry = %file_name, "Skipping non-file entry");
            continue;
        }

        let file = SqlFileRef::new(file_name);
        if file.task_token.is_empty() {
            debug!(entry = %file.file_name, "Skipping entry without a task token");
            continue;
        }
        files.push(file);
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_task_token_splits_at_first_dot() {
        assert_eq!(task_token("create_users.sql"), "create_users");
        assert_eq!(task_token("report.v2.sql"), "report");
        assert_eq!(task_token("README"), "README");
        assert_eq!(task_token(".gitkeep"), "");
    }

    #[test]
    fn test_template_path() {
        let file = SqlFileRef::new("functions.sql");
        assert_eq!(file.template_path("v3"), "v3/functions.sql");
    }

    #[test]
    fn test_lists_regular_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_views.sql"), "select 1").unwrap();
        fs::write(dir.path().join("a_tables.sql"), "select 1").unwrap();
        fs::write(dir.path().join(".gitkeep"), "").unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();

        let files = list_sql_files(dir.path()).unwrap();
        let tokens: Vec<_> = files.iter().map(|f| f.task_token.as_str()).collect();
        assert_eq!(tokens, vec!["a_tables", "b_views"]);
    }

    #[test]
    fn test_colliding_tokens_are_both_listed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("report.sql"), "").unwrap();
        fs::write(dir.path().join("report.csv"), "").unwrap();

        let files = list_sql_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.task_token == "report"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_listed() {
        let shared = tempfile::tempdir().unwrap();
        let target = shared.path().join("functions.sql");
        fs::write(&target, "select 1").unwrap();

        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("functions.sql")).unwrap();
        fs::write(dir.path().join("views.sql"), "select 1").unwrap();

        let files = list_sql_files(dir.path()).unwrap();
        let tokens: Vec<_> = files.iter().map(|f| f.task_token.as_str()).collect();
        assert_eq!(tokens, vec!["functions", "views"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.sql"), dir.path().join("gone.sql.link"))
            .unwrap();

        assert!(matches!(
            list_sql_files(dir.path()),
            Err(WorkflowError::FileSystemError(_))
        ));
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("v9");
        assert!(matches!(
            list_sql_files(&missing),
            Err(WorkflowError::FileSystemError(_))
        ));
    }
}
