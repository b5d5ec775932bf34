//! # Workflow Constants
//!
//! Fixed task names, naming prefixes and message markers shared by the graph
//! builder and the notifier.

/// Default workflow identifier; its last `_`-separated token is the SQL version folder.
pub const DEFAULT_DAG_ID: &str = "sql_version_control_v3";

pub const DEFAULT_DESCRIPTION: &str =
    "Version 3: Dynamically split the DAG based on the number of connection that meet the criteria";

/// Connections whose identifier starts with this prefix receive the SQL rollout.
pub const DEFAULT_CONNECTION_PREFIX: &str = "db_";

/// Process-level variable locating the SQL root folder.
pub const SQL_FOLDER_ENV_VAR: &str = "SQL_FOLDER_PATH";

pub const DEFAULT_RUN_TIMEOUT_MINUTES: u64 = 60;

/// Task identifiers and identifier prefixes.
pub mod task_names {
    pub const REPOSITORY_PULL: &str = "git_pull";
    pub const ENTRY_BARRIER: &str = "dummy_start";
    pub const EXIT_BARRIER: &str = "dummy_end";
    pub const CONNECTION_START_PREFIX: &str = "dummy_start_";
    pub const CONNECTION_END_PREFIX: &str = "dummy_end_";
    pub const SQL_TASK_PREFIX: &str = "sql_";
}

/// Notification markers and defaults.
pub mod notifications {
    /// U+2705 WHITE HEAVY CHECK MARK
    pub const SUCCESS_MARKER: &str = "\u{2705}";
    /// U+274C CROSS MARK
    pub const FAILURE_MARKER: &str = "\u{274C}";

    pub const DEFAULT_DESTINATION_ID: &str = "telegram_conn_id";
    pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
    pub const DEFAULT_IP_LOOKUP_URL: &str = "https://checkip.amazonaws.com";

    /// Host placeholder the scheduler writes into log URLs.
    pub const LOOPBACK_HOST: &str = "localhost";

    /// Asia/Jerusalem standard time.
    pub const DEFAULT_UTC_OFFSET_SECONDS: i32 = 2 * 3600;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dag_id_carries_version_suffix() {
        assert_eq!(DEFAULT_DAG_ID.rsplit('_').next(), Some("v3"));
    }

    #[test]
    fn test_markers() {
        assert_eq!(notifications::SUCCESS_MARKER, "✅");
        assert_eq!(notifications::FAILURE_MARKER, "❌");
    }
}
