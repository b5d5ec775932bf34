//! # Notifications
//!
//! Chat messages for the graph-level success hook and the per-task failure
//! hook.
//!
//! - [`message`] - pure formatting (timestamps, Markdown escaping, log URL host)
//! - [`channel`] - the messaging side channel ([`TelegramChannel`], [`LogChannel`])
//! - [`ip`] - lazily cached public IP lookup
//! - [`Notifier`] - the two hooks, dispatching best-effort

pub mod channel;
pub mod ip;
pub mod message;
mod notifier;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub use channel::{LogChannel, MessageChannel, TelegramChannel, TelegramDestination};
pub use ip::{CachedIpResolver, HttpIpResolver, IpResolver, StaticIpResolver};
pub use notifier::{DispatchOutcome, Notifier};

/// Per-task runtime record supplied by the host scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub dag_id: String,
    pub task_id: String,
    pub execution_date: DateTime<FixedOffset>,
    pub log_url: String,
}
