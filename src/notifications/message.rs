//! Message bodies for the two lifecycle hooks. Pure functions; dispatch lives
//! in [`Notifier`](super::Notifier).

use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::net::IpAddr;

use super::ExecutionContext;
use crate::constants::notifications::{FAILURE_MARKER, LOOPBACK_HOST, SUCCESS_MARKER};

/// Execution time in `offset`, seconds precision: `2024-03-01T10:00:00+02:00`
pub fn format_execution_time(execution_date: &DateTime<FixedOffset>, offset: FixedOffset) -> String {
    execution_date
        .with_timezone(&offset)
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Escape `_` for the transport's Markdown mode
pub fn escape_markdown_underscores(text: &str) -> String {
    text.replace('_', "\\_")
}

/// Graph-level success message. Underscores are escaped.
pub fn success_message(ctx: &ExecutionContext, offset: FixedOffset) -> String {
    let message = format!(
        "{SUCCESS_MARKER} DAG successful!\nDAG: {}\nExecution Time: {}",
        ctx.dag_id,
        format_execution_time(&ctx.execution_date, offset)
    );
    escape_markdown_underscores(&message)
}

/// Per-task failure message. Underscores are left as they are.
///
/// With `public_ip` set, a `localhost` host in the log URL is replaced by it.
pub fn failure_message(
    ctx: &ExecutionContext,
    offset: FixedOffset,
    public_ip: Option<IpAddr>,
) -> String {
    let log_url = match public_ip {
        Some(ip) => rewrite_loopback_host(&ctx.log_url, ip),
        None => ctx.log_url.clone(),
    };
    format!(
        "{FAILURE_MARKER} Task Failed!\nDAG: {}\nTask: {}\nExecution Time: {}\nLog URL:\n{}",
        ctx.dag_id,
        ctx.task_id,
        format_execution_time(&ctx.execution_date, offset),
        log_url
    )
}

/// Replace a `localhost` host component with `ip`, keeping scheme, userinfo,
/// port, path and query. Any other URL is returned unchanged.
pub fn rewrite_loopback_host(url: &str, ip: IpAddr) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let authority_start = scheme_end + 3;
    let authority_end = url[authority_start..]
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .map_or(url.len(), |i| authority_start + i);

    let authority = &url[authority_start..authority_end];
    let host_start = authority.rfind('@').map_or(0, |i| i + 1);
    let host_and_port = &authority[host_start..];
    let host_len = if host_and_port.starts_with('[') {
        host_and_port.find(']').map_or(host_and_port.len(), |i| i + 1)
    } else {
        host_and_port.find(':').unwrap_or(host_and_port.len())
    };
    let host = &host_and_port[..host_len];

    if !host.eq_ignore_ascii_case(LOOPBACK_HOST) {
        return url.to_string();
    }

    let replacement = match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => format!("[{v6}]"),
    };
    let host_offset = authority_start + host_start;
    format!(
        "{}{}{}",
        &url[..host_offset],
        replacement,
        &url[host_offset + host_len..]
    )
}
