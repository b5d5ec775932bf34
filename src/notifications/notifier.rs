use chrono::FixedOffset;
use std::sync::Arc;
use tracing::warn;

use super::channel::{LogChannel, MessageChannel, TelegramChannel, TelegramDestination};
use super::ip::{CachedIpResolver, HttpIpResolver, IpResolver, StaticIpResolver};
use super::message::{failure_message, success_message};
use super::ExecutionContext;
use crate::config::NotificationConfig;
use crate::error::{Result, WorkflowError};
use crate::logging::log_notification;

/// Result of a best-effort dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DispatchOutcome::Sent)
    }
}

/// The two lifecycle hooks the host scheduler invokes
///
/// Dispatch errors are logged and returned as [`DispatchOutcome::Failed`]; they
/// never change the state of the task that triggered them.
pub struct Notifier {
    channel: Arc<dyn MessageChannel>,
    destination_id: String,
    offset: FixedOffset,
    ip_resolver: CachedIpResolver,
}

impl Notifier {
    pub fn new(
        channel: Arc<dyn MessageChannel>,
        destination_id: impl Into<String>,
        offset: FixedOffset,
        ip_resolver: Arc<dyn IpResolver>,
    ) -> Self {
        Self {
            channel,
            destination_id: destination_id.into(),
            offset,
            ip_resolver: CachedIpResolver::new(ip_resolver),
        }
    }

    /// Telegram when credentials are configured, the log channel otherwise.
    /// No network call is made here.
    pub fn from_config(config: &NotificationConfig) -> Result<Self> {
        let channel: Arc<dyn MessageChannel> =
            match (&config.telegram_bot_token, &config.telegram_chat_id) {
                (Some(bot_token), Some(chat_id)) => Arc::new(
                    TelegramChannel::new(&config.telegram_api_base).with_destination(
                        config.destination_id.clone(),
                        TelegramDestination {
                            bot_token: bot_token.clone(),
                            chat_id: chat_id.clone(),
                        },
                    ),
                ),
                _ => {
                    warn!("Telegram credentials not configured; notifications go to the log");
                    Arc::new(LogChannel)
                }
            };

        let resolver: Arc<dyn IpResolver> = match &config.public_ip {
            Some(ip) => Arc::new(StaticIpResolver(ip.parse().map_err(|_| {
                WorkflowError::ConfigurationError(format!("invalid notifications.public_ip: {ip}"))
            })?)),
            None => Arc::new(HttpIpResolver::new(
                config.ip_lookup_url.clone(),
                config.ip_lookup_timeout(),
            )?),
        };

        Ok(Self::new(
            channel,
            config.destination_id.clone(),
            config.utc_offset()?,
            resolver,
        ))
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    pub fn success_message(&self, ctx: &ExecutionContext) -> String {
        success_message(ctx, self.offset)
    }

    /// Resolves the public IP on first use; without it the log URL is sent as is.
    pub async fn failure_message(&self, ctx: &ExecutionContext) -> String {
        let ip = match self.ip_resolver.resolve().await {
            Ok(ip) => Some(ip),
            Err(e) => {
                warn!(error = %e, "Public IP unavailable; sending log URL unchanged");
                None
            }
        };
        failure_message(ctx, self.offset, ip)
    }

    /// Graph-level success hook
    pub async fn on_success(&self, ctx: &ExecutionContext) -> DispatchOutcome {
        let body = self.success_message(ctx);
        self.dispatch("success", ctx, &body).await
    }

    /// Per-task failure hook
    pub async fn on_failure(&self, ctx: &ExecutionContext) -> DispatchOutcome {
        let body = self.failure_message(ctx).await;
        self.dispatch("failure", ctx, &body).await
    }

    async fn dispatch(&self, kind: &str, ctx: &ExecutionContext, body: &str) -> DispatchOutcome {
        match self.channel.send(&self.destination_id, body).await {
            Ok(()) => {
                log_notification(kind, &ctx.dag_id, Some(&ctx.task_id), "sent");
                DispatchOutcome::Sent
            }
            Err(e) => {
                warn!(kind, channel = self.channel.name(), error = %e, "Notification dispatch failed");
                log_notification(kind, &ctx.dag_id, Some(&ctx.task_id), "failed");
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}
