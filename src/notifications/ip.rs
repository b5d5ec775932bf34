//! Public IP resolution for log URLs.
//!
//! Resolution happens on the first failure notification, never while the
//! graph is built, and a successful answer is kept for the process lifetime.

use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::{Result, WorkflowError};

#[async_trait]
pub trait IpResolver: Send + Sync {
    async fn resolve(&self) -> Result<IpAddr>;
}

/// Asks a "what is my IP" endpoint that answers with the bare address
pub struct HttpIpResolver {
    url: String,
    client: reqwest::Client,
}

impl HttpIpResolver {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WorkflowError::IpLookupError(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| WorkflowError::IpLookupError(format!("{}: {e}", self.url)))?;

        let body = response
            .text()
            .await
            .map_err(|e| WorkflowError::IpLookupError(e.to_string()))?;

        body.trim().parse().map_err(|_| {
            WorkflowError::IpLookupError(format!("not an IP address: {:?}", body.trim()))
        })
    }
}

/// Always answers with the same address
#[derive(Debug, Clone, Copy)]
pub struct StaticIpResolver(pub IpAddr);

#[async_trait]
impl IpResolver for StaticIpResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        Ok(self.0)
    }
}

/// Memoizes the first successful resolution; failures are retried next time
pub struct CachedIpResolver {
    inner: Arc<dyn IpResolver>,
    cached: OnceCell<IpAddr>,
}

impl CachedIpResolver {
    pub fn new(inner: Arc<dyn IpResolver>) -> Self {
        Self {
            inner,
            cached: OnceCell::new(),
        }
    }

    pub fn cached(&self) -> Option<IpAddr> {
        self.cached.get().copied()
    }
}

#[async_trait]
impl IpResolver for CachedIpResolver {
    async fn resolve(&self) -> Result<IpAddr> {
        let ip = self
            .cached
            .get_or_try_init(|| async {
                debug!("Resolving public IP");
                self.inner.resolve().await
            })
            .await?;
        Ok(*ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Flaky {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl IpResolver for Flaky {
        async fn resolve(&self) -> Result<IpAddr> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(WorkflowError::IpLookupError("timeout".into()))
            } else {
                Ok("198.51.100.4".parse().unwrap())
            }
        }
    }

    #[tokio::test]
    async fn test_http_resolver_trims_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7\n"))
            .mount(&server)
            .await;

        let resolver = HttpIpResolver::new(server.uri(), Duration::from_secs(5)).unwrap();
        assert_eq!(
            resolver.resolve().await.unwrap(),
            "203.0.113.7".parse::<IpAddr>().unwrap()
        );
    }

    #[tokio::test]
    async fn test_http_resolver_rejects_garbage() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let resolver = HttpIpResolver::new(server.uri(), Duration::from_secs(5)).unwrap();
        assert!(matches!(
            resolver.resolve().await,
            Err(WorkflowError::IpLookupError(_))
        ));
    }

    #[tokio::test]
    async fn test_http_resolver_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let resolver = HttpIpResolver::new(server.uri(), Duration::from_secs(5)).unwrap();
        assert!(resolver.resolve().await.is_err());
    }

    #[tokio::test]
    async fn test_cache_is_lazy_and_skips_failures() {
        let flaky = Arc::new(Flaky {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedIpResolver::new(flaky.clone());
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 0);
        assert!(cached.cached().is_none());

        assert!(cached.resolve().await.is_err());
        let ip = cached.resolve().await.unwrap();
        assert_eq!(cached.resolve().await.unwrap(), ip);
        assert_eq!(cached.cached(), Some(ip));
        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
    }
}
