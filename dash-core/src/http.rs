use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Request};

use crate::{
    cache::ResponseCache,
    error::{DashboardError, Result},
    retry::RetryPolicy,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared GET plumbing for the providers: bounded timeout, transport retries and an optional
/// response cache.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retry: RetryPolicy,
    cache: Option<Arc<ResponseCache>>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| DashboardError::InvalidRequest(format!("cannot build HTTP client: {e}")))?;

        Ok(Self { client, retry, cache: None })
    }

    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Send `request` and return the body of a 2xx response.
    pub async fn fetch_text(&self, provider: &'static str, request: Request) -> Result<String> {
        let key = request.url().to_string();

        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(&key, Utc::now()) {
                return Ok(body);
            }
        }

        tracing::debug!("GET {}", key);

        let request = &request;
        let body = self
            .retry
            .run(move || async move {
                let attempt = request.try_clone().ok_or_else(|| {
                    DashboardError::InvalidRequest(format!("request to {provider} is not cloneable"))
                })?;
                self.send_once(provider, attempt).await
            })
            .await?;

        if let Some(cache) = &self.cache {
            cache.put(&key, &body, Utc::now());
        }

        Ok(body)
    }

    async fn send_once(&self, provider: &'static str, request: Request) -> Result<String> {
        let res = self
            .client
            .execute(request)
            .await
            .map_err(|source| DashboardError::Transport { provider, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| DashboardError::Transport { provider, source })?;

        if !status.is_success() {
            return Err(DashboardError::HttpStatus { provider, status, body: truncate_body(&body) });
        }

        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_respects_char_boundaries() {
        assert_eq!(truncate_body("short"), "short");

        let long = "é".repeat(250);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }
}
