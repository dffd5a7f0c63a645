// src/client.rs
//! HTTP client for the news agent service.
//!
//! One request per call, no retries and no caching. Every outcome is either a
//! complete item list or exactly one [`ClientError`].

use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::models::{HealthStatus, NewsItem, NewsQuery, ServiceErrorBody};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection failure, transport-level timeout or a broken body stream.
    #[error("{}", with_causes(.0))]
    Transport(#[from] reqwest::Error),
    /// The per-query bound expired before the service answered.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// Failure reported by the service itself.
    #[error("{code}{}", detail_suffix(.detail))]
    Service {
        code: String,
        detail: Option<String>,
    },
    /// Status >= 400 without a recognizable error body.
    #[error("agent returned status {0}")]
    UnexpectedStatus(String),
    /// Success status, but the body is not what the endpoint promises.
    #[error("malformed response: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl ClientError {
    /// Network-side failures, as opposed to anything the service answered.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_))
    }
}

/// `outer: cause: root cause`, since reqwest only prints its own context.
fn with_causes(err: &reqwest::Error) -> String {
    let mut msg = err.to_string();
    let mut cause = err.source();
    while let Some(c) = cause {
        let text = c.to_string();
        if !msg.ends_with(&text) {
            msg.push_str(": ");
            msg.push_str(&text);
        }
        cause = c.source();
    }
    msg
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail.as_deref() {
        Some(d) if !d.is_empty() => format!(": {d}"),
        _ => String::new(),
    }
}

/// Anything that can answer a news query. The interactive loop only sees this.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn query(&self, text: &str, limit: i64) -> Result<Vec<NewsItem>, ClientError>;

    /// Base URL shown in the banner.
    fn endpoint(&self) -> &str;
}

pub struct NewsClient {
    base_url: String,
    http: Client,
}

impl NewsClient {
    pub fn new(settings: &Settings) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("newscli/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST {base}/news`.
    pub async fn query(&self, text: &str, limit: i64) -> Result<Vec<NewsItem>, ClientError> {
        let url = format!("{}/news", self.base_url);
        let body = NewsQuery::new(text, limit);
        debug!(%url, limit = ?body.limit, "dispatching news query");

        let resp = self.http.post(&url).json(&body).send().await?;
        // A JSON `null` list is an empty result.
        let items = decode::<Option<Vec<NewsItem>>>(resp)
            .await?
            .unwrap_or_default();
        debug!(count = items.len(), "news query answered");
        Ok(items)
    }

    /// `GET {base}/health`.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = format!("{}/health", self.base_url);
        debug!(%url, "probing service health");
        let resp = self.http.get(&url).send().await?;
        decode(resp).await
    }
}

#[async_trait]
impl NewsSource for NewsClient {
    async fn query(&self, text: &str, limit: i64) -> Result<Vec<NewsItem>, ClientError> {
        NewsClient::query(self, text, limit).await
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    let data = resp.bytes().await?;
    debug!(%status, bytes = data.len(), "response received");

    if status.as_u16() >= 400 {
        return Err(classify_failure(status, &data));
    }
    serde_json::from_slice(&data).map_err(ClientError::Malformed)
}

fn classify_failure(status: StatusCode, data: &[u8]) -> ClientError {
    let parsed = serde_json::from_slice::<ServiceErrorBody>(data)
        .ok()
        .and_then(ServiceErrorBody::into_parts);
    match parsed {
        Some((code, detail)) => {
            warn!(%status, %code, "service reported an error");
            ClientError::Service { code, detail }
        }
        None => ClientError::UnexpectedStatus(status.to_string()),
    }
}
