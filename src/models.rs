// src/models.rs
//! Wire records exchanged with the news agent service.

use serde::{Deserialize, Deserializer, Serialize};

/// Request body for `POST /news`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsQuery {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl NewsQuery {
    /// Non-positive limits are dropped so the service applies its own default.
    pub fn new(query: impl Into<String>, limit: i64) -> Self {
        Self {
            query: query.into(),
            limit: (limit > 0).then_some(limit),
        }
    }
}

/// One processed article as returned by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    /// ISO-8601 as sent by the service; parsed only for display.
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

impl NewsItem {
    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or_default()
    }

    pub fn score(&self) -> f64 {
        self.sentiment_score.unwrap_or(0.0)
    }

    /// Summary when present, else the excerpt. Empty strings count as absent.
    pub fn body(&self) -> Option<TextBody<'_>> {
        non_empty(&self.summary)
            .map(TextBody::Summary)
            .or_else(|| non_empty(&self.excerpt).map(TextBody::Excerpt))
    }

    pub fn link(&self) -> Option<&str> {
        non_empty(&self.url)
    }
}

/// Which text field a rendered item shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBody<'a> {
    Summary(&'a str),
    Excerpt(&'a str),
}

/// Error body sent with status >= 400: `{"error": "...", "detail": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ServiceErrorBody {
    /// `(code, detail)` when the body names an error code.
    pub fn into_parts(self) -> Option<(String, Option<String>)> {
        let code = self.error.filter(|c| !c.is_empty())?;
        let detail = self.detail.filter(|d| !d.is_empty());
        Some((code, detail))
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

fn null_as_empty<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}
