// src/lib.rs
// Public library surface for the `newscli` binary and integration tests.

pub mod client;
pub mod config;
pub mod models;
pub mod render;
pub mod repl;

// ---- Re-exports for stable public API ----
pub use crate::client::{ClientError, NewsClient, NewsSource};
pub use crate::config::{Args, Settings};
pub use crate::models::NewsItem;
pub use crate::repl::{run_session, SessionOptions, SessionSummary};
