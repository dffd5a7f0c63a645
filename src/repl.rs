// src/repl.rs
//! Read one line, dispatch it, render the answer, repeat.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use tracing::{debug, info};

use crate::client::{ClientError, NewsSource};
use crate::models::NewsItem;
use crate::render::{render_error, render_items};

const PROMPT: &str = "\n> ";

/// Per-session knobs taken from `Settings`.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub limit: i64,
    pub request_timeout: Duration,
}

impl From<&crate::config::Settings> for SessionOptions {
    fn from(s: &crate::config::Settings) -> Self {
        Self {
            limit: s.limit,
            request_timeout: s.request_timeout,
        }
    }
}

/// Counters reported when the session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub queries: usize,
    pub failures: usize,
}

/// One query inside its own timeout scope. The scope ends when this returns,
/// so an expired query never affects the next one.
pub async fn dispatch<S>(
    source: &S,
    text: &str,
    limit: i64,
    bound: Duration,
) -> Result<Vec<NewsItem>, ClientError>
where
    S: NewsSource + ?Sized,
{
    match tokio::time::timeout(bound, source.query(text, limit)).await {
        Ok(res) => res,
        Err(_) => Err(ClientError::Timeout(bound)),
    }
}

fn is_exit_keyword(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Drive the prompt until `exit`/`quit` or end of input. Query failures are
/// rendered inline; only I/O errors on the streams end the session early.
pub async fn run_session<S, R, W>(
    source: &S,
    opts: SessionOptions,
    mut input: R,
    mut output: W,
) -> io::Result<SessionSummary>
where
    S: NewsSource + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();

    writeln!(output, "News Agent CLI connected to {}", source.endpoint())?;
    writeln!(
        output,
        "Type your query and press enter. Type 'exit' or 'quit' to leave."
    )?;

    let mut buf = Vec::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        // Invalid UTF-8 is replaced, not rejected.
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            writeln!(output)?;
            debug!("end of input");
            break;
        }

        let line = String::from_utf8_lossy(&buf);
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if is_exit_keyword(query) {
            debug!("exit keyword");
            break;
        }

        summary.queries += 1;
        match dispatch(source, query, opts.limit, opts.request_timeout).await {
            Ok(items) => render_items(&mut output, &items)?,
            Err(e) => {
                summary.failures += 1;
                debug!(error = ?e, transport = e.is_transport(), "query failed");
                render_error(&mut output, &e)?;
            }
        }
        output.flush()?;
    }

    info!(
        queries = summary.queries,
        failures = summary.failures,
        "session finished"
    );
    Ok(summary)
}
