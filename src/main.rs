//! News agent CLI — binary entrypoint.
//! Resolves configuration, builds the client and runs the prompt (or a
//! one-shot query / health probe).

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use news_agent_cli::render::{render_error, render_items};
use news_agent_cli::repl::{dispatch, run_session, SessionOptions};
use news_agent_cli::{Args, NewsClient, Settings};

/// Logs go to stderr so stdout carries only prompts and results.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::from_cli();
    let settings = Settings::resolve(&args).context("invalid configuration")?;
    let client = NewsClient::new(&settings).context("building HTTP client")?;
    info!(base = %settings.base_url, limit = settings.limit, timeout = ?settings.timeout, "client ready");

    if args.health {
        return probe_health(&client).await;
    }

    if let Some(query) = args.one_shot_query() {
        return run_once(&client, &settings, &query).await;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(
        &client,
        SessionOptions::from(&settings),
        stdin.lock(),
        stdout.lock(),
    )
    .await?;
    Ok(ExitCode::SUCCESS)
}

async fn probe_health(client: &NewsClient) -> Result<ExitCode> {
    match client.health().await {
        Ok(h) => {
            println!("Service at {} is {}", client.base_url(), h.status);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            render_error(&mut io::stderr(), &e)?;
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run_once(client: &NewsClient, settings: &Settings, query: &str) -> Result<ExitCode> {
    let mut out = io::stdout().lock();
    let code = match dispatch(client, query, settings.limit, settings.request_timeout).await {
        Ok(items) => {
            render_items(&mut out, &items)?;
            ExitCode::SUCCESS
        }
        Err(e) => {
            render_error(&mut out, &e)?;
            ExitCode::FAILURE
        }
    };
    out.flush()?;
    Ok(code)
}
