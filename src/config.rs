// src/config.rs
//! Command-line flags and the settings resolved from them.
//!
//! Priority for every value: explicit flag, then environment, then default.
//! Only the base URL has an environment source (`NEWS_AGENT_BASE_URL`).

use std::ffi::OsString;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use reqwest::Url;

pub const ENV_BASE_URL: &str = "NEWS_AGENT_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8008";
pub const DEFAULT_LIMIT: i64 = 5;
pub const DEFAULT_TIMEOUT: &str = "10s";

/// Query the news agent service from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "newscli")]
#[command(about = "Interactive client for the news agent service")]
#[command(version)]
pub struct Args {
    /// News agent base URL (default: $NEWS_AGENT_BASE_URL, else http://localhost:8008)
    #[arg(long, value_name = "URL")]
    pub base: Option<String>,

    /// Maximum articles to request per query (<= 0 lets the service decide)
    #[arg(long, default_value_t = DEFAULT_LIMIT, allow_negative_numbers = true)]
    pub limit: i64,

    /// HTTP client timeout, e.g. 10s, 1500ms, 1m30s
    #[arg(long, default_value = DEFAULT_TIMEOUT, value_parser = parse_duration)]
    pub timeout: Duration,

    /// Per-query bound (defaults to --timeout)
    #[arg(long = "request-timeout", value_parser = parse_duration)]
    pub request_timeout: Option<Duration>,

    /// Probe GET /health and exit
    #[arg(long)]
    pub health: bool,

    /// Run this single query and exit instead of starting the prompt
    #[arg(value_name = "QUERY", trailing_var_arg = true)]
    pub query: Vec<String>,
}

impl Args {
    /// Parse `std::env::args_os()`, accepting `-base` as well as `--base`.
    pub fn from_cli() -> Self {
        Self::parse_from(normalize_flag_args(std::env::args_os()))
    }

    /// Positional words joined into one query, if any were given.
    pub fn one_shot_query(&self) -> Option<String> {
        let q = self.query.join(" ");
        let q = q.trim();
        (!q.is_empty()).then(|| q.to_string())
    }
}

/// Fully resolved configuration handed to the client and the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Without trailing slash.
    pub base_url: String,
    pub limit: i64,
    /// Transport-level timeout on the HTTP client.
    pub timeout: Duration,
    /// Bound of the cancellation scope around each query.
    pub request_timeout: Duration,
}

impl Settings {
    pub fn resolve(args: &Args) -> Result<Self> {
        Self::resolve_with(args, |key| std::env::var(key).ok())
    }

    /// Same as [`Settings::resolve`] with an explicit environment lookup.
    pub fn resolve_with<F>(args: &Args, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base = args
            .base
            .clone()
            .filter(|b| !b.trim().is_empty())
            .or_else(|| {
                env(ENV_BASE_URL)
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = normalize_base_url(&raw_base)?;

        if args.timeout.is_zero() {
            bail!("timeout must be greater than zero");
        }
        let request_timeout = args.request_timeout.unwrap_or(args.timeout);
        if request_timeout.is_zero() {
            bail!("request timeout must be greater than zero");
        }

        Ok(Self {
            base_url,
            limit: args.limit,
            timeout: args.timeout,
            request_timeout,
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("base URL is empty");
    }
    let url = Url::parse(trimmed).with_context(|| format!("invalid base URL {raw:?}"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => bail!("base URL must use http or https, got {other:?}"),
    }
    if url.host_str().is_none() {
        bail!("base URL {raw:?} has no host");
    }
    Ok(trimmed.to_string())
}

/// Rewrite Go-style `-name` / `-name=value` flags into `--name` so clap takes
/// them. Short flags (`-h`), negative numbers and anything after `--` pass
/// through untouched.
pub fn normalize_flag_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut out = Vec::new();
    let mut passthrough = false;
    for (i, arg) in args.into_iter().enumerate() {
        let arg: OsString = arg.into();
        if i == 0 || passthrough {
            out.push(arg);
            continue;
        }
        let rewritten = match arg.to_str() {
            Some("--") => {
                passthrough = true;
                None
            }
            Some(s) if is_single_dash_long(s) => Some(OsString::from(format!("-{s}"))),
            _ => None,
        };
        out.push(rewritten.unwrap_or(arg));
    }
    out
}

fn is_single_dash_long(s: &str) -> bool {
    let Some(rest) = s.strip_prefix('-') else {
        return false;
    };
    let name = rest.split('=').next().unwrap_or_default();
    !rest.starts_with('-')
        && name.len() > 1
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
}

/// Parse a Go-style duration such as `10s`, `250ms`, `1.5s` or `1h2m3s`.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    parse_duration_inner(input.trim()).map_err(|e| e.to_string())
}

fn parse_duration_inner(s: &str) -> Result<Duration> {
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        bail!("empty duration");
    }
    if s.starts_with('-') {
        bail!("duration {s:?} is negative");
    }
    let s_unsigned = s.strip_prefix('+').unwrap_or(s);

    let mut nanos = 0f64;
    let mut rest = s_unsigned;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| anyhow!("missing unit in duration {s:?}"))?;
        if num_len == 0 {
            bail!("invalid duration {s:?}");
        }
        let value: f64 = rest[..num_len]
            .parse()
            .with_context(|| format!("invalid number in duration {s:?}"))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "\u{b5}s" | "\u{3bc}s" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            other => bail!("unknown unit {other:?} in duration {s:?}"),
        };
        nanos += value * per_unit;
        rest = &rest[unit_len..];
    }
    let nanos = nanos.round();
    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        bail!("duration {s:?} out of range");
    }
    Ok(Duration::from_nanos(nanos as u64))
}
