// src/render.rs
//! Terminal presentation of query results.

use std::fmt::Display;
use std::io::{self, Write};

use chrono::{DateTime, Local, TimeZone};

use crate::models::{NewsItem, TextBody};

const PUBLISHED_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Write every item as a numbered block, or the empty-result notice.
pub fn render_items<W: Write>(out: &mut W, items: &[NewsItem]) -> io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "No articles found.");
    }
    for (idx, item) in items.iter().enumerate() {
        render_item(out, idx + 1, item)?;
    }
    Ok(())
}

fn render_item<W: Write>(out: &mut W, number: usize, item: &NewsItem) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "[{number}] {}", item.title)?;
    writeln!(out, "    Source: {}", item.source())?;
    let published = format_published(item.published_at.as_deref().unwrap_or_default());
    if !published.is_empty() {
        writeln!(out, "    Published: {published}")?;
    }
    writeln!(
        out,
        "    Sentiment: {} ({:.2})",
        format_sentiment(item.sentiment.as_deref().unwrap_or_default()),
        item.score()
    )?;
    match item.body() {
        Some(TextBody::Summary(s)) => writeln!(out, "    Summary: {s}")?,
        Some(TextBody::Excerpt(s)) => writeln!(out, "    Excerpt: {s}")?,
        None => {}
    }
    if let Some(url) = item.link() {
        writeln!(out, "    URL: {url}")?;
    }
    Ok(())
}

/// Single-line failure report.
pub fn render_error<W: Write, E: Display + ?Sized>(out: &mut W, err: &E) -> io::Result<()> {
    writeln!(out, "Error: {err}")
}

/// `"POSITIVE"` -> `"Positive"`; blank -> `"Unknown"`.
pub fn format_sentiment(label: &str) -> String {
    let mut chars = label.trim().chars();
    match chars.next() {
        None => "Unknown".to_string(),
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
    }
}

/// RFC 3339 timestamps are shown in the local zone; anything else is returned as is.
pub fn format_published(value: &str) -> String {
    format_published_in(value, &Local)
}

pub fn format_published_in<Tz>(value: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if value.is_empty() {
        return String::new();
    }
    match DateTime::parse_from_rfc3339(value) {
        Ok(ts) => ts
            .with_timezone(tz)
            .format(PUBLISHED_FORMAT)
            .to_string(),
        Err(_) => value.to_string(),
    }
}
