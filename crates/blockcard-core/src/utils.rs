//! Shared helpers for card statistics and serialization.
//!
//! The card footer shows how many content blocks the graph holds and how
//! many days the user has been writing; these helpers compute both from
//! values the host query returns.

use crate::{Error, Result};
use chrono::{DateTime, Utc};

const MS_PER_DAY: f64 = 1000.0 * 60.0 * 60.0 * 24.0;

/// Block prefixes that do not count as written content.
const NON_CONTENT_PREFIXES: &[&str] = &["```", "{{", "<%", "> ", "[[>]] ", ":q "];

/// Whole days between two epoch-millisecond timestamps, rounded.
pub fn days_between(a_ms: i64, b_ms: i64) -> i64 {
    let diff = a_ms.abs_diff(b_ms) as f64;
    (diff / MS_PER_DAY).round() as i64
}

/// Days since the earliest page was created.
pub fn usage_days(first_created_ms: i64, now: DateTime<Utc>) -> i64 {
    days_between(now.timestamp_millis(), first_created_ms)
}

/// Whether a block counts as written content (not code, a component,
/// a template, a quote or a query).
pub fn is_content_block(text: &str) -> bool {
    !NON_CONTENT_PREFIXES.iter().any(|p| text.starts_with(p))
}

/// Count blocks that pass [`is_content_block`].
pub fn count_content_blocks<'a, I>(texts: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    texts.into_iter().filter(|t| is_content_block(t)).count()
}

/// Generic JSON serialization with consistent error handling
pub fn to_json_string<T: serde::Serialize + ?Sized>(
    data: &T,
    context: &str,
    pretty: bool,
) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(data)
    } else {
        serde_json::to_string(data)
    };
    rendered.map_err(|e| Error::other(format!("Failed to serialize {} as JSON: {}", context, e)))
}
