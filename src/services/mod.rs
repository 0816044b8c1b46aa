pub mod comments;
pub mod error;
pub mod fixtures;
pub mod pages;
pub mod posts;
pub mod serialize;
pub mod slug;
pub mod tags;
pub mod users;

pub use error::BlogError;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

/// Parses an RFC 3339 timestamp (or takes the current time) and returns it
/// in the UTC form stored in the database, which sorts lexicographically.
pub fn normalize_timestamp(value: Option<&str>) -> Result<String> {
    let timestamp = match value {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid RFC 3339 timestamp '{}'", raw))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    Ok(timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
}
