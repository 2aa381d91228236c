//! Tag input records.
//!
//! A [`Tag`] is the immutable unit of work for the retention engine: a name
//! plus a best-effort last-modified value as returned by the hosting
//! service. Timestamp parsing is deferred to evaluation time so that the
//! absent-versus-malformed distinction can be applied per tag.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Age assumed for tags that carry no last-modified value at all.
///
/// A missing timestamp makes the tag eligible for deletion consideration
/// rather than exempt from it.
const ASSUMED_AGE_DAYS: i64 = 365;

/// Wire timestamps are truncated to this many characters before parsing.
const TIMESTAMP_PREFIX_LEN: usize = 19;

/// An image tag as reported by the hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name (e.g., `pr-42`, `v1.2.3`).
    pub name: String,

    /// Raw last-modified value, if the listing API provided one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl Tag {
    /// Creates a tag with no last-modified value.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_updated: None,
        }
    }

    /// Sets the raw last-modified value.
    #[must_use]
    pub fn with_last_updated(mut self, last_updated: impl Into<String>) -> Self {
        self.last_updated = Some(last_updated.into());
        self
    }

    /// Resolves the tag's last-modified instant.
    ///
    /// Values are truncated to `YYYY-MM-DDThh:mm:ss` before parsing, which
    /// accepts both plain ISO timestamps and the fractional-second `Z`
    /// suffixed form the hosting service emits. An absent or empty value
    /// resolves to [`ASSUMED_AGE_DAYS`] before `now`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTimestamp`] if a value is present but
    /// cannot be parsed. Callers must treat that as a local, non-fatal
    /// condition: keep the tag and warn, never delete it.
    pub fn last_modified(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        let Some(raw) = self.last_updated.as_deref().filter(|s| !s.is_empty()) else {
            return Ok(now - Duration::days(ASSUMED_AGE_DAYS));
        };

        let prefix = raw.get(..TIMESTAMP_PREFIX_LEN).ok_or_else(|| {
            Error::MalformedTimestamp {
                value: raw.to_string(),
            }
        })?;

        NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S")
            .map(|naive| naive.and_utc())
            .map_err(|_| Error::MalformedTimestamp {
                value: raw.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_plain_timestamp() {
        let tag = Tag::new("pr-42").with_last_updated("2024-03-01T08:30:00");
        let parsed = tag.last_modified(fixed_now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_with_fractional_seconds() {
        let tag = Tag::new("pr-42").with_last_updated("2024-03-01T08:30:00.123456Z");
        let parsed = tag.last_modified(fixed_now()).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_absent_timestamp_assumed_old() {
        let tag = Tag::new("pr-42");
        let parsed = tag.last_modified(fixed_now()).unwrap();
        assert_eq!(parsed, fixed_now() - Duration::days(ASSUMED_AGE_DAYS));
    }

    #[test]
    fn test_empty_timestamp_assumed_old() {
        let tag = Tag::new("pr-42").with_last_updated("");
        let parsed = tag.last_modified(fixed_now()).unwrap();
        assert_eq!(parsed, fixed_now() - Duration::days(ASSUMED_AGE_DAYS));
    }

    #[test]
    fn test_malformed_timestamp_is_error() {
        let tag = Tag::new("pr-42").with_last_updated("not-a-timestamp-at-all");
        let result = tag.last_modified(fixed_now());
        assert!(matches!(result, Err(Error::MalformedTimestamp { .. })));
    }

    #[test]
    fn test_short_timestamp_is_error() {
        let tag = Tag::new("pr-42").with_last_updated("2024-03");
        let result = tag.last_modified(fixed_now());
        assert!(matches!(result, Err(Error::MalformedTimestamp { .. })));
    }

    #[test]
    fn test_tag_serialization_skips_absent_timestamp() {
        let tag = Tag::new("latest");
        let json = serde_json::to_string(&tag).unwrap();
        assert!(!json.contains("last_updated"));
    }
}
