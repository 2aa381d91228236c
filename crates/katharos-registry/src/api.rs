//! Wire types for the Hub and Registry v2 APIs.

use katharos_core::Tag;
use serde::{Deserialize, Serialize};

/// One page of the Hub tag listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagPage {
    /// Tags on this page.
    #[serde(default)]
    pub results: Vec<TagRecord>,

    /// URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
}

/// A tag entry as the Hub API reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagRecord {
    /// Tag name.
    pub name: String,

    /// Best-effort last-modified value; absent for some tags.
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl From<TagRecord> for Tag {
    fn from(record: TagRecord) -> Self {
        match record.last_updated {
            Some(last_updated) => Self::new(record.name).with_last_updated(last_updated),
            None => Self::new(record.name),
        }
    }
}

/// Response of the Registry v2 `tags/list` endpoint.
///
/// This API carries no timestamps; tags from this path are converted with
/// `last_updated` absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagListResponse {
    /// Repository name.
    pub name: String,

    /// Tag names; null when the repository has none.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl TagListResponse {
    /// Converts the listing into tag records without timestamps.
    #[must_use]
    pub fn into_tags(self) -> Vec<Tag> {
        self.tags
            .unwrap_or_default()
            .into_iter()
            .map(Tag::new)
            .collect()
    }
}

/// Response of the token service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token scoped to one repository.
    #[serde(default)]
    pub token: Option<String>,
}
