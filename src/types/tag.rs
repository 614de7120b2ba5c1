use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Colour given to tags created through the tag endpoint without one.
pub const DEFAULT_TAG_COLOR: &str = "#3b82f6";

/// Maximum number of tags returned by a listing.
pub const TAG_LIST_LIMIT: i64 = 50;

/// A user's tag and how many times it has been attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub color: String,
    pub usage_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trims and lowercases a raw tag name. Returns `None` for blank input.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
