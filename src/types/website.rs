use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::errors::WebsiteError;

/// Kind of content a saved entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Youtube,
    Twitter,
    Instagram,
    Website,
    Note,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Youtube,
        ContentType::Twitter,
        ContentType::Instagram,
        ContentType::Website,
        ContentType::Note,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Youtube => "youtube",
            ContentType::Twitter => "twitter",
            ContentType::Instagram => "instagram",
            ContentType::Website => "website",
            ContentType::Note => "note",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = WebsiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| WebsiteError::InvalidContentType(s.to_string()))
    }
}

/// A saved bookmark entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Website {
    pub id: String,
    pub owner_id: String,
    pub url: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub embed_id: Option<String>,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub view_count: i64,
    pub folder_id: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client input for creating (or replacing) a website.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebsite {
    #[serde(default)]
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub scheduled_for: Option<String>,
    pub folder_id: Option<String>,
    pub replace_id: Option<String>,
}

/// A fully resolved website row, ready to be inserted.
#[derive(Debug, Clone)]
pub struct WebsiteDraft {
    pub url: String,
    pub content_type: ContentType,
    pub embed_id: Option<String>,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub folder_id: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
}

/// Shallow partial update for a website.
///
/// `folder_id` and `scheduled_for` distinguish "absent" (outer `None`) from
/// an explicit JSON `null` (`Some(None)`), which clears the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteUpdate {
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
    #[serde(default, deserialize_with = "double_option")]
    pub embed_id: Option<Option<String>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
    pub view_count: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub scheduled_for: Option<Option<String>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

/// Which folder a website listing is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FolderScope {
    /// Websites with no folder.
    #[default]
    Root,
    /// Websites directly inside the given folder.
    Folder(String),
    /// No folder restriction.
    Any,
}

impl FolderScope {
    /// Interprets a `folderId` query value: absent or `"null"` is root,
    /// `"all"` lifts the restriction.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            None | Some("null") | Some("") => FolderScope::Root,
            Some("all") => FolderScope::Any,
            Some(id) => FolderScope::Folder(id.to_string()),
        }
    }
}

/// Filters applied by a website listing.
#[derive(Debug, Clone, Default)]
pub struct WebsiteFilter {
    pub content_type: Option<ContentType>,
    pub search: Option<String>,
    pub favorites_only: bool,
    pub folder: FolderScope,
}

impl WebsiteFilter {
    /// Case-insensitive substring match against title, description or any tag.
    pub fn matches_search(&self, website: &Website) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };
        website.title.to_lowercase().contains(&needle)
            || website.description.to_lowercase().contains(&needle)
            || website.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

/// Parses a client supplied reminder time.
///
/// Accepts RFC 3339, a `datetime-local` style value (read as UTC) or a bare
/// date. Blank input means no reminder.
pub fn parse_scheduled_for(raw: &str) -> Result<Option<DateTime<Utc>>, WebsiteError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(Some(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(naive.and_utc()));
        }
    }
    Err(WebsiteError::InvalidSchedule(raw.to_string()))
}
