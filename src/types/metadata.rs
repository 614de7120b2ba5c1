use serde::{Deserialize, Serialize};

use super::website::ContentType;

/// Placeholder image for content without a usable thumbnail.
pub const PLACEHOLDER_THUMBNAIL: &str = "/placeholder.svg?height=200&width=300";

/// Result of classifying a URL without any network access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlAnalysis {
    pub content_type: ContentType,
    pub embed_id: Option<String>,
}

/// Everything the enrichment pipeline resolves for a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteMetadata {
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub embed_id: Option<String>,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

/// Page metadata extracted from a screenshot/metadata API response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
}

/// A generated title/description pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub title: String,
    pub description: String,
}

/// Metadata returned to the client by the preview endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataPreview {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
}

impl From<WebsiteMetadata> for MetadataPreview {
    fn from(meta: WebsiteMetadata) -> Self {
        Self {
            title: meta.title,
            description: meta.description,
            thumbnail: meta.thumbnail,
            content_type: meta.content_type,
            author: meta.author,
            publisher: meta.publisher,
        }
    }
}
