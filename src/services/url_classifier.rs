//! Offline URL classification: content type, embed id and the fallback
//! title, description and thumbnail for each type.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::types::metadata::{UrlAnalysis, PLACEHOLDER_THUMBNAIL};
use crate::types::website::ContentType;

const MICROLINK_SCREENSHOT_BASE: &str = "https://api.microlink.io/";

/// Tweet id in a status path.
static TWEET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/status/(\d+)").expect("fail to create the tweet id regex"));

/// Post shortcode in an Instagram path.
static INSTAGRAM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/p/([^/]+)").expect("fail to create the instagram post regex"));

/// True when `host` is `domain` or one of its subdomains.
fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Classifies `raw` by host. Text that is not an absolute http(s) URL is a note.
pub fn analyze_url(raw: &str) -> UrlAnalysis {
    let parsed = match Url::parse(raw.trim()) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => u,
        _ => {
            return UrlAnalysis {
                content_type: ContentType::Note,
                embed_id: None,
            }
        }
    };
    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let path = parsed.path();

    if host_matches(&host, "youtu.be") {
        return UrlAnalysis {
            content_type: ContentType::Youtube,
            embed_id: non_empty(path.trim_start_matches('/')),
        };
    }
    if host_matches(&host, "youtube.com") {
        let video = parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .and_then(|(_, v)| non_empty(&v));
        return UrlAnalysis {
            content_type: ContentType::Youtube,
            embed_id: video,
        };
    }
    if host_matches(&host, "twitter.com") || host_matches(&host, "x.com") {
        return UrlAnalysis {
            content_type: ContentType::Twitter,
            embed_id: TWEET_PATTERN
                .captures(path)
                .map(|c| c[1].to_string()),
        };
    }
    if host_matches(&host, "instagram.com") {
        return UrlAnalysis {
            content_type: ContentType::Instagram,
            embed_id: INSTAGRAM_PATTERN
                .captures(path)
                .map(|c| c[1].to_string()),
        };
    }

    UrlAnalysis {
        content_type: ContentType::Website,
        embed_id: None,
    }
}

pub fn default_title(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Youtube => "YouTube Video",
        ContentType::Twitter => "Twitter Post",
        ContentType::Instagram => "Instagram Post",
        ContentType::Website => "Website",
        ContentType::Note => "Note",
    }
}

pub fn default_description(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Youtube => "Video content from YouTube",
        ContentType::Twitter => "Post from Twitter/X",
        ContentType::Instagram => "Post from Instagram",
        ContentType::Website => "Web content",
        ContentType::Note => "Saved note",
    }
}

/// Screenshot image URL served by Microlink for `url`.
pub fn screenshot_url(url: &str) -> String {
    format!(
        "{}?url={}&screenshot=true&meta=false&embed=screenshot.url",
        MICROLINK_SCREENSHOT_BASE,
        urlencoding::encode(url)
    )
}

/// Thumbnail that needs no network round trip.
pub fn default_thumbnail(url: &str, analysis: &UrlAnalysis) -> String {
    match (analysis.content_type, analysis.embed_id.as_deref()) {
        (ContentType::Youtube, Some(id)) => {
            format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", id)
        }
        (ContentType::Website, _) => screenshot_url(url),
        _ => PLACEHOLDER_THUMBNAIL.to_string(),
    }
}
