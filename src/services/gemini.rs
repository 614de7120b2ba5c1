//! Title and description generation with the Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::types::errors::MetadataError;
use crate::types::metadata::ContentSummary;
use crate::types::website::ContentType;

const UNTITLED: &str = "Untitled Content";
const NO_DESCRIPTION: &str = "No description available";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Generates a short title and description for a URL.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, url: &str, content_type: ContentType) -> Result<ContentSummary, MetadataError>;
}

/// Gemini client.
pub struct GeminiClient {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(endpoint: String, api_key: String, model: String, timeout_secs: u64) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            model,
            client: reqwest::Client::new(),
            timeout_secs,
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize)]
struct SummaryJson {
    title: Option<String>,
    description: Option<String>,
}

/// Prompt asking for a JSON `{title, description}` pair.
pub fn build_prompt(url: &str, content_type: ContentType) -> String {
    let (subject, title_hint, description_hint) = match content_type {
        ContentType::Youtube => (
            "YouTube video",
            "A concise, engaging title",
            "explaining what the video is about, key topics covered, and why someone might want to watch it",
        ),
        ContentType::Twitter => (
            "Twitter/X post",
            "A descriptive title that captures the essence of the tweet",
            "explaining the main point, context, or significance of the tweet",
        ),
        ContentType::Instagram => (
            "Instagram post",
            "A descriptive title for the Instagram post",
            "explaining what the post shows, its theme, or message",
        ),
        ContentType::Website | ContentType::Note => (
            "website",
            "A clear, descriptive title for this webpage",
            "explaining what the page is about, its main content, and value to readers",
        ),
    };

    format!(
        "Analyze this {subject} URL: {url}\n\n\
         Please provide:\n\
         1. {title_hint} (max 80 characters)\n\
         2. A description (2-3 sentences) {description_hint}.\n\n\
         Format your response as JSON:\n\
         {{\n  \"title\": \"Your title here\",\n  \"description\": \"Your description here\"\n}}"
    )
}

fn strip_quotes(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '\'')
}

/// Reads a model reply. The first `{...}` block is tried as JSON; otherwise
/// the first non-empty line is the title and the remaining lines the description.
pub fn parse_summary(text: &str) -> ContentSummary {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            if let Ok(parsed) = serde_json::from_str::<SummaryJson>(&text[start..=end]) {
                return ContentSummary {
                    title: parsed
                        .title
                        .filter(|t| !t.trim().is_empty())
                        .unwrap_or_else(|| UNTITLED.to_string()),
                    description: parsed
                        .description
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                };
            }
        }
    }

    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let title = lines.next().map(strip_quotes).unwrap_or_default();
    let rest = lines.collect::<Vec<_>>().join(" ");
    let description = strip_quotes(&rest);

    ContentSummary {
        title: if title.is_empty() { UNTITLED } else { title }.to_string(),
        description: if description.is_empty() { NO_DESCRIPTION } else { description }.to_string(),
    }
}

#[async_trait]
impl Summarizer for GeminiClient {
    async fn summarize(&self, url: &str, content_type: ContentType) -> Result<ContentSummary, MetadataError> {
        let endpoint = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(url, content_type) }] }]
        });

        let response = self
            .client
            .post(&endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(MetadataError::ProviderError(format!(
                "Gemini API returned {}: {}",
                status, detail
            )));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| MetadataError::ParseError(format!("Failed to parse Gemini response: {}", e.without_url())))?;

        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| MetadataError::ParseError("Gemini response has no text".to_string()))?;

        debug!(url = %url, model = %self.model, "gemini summary generated");
        Ok(parse_summary(&text))
    }
}
