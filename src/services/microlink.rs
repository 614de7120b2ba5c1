//! Page metadata from the Microlink API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::types::errors::MetadataError;
use crate::types::metadata::PageMetadata;

/// Source of title, description and byline for a web page.
#[async_trait]
pub trait PageMetadataSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<PageMetadata, MetadataError>;
}

#[derive(Deserialize)]
struct MicrolinkResponse {
    status: String,
    #[serde(default)]
    data: Option<MicrolinkData>,
}

#[derive(Deserialize)]
struct MicrolinkData {
    title: Option<String>,
    description: Option<String>,
    author: Option<String>,
    publisher: Option<String>,
}

/// Microlink client.
pub struct MicrolinkClient {
    endpoint: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl MicrolinkClient {
    pub fn new(endpoint: String, timeout_secs: u64) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            timeout_secs,
        }
    }
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Converts a Microlink body into page metadata. A non-success status is an error.
fn extract_metadata(body: MicrolinkResponse) -> Result<PageMetadata, MetadataError> {
    if body.status != "success" {
        return Err(MetadataError::ProviderError(format!(
            "Microlink status {}",
            body.status
        )));
    }
    let data = body
        .data
        .ok_or_else(|| MetadataError::ParseError("Microlink response has no data".to_string()))?;

    Ok(PageMetadata {
        title: filled(data.title),
        description: filled(data.description),
        author: filled(data.author),
        publisher: filled(data.publisher),
    })
}

#[async_trait]
impl PageMetadataSource for MicrolinkClient {
    async fn fetch(&self, url: &str) -> Result<PageMetadata, MetadataError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("url", url)])
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(Duration::from_secs(self.timeout_secs))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MetadataError::ProviderError(format!(
                "Microlink API returned {}",
                response.status()
            )));
        }

        let body: MicrolinkResponse = response
            .json()
            .await
            .map_err(|e| MetadataError::ParseError(format!("Failed to parse Microlink response: {}", e)))?;
        debug!(url = %url, status = %body.status, "microlink metadata fetched");
        extract_metadata(body)
    }
}
