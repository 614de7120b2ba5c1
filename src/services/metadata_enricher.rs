//! Metadata enrichment: classification plus remote title and description
//! lookup, degrading to per-type defaults whenever a provider fails.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::gemini::{GeminiClient, Summarizer};
use super::microlink::{MicrolinkClient, PageMetadataSource};
use super::url_classifier::{analyze_url, default_description, default_thumbnail, default_title};
use crate::types::metadata::{ContentSummary, PageMetadata, WebsiteMetadata};
use crate::types::settings::EnrichmentSettings;
use crate::types::website::ContentType;

/// Resolves a URL into everything needed to store it. Never fails.
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    async fn resolve(
        &self,
        url: &str,
        user_title: Option<&str>,
        user_description: Option<&str>,
    ) -> WebsiteMetadata;
}

/// Resolver backed by a page metadata source and an optional summarizer.
pub struct EnrichmentService {
    pages: Arc<dyn PageMetadataSource>,
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl EnrichmentService {
    pub fn new(pages: Arc<dyn PageMetadataSource>, summarizer: Option<Arc<dyn Summarizer>>) -> Self {
        Self { pages, summarizer }
    }

    /// Microlink for page metadata; Gemini only when an API key is configured.
    pub fn from_settings(settings: &EnrichmentSettings) -> Self {
        let pages = Arc::new(MicrolinkClient::new(
            settings.microlink_endpoint.clone(),
            settings.timeout_secs,
        ));
        let summarizer = settings
            .gemini_api_key
            .as_ref()
            .filter(|key| !key.is_empty())
            .map(|key| {
                Arc::new(GeminiClient::new(
                    settings.gemini_endpoint.clone(),
                    key.clone(),
                    settings.gemini_model.clone(),
                    settings.timeout_secs,
                )) as Arc<dyn Summarizer>
            });
        if summarizer.is_none() {
            debug!("no Gemini API key configured, summaries disabled");
        }
        Self::new(pages, summarizer)
    }

    async fn page_metadata(&self, url: &str) -> PageMetadata {
        match self.pages.fetch(url).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!(url = %url, error = %e, "page metadata lookup failed");
                PageMetadata::default()
            }
        }
    }

    async fn summary(&self, url: &str, content_type: ContentType) -> Option<ContentSummary> {
        let summarizer = self.summarizer.as_ref()?;
        match summarizer.summarize(url, content_type).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(url = %url, error = %e, "summary generation failed");
                None
            }
        }
    }
}

fn provided(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl MetadataResolver for EnrichmentService {
    async fn resolve(
        &self,
        url: &str,
        user_title: Option<&str>,
        user_description: Option<&str>,
    ) -> WebsiteMetadata {
        let url = url.trim();
        let analysis = analyze_url(url);
        let content_type = analysis.content_type;
        let mut title = provided(user_title);
        let mut description = provided(user_description);
        let mut page = PageMetadata::default();

        if title.is_none() || description.is_none() {
            if content_type == ContentType::Website {
                page = self.page_metadata(url).await;
                title = title.or_else(|| page.title.clone());
                description = description.or_else(|| page.description.clone());
            }
            if content_type != ContentType::Note && (title.is_none() || description.is_none()) {
                if let Some(summary) = self.summary(url, content_type).await {
                    title = title.or(Some(summary.title));
                    description = description.or(Some(summary.description));
                }
            }
        }

        WebsiteMetadata {
            content_type,
            thumbnail: default_thumbnail(url, &analysis),
            embed_id: analysis.embed_id,
            title: title.unwrap_or_else(|| default_title(content_type).to_string()),
            description: description.unwrap_or_else(|| default_description(content_type).to_string()),
            author: page.author,
            publisher: page.publisher,
        }
    }
}
