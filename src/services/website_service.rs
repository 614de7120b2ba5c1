//! Website creation flows that span the store and the enrichment
//! collaborator: create, replace and preview.
//!
//! The database lock is never held across an `.await`: duplicates are
//! checked first, enrichment runs unlocked, and the final insert relies on
//! the `(owner_id, url)` unique key for any race in between.

use std::sync::Arc;

use tracing::info;

use super::metadata_enricher::MetadataResolver;
use crate::database::connection::lock;
use crate::database::SharedDatabase;
use crate::managers::website_manager::{WebsiteManager, WebsiteManagerTrait};
use crate::types::errors::WebsiteError;
use crate::types::folder::folder_reference;
use crate::types::metadata::{MetadataPreview, WebsiteMetadata};
use crate::types::website::{parse_scheduled_for, NewWebsite, Website, WebsiteDraft};

pub struct WebsiteService {
    db: SharedDatabase,
    resolver: Arc<dyn MetadataResolver>,
}

/// Input that passed validation and still needs enrichment.
struct Validated {
    url: String,
    folder_id: Option<String>,
    scheduled_for: Option<chrono::DateTime<chrono::Utc>>,
}

impl WebsiteService {
    pub fn new(db: SharedDatabase, resolver: Arc<dyn MetadataResolver>) -> Self {
        Self { db, resolver }
    }

    fn validate(&self, owner: &str, input: &NewWebsite, check_duplicate: bool) -> Result<Validated, WebsiteError> {
        let url = input.url.trim().to_string();
        if url.is_empty() {
            return Err(WebsiteError::MissingUrl);
        }
        let scheduled_for = match input.scheduled_for.as_deref() {
            Some(raw) => parse_scheduled_for(raw)?,
            None => None,
        };
        let folder_id = folder_reference(input.folder_id.as_deref()).map(str::to_string);

        let db = lock(&self.db).map_err(WebsiteError::DatabaseError)?;
        let manager = WebsiteManager::new(db.connection(), owner);
        if check_duplicate {
            if let Some(existing) = manager.find_by_url(&url)? {
                return Err(WebsiteError::DuplicateUrl(Box::new(existing)));
            }
        }
        if let Some(fid) = folder_id.as_deref() {
            manager.ensure_folder(fid)?;
        }

        Ok(Validated {
            url,
            folder_id,
            scheduled_for,
        })
    }

    async fn enrich(&self, input: &NewWebsite, checked: Validated) -> WebsiteDraft {
        let meta: WebsiteMetadata = self
            .resolver
            .resolve(&checked.url, input.title.as_deref(), input.description.as_deref())
            .await;

        WebsiteDraft {
            url: checked.url,
            content_type: meta.content_type,
            embed_id: meta.embed_id,
            title: meta.title,
            description: meta.description,
            thumbnail: meta.thumbnail,
            folder_id: checked.folder_id,
            scheduled_for: checked.scheduled_for,
        }
    }

    /// Saves a new entry. An already saved URL fails with `DuplicateUrl`
    /// carrying the existing entry, before any enrichment work.
    pub async fn create(&self, owner: &str, input: NewWebsite) -> Result<Website, WebsiteError> {
        let checked = self.validate(owner, &input, true)?;
        let draft = self.enrich(&input, checked).await;

        let db = lock(&self.db).map_err(WebsiteError::DatabaseError)?;
        let website = WebsiteManager::new(db.connection(), owner).create_website(draft, &input.tags)?;
        info!(owner = %owner, website_id = %website.id, url = %website.url, "website created");
        Ok(website)
    }

    /// Replaces `replaceId` with a freshly enriched entry. A missing
    /// `replaceId` entry is not an error.
    pub async fn replace(&self, owner: &str, input: NewWebsite) -> Result<Website, WebsiteError> {
        let replace_id = input
            .replace_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let replace_id = match (input.url.trim().is_empty(), replace_id) {
            (false, Some(id)) => id,
            _ => return Err(WebsiteError::MissingReplaceId),
        };

        let checked = self.validate(owner, &input, false)?;
        let draft = self.enrich(&input, checked).await;

        let db = lock(&self.db).map_err(WebsiteError::DatabaseError)?;
        let website = WebsiteManager::new(db.connection(), owner)
            .replace_website(&replace_id, draft, &input.tags)?;
        info!(owner = %owner, website_id = %website.id, replaced = %replace_id, "website replaced");
        Ok(website)
    }

    /// Resolves metadata for `url` without touching the store.
    pub async fn preview(&self, url: &str) -> Result<MetadataPreview, WebsiteError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(WebsiteError::MissingUrl);
        }
        Ok(self.resolver.resolve(url, None, None).await.into())
    }
}
