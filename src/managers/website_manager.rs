//! Website Manager for SaveKar.
//!
//! Implements `WebsiteManagerTrait`: owner-scoped storage of bookmark entries,
//! with URL uniqueness enforced by the `(owner_id, url)` unique key and tag
//! usage recorded in the same transaction as the insert.

use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use super::tag_manager::{TagManager, TagManagerTrait};
use super::{millis_to_datetime, now_millis};
use crate::types::errors::{is_unique_violation, WebsiteError};
use crate::types::folder::folder_reference;
use crate::types::tag::normalize_tag;
use crate::types::website::{
    parse_scheduled_for, ContentType, FolderScope, Website, WebsiteDraft, WebsiteFilter,
    WebsiteUpdate,
};

const WEBSITE_COLUMNS: &str = "id, owner_id, url, type, embed_id, title, description, thumbnail, tags, \
     is_favorite, view_count, folder_id, scheduled_for, reminder_sent, created_at, updated_at";

/// Trait defining website placement storage operations.
pub trait WebsiteManagerTrait {
    fn find_by_url(&self, url: &str) -> Result<Option<Website>, WebsiteError>;
    fn get_website(&self, id: &str) -> Result<Website, WebsiteError>;
    /// Newest first. Search is applied after the storage filters.
    fn list_websites(&self, filter: &WebsiteFilter) -> Result<Vec<Website>, WebsiteError>;
    /// Records tag usage for `raw_tags` and inserts the entry, atomically.
    fn create_website(&mut self, draft: WebsiteDraft, raw_tags: &[String]) -> Result<Website, WebsiteError>;
    /// Removes `replace_id` (if it exists) and creates the entry in the same transaction.
    fn replace_website(
        &mut self,
        replace_id: &str,
        draft: WebsiteDraft,
        raw_tags: &[String],
    ) -> Result<Website, WebsiteError>;
    fn update_website(&mut self, id: &str, update: &WebsiteUpdate) -> Result<Website, WebsiteError>;
    fn delete_website(&mut self, id: &str) -> Result<(), WebsiteError>;
    fn record_view(&mut self, id: &str) -> Result<Website, WebsiteError>;
    fn ensure_folder(&self, folder_id: &str) -> Result<(), WebsiteError>;
}

/// Website manager scoped to a single owner.
pub struct WebsiteManager<'a> {
    conn: &'a Connection,
    owner: &'a str,
}

impl<'a> WebsiteManager<'a> {
    pub fn new(conn: &'a Connection, owner: &'a str) -> Self {
        Self { conn, owner }
    }

    fn find_website(&self, id: &str) -> Result<Option<Website>, WebsiteError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM websites WHERE id = ?1 AND owner_id = ?2", WEBSITE_COLUMNS),
                params![id, self.owner],
                row_to_website,
            )
            .optional()
            .map_err(|e| WebsiteError::DatabaseError(e.to_string()))
    }

    fn store(
        &self,
        replace_id: Option<&str>,
        draft: WebsiteDraft,
        raw_tags: &[String],
    ) -> Result<Website, WebsiteError> {
        if let Some(folder_id) = draft.folder_id.as_deref() {
            self.ensure_folder(folder_id)?;
        }

        let id = Uuid::new_v4().to_string();
        let now = now_millis();
        let url = draft.url.trim().to_string();

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;

        if let Some(old_id) = replace_id {
            tx.execute(
                "DELETE FROM websites WHERE id = ?1 AND owner_id = ?2",
                params![old_id, self.owner],
            )
            .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;
        }

        let tags = TagManager::new(&tx, self.owner).attach_tags(raw_tags)?;

        let inserted = tx.execute(
            &format!(
                "INSERT INTO websites ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, 0, ?10, ?11, 0, ?12, ?12)",
                WEBSITE_COLUMNS
            ),
            params![
                id,
                self.owner,
                url,
                draft.content_type.as_str(),
                draft.embed_id,
                draft.title,
                draft.description,
                draft.thumbnail,
                tags_to_json(&tags)?,
                draft.folder_id,
                draft.scheduled_for.map(|dt| dt.timestamp_millis()),
                now,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                drop(tx);
                return match self.find_by_url(&url)? {
                    Some(existing) => Err(WebsiteError::DuplicateUrl(Box::new(existing))),
                    None => Err(WebsiteError::UrlTaken(url)),
                };
            }
            Err(e) => return Err(WebsiteError::DatabaseError(e.to_string())),
        }

        tx.commit()
            .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;

        info!(owner = %self.owner, website_id = %id, replaced = ?replace_id, content_type = %draft.content_type, "website saved");
        self.get_website(&id)
    }
}

/// Reads a single `Website` row into a struct.
pub(crate) fn row_to_website(row: &rusqlite::Row) -> rusqlite::Result<Website> {
    let type_str: String = row.get(3)?;
    let content_type = type_str
        .parse::<ContentType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    let tags_json: String = row.get(8)?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

    Ok(Website {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        url: row.get(2)?,
        content_type,
        embed_id: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        thumbnail: row.get(7)?,
        tags,
        is_favorite: row.get(9)?,
        view_count: row.get(10)?,
        folder_id: row.get(11)?,
        scheduled_for: row.get::<_, Option<i64>>(12)?.map(millis_to_datetime),
        reminder_sent: row.get(13)?,
        created_at: millis_to_datetime(row.get(14)?),
        updated_at: millis_to_datetime(row.get(15)?),
    })
}

fn tags_to_json(tags: &[String]) -> Result<String, WebsiteError> {
    serde_json::to_string(tags).map_err(|e| WebsiteError::DatabaseError(e.to_string()))
}

impl<'a> WebsiteManagerTrait for WebsiteManager<'a> {
    fn find_by_url(&self, url: &str) -> Result<Option<Website>, WebsiteError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM websites WHERE owner_id = ?1 AND url = ?2", WEBSITE_COLUMNS),
                params![self.owner, url.trim()],
                row_to_website,
            )
            .optional()
            .map_err(|e| WebsiteError::DatabaseError(e.to_string()))
    }

    fn get_website(&self, id: &str) -> Result<Website, WebsiteError> {
        self.find_website(id)?
            .ok_or_else(|| WebsiteError::NotFound(id.to_string()))
    }

    fn list_websites(&self, filter: &WebsiteFilter) -> Result<Vec<Website>, WebsiteError> {
        let mut sql = format!("SELECT {} FROM websites WHERE owner_id = ?", WEBSITE_COLUMNS);
        let mut values: Vec<Value> = vec![Value::Text(self.owner.to_string())];

        match &filter.folder {
            FolderScope::Root => sql.push_str(" AND folder_id IS NULL"),
            FolderScope::Folder(id) => {
                sql.push_str(" AND folder_id = ?");
                values.push(Value::Text(id.clone()));
            }
            FolderScope::Any => {}
        }
        if let Some(content_type) = filter.content_type {
            sql.push_str(" AND type = ?");
            values.push(Value::Text(content_type.as_str().to_string()));
        }
        if filter.favorites_only {
            sql.push_str(" AND is_favorite = 1");
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), row_to_website)
            .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            let website = row.map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;
            if filter.matches_search(&website) {
                results.push(website);
            }
        }
        debug!(owner = %self.owner, count = results.len(), "listed websites");
        Ok(results)
    }

    fn create_website(&mut self, draft: WebsiteDraft, raw_tags: &[String]) -> Result<Website, WebsiteError> {
        self.store(None, draft, raw_tags)
    }

    fn replace_website(
        &mut self,
        replace_id: &str,
        draft: WebsiteDraft,
        raw_tags: &[String],
    ) -> Result<Website, WebsiteError> {
        self.store(Some(replace_id), draft, raw_tags)
    }

    /// Shallow merge of the provided fields. Tag counters are not touched.
    fn update_website(&mut self, id: &str, update: &WebsiteUpdate) -> Result<Website, WebsiteError> {
        let mut website = self.get_website(id)?;

        if let Some(url) = &update.url {
            let url = url.trim();
            if url.is_empty() {
                return Err(WebsiteError::MissingUrl);
            }
            website.url = url.to_string();
        }
        if let Some(content_type) = update.content_type {
            website.content_type = content_type;
        }
        if let Some(embed_id) = &update.embed_id {
            website.embed_id = embed_id.clone();
        }
        if let Some(title) = &update.title {
            website.title = title.clone();
        }
        if let Some(description) = &update.description {
            website.description = description.clone();
        }
        if let Some(thumbnail) = &update.thumbnail {
            website.thumbnail = thumbnail.clone();
        }
        if let Some(tags) = &update.tags {
            website.tags = tags.iter().filter_map(|t| normalize_tag(t)).collect();
        }
        if let Some(is_favorite) = update.is_favorite {
            website.is_favorite = is_favorite;
        }
        if let Some(view_count) = update.view_count {
            website.view_count = view_count.max(0);
        }
        if let Some(folder_id) = &update.folder_id {
            let folder_id = folder_reference(folder_id.as_deref());
            if let Some(fid) = folder_id {
                self.ensure_folder(fid)?;
            }
            website.folder_id = folder_id.map(str::to_string);
        }
        if let Some(scheduled_for) = &update.scheduled_for {
            website.scheduled_for = match scheduled_for.as_deref() {
                Some(raw) => parse_scheduled_for(raw)?,
                None => None,
            };
        }

        self.conn
            .execute(
                "UPDATE websites SET url = ?1, type = ?2, embed_id = ?3, title = ?4, description = ?5, \
                 thumbnail = ?6, tags = ?7, is_favorite = ?8, view_count = ?9, folder_id = ?10, \
                 scheduled_for = ?11, updated_at = ?12 WHERE id = ?13 AND owner_id = ?14",
                params![
                    website.url,
                    website.content_type.as_str(),
                    website.embed_id,
                    website.title,
                    website.description,
                    website.thumbnail,
                    tags_to_json(&website.tags)?,
                    website.is_favorite,
                    website.view_count,
                    website.folder_id,
                    website.scheduled_for.map(|dt| dt.timestamp_millis()),
                    now_millis(),
                    id,
                    self.owner,
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    WebsiteError::UrlTaken(website.url.clone())
                } else {
                    WebsiteError::DatabaseError(e.to_string())
                }
            })?;

        self.get_website(id)
    }

    fn delete_website(&mut self, id: &str) -> Result<(), WebsiteError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM websites WHERE id = ?1 AND owner_id = ?2",
                params![id, self.owner],
            )
            .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;
        if affected == 0 {
            return Err(WebsiteError::NotFound(id.to_string()));
        }
        info!(owner = %self.owner, website_id = %id, "website deleted");
        Ok(())
    }

    fn record_view(&mut self, id: &str) -> Result<Website, WebsiteError> {
        let affected = self
            .conn
            .execute(
                "UPDATE websites SET view_count = view_count + 1 WHERE id = ?1 AND owner_id = ?2",
                params![id, self.owner],
            )
            .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;
        if affected == 0 {
            return Err(WebsiteError::NotFound(id.to_string()));
        }
        self.get_website(id)
    }

    /// Fails with `FolderNotFound` unless this owner has a folder with `folder_id`.
    fn ensure_folder(&self, folder_id: &str) -> Result<(), WebsiteError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM folders WHERE id = ?1 AND owner_id = ?2",
                params![folder_id, self.owner],
                |row| row.get(0),
            )
            .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;
        if count == 0 {
            return Err(WebsiteError::FolderNotFound(folder_id.to_string()));
        }
        Ok(())
    }
}

/// Websites of any owner whose reminder is due at `now_ms` and not yet sent,
/// oldest schedule first.
pub fn due_reminders(conn: &Connection, now_ms: i64) -> Result<Vec<Website>, WebsiteError> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM websites WHERE scheduled_for IS NOT NULL AND scheduled_for <= ?1 \
             AND reminder_sent = 0 ORDER BY scheduled_for",
            WEBSITE_COLUMNS
        ))
        .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;
    let rows = stmt
        .query_map(params![now_ms], row_to_website)
        .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row.map_err(|e| WebsiteError::DatabaseError(e.to_string()))?);
    }
    Ok(results)
}

/// Flips `reminder_sent` to true. Returns false if it was already set, so a
/// reminder is marked at most once.
pub fn mark_reminder_sent(conn: &Connection, id: &str) -> Result<bool, WebsiteError> {
    let affected = conn
        .execute(
            "UPDATE websites SET reminder_sent = 1, updated_at = ?1 WHERE id = ?2 AND reminder_sent = 0",
            params![now_millis(), id],
        )
        .map_err(|e| WebsiteError::DatabaseError(e.to_string()))?;
    Ok(affected > 0)
}
