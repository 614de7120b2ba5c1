//! Tag Manager for SaveKar.
//!
//! Tag usage is recorded with a single upsert against the `(owner_id, name)`
//! unique key, so two concurrent first uses of a name cannot create two rows.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use super::{millis_to_datetime, now_millis, pick_color};
use crate::types::errors::TagError;
use crate::types::tag::{normalize_tag, Tag, TAG_LIST_LIMIT};

/// Trait defining tag usage tracking operations.
pub trait TagManagerTrait {
    /// Records one use of `name`: creates the tag with `usage_count = 1` or
    /// increments an existing one. `color` only applies on creation.
    fn record_usage(&mut self, name: &str, color: Option<&str>) -> Result<Tag, TagError>;
    /// Records usage for every raw tag in order and returns the normalized names.
    ///
    /// Entries that normalize to the same name are counted separately.
    fn attach_tags(&mut self, raw: &[String]) -> Result<Vec<String>, TagError>;
    fn get_tag(&self, name: &str) -> Result<Option<Tag>, TagError>;
    /// Most used first, then by name; at most 50 entries.
    fn list_tags(&self, search: Option<&str>) -> Result<Vec<Tag>, TagError>;
}

/// Tag manager scoped to a single owner.
pub struct TagManager<'a> {
    conn: &'a Connection,
    owner: &'a str,
}

impl<'a> TagManager<'a> {
    pub fn new(conn: &'a Connection, owner: &'a str) -> Self {
        Self { conn, owner }
    }

    fn row_to_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
        Ok(Tag {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            color: row.get(3)?,
            usage_count: row.get(4)?,
            created_at: millis_to_datetime(row.get(5)?),
            updated_at: millis_to_datetime(row.get(6)?),
        })
    }
}

impl<'a> TagManagerTrait for TagManager<'a> {
    fn record_usage(&mut self, name: &str, color: Option<&str>) -> Result<Tag, TagError> {
        let name = normalize_tag(name).ok_or(TagError::EmptyName)?;
        let color = color.unwrap_or_else(|| pick_color());

        self.conn
            .execute(
                "INSERT INTO tags (id, owner_id, name, color, usage_count, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5) \
                 ON CONFLICT(owner_id, name) DO UPDATE SET \
                     usage_count = usage_count + 1, updated_at = excluded.updated_at",
                params![Uuid::new_v4().to_string(), self.owner, name, color, now_millis()],
            )
            .map_err(|e| TagError::DatabaseError(e.to_string()))?;

        self.get_tag(&name)?
            .ok_or_else(|| TagError::DatabaseError(format!("tag vanished after upsert: {}", name)))
    }

    fn attach_tags(&mut self, raw: &[String]) -> Result<Vec<String>, TagError> {
        let mut processed = Vec::new();
        for entry in raw {
            if let Some(name) = normalize_tag(entry) {
                self.record_usage(&name, None)?;
                processed.push(name);
            }
        }
        debug!(owner = %self.owner, tags = ?processed, "tag usage recorded");
        Ok(processed)
    }

    fn get_tag(&self, name: &str) -> Result<Option<Tag>, TagError> {
        self.conn
            .query_row(
                "SELECT id, owner_id, name, color, usage_count, created_at, updated_at \
                 FROM tags WHERE owner_id = ?1 AND name = ?2",
                params![self.owner, name],
                Self::row_to_tag,
            )
            .optional()
            .map_err(|e| TagError::DatabaseError(e.to_string()))
    }

    fn list_tags(&self, search: Option<&str>) -> Result<Vec<Tag>, TagError> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, owner_id, name, color, usage_count, created_at, updated_at FROM tags \
                 WHERE owner_id = ?1 AND (?2 IS NULL OR instr(name, ?2) > 0) \
                 ORDER BY usage_count DESC, name ASC LIMIT ?3",
            )
            .map_err(|e| TagError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![self.owner, needle, TAG_LIST_LIMIT], Self::row_to_tag)
            .map_err(|e| TagError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| TagError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }
}
