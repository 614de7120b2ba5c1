//! Folder Manager for SaveKar.
//!
//! Implements `FolderManagerTrait`: owner-scoped folder CRUD, live website and
//! subfolder counts, forest assembly and breadcrumb resolution, backed by
//! SQLite via `rusqlite`.

use std::collections::{HashMap, HashSet};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use super::{millis_to_datetime, now_millis, pick_color};
use crate::types::errors::{is_unique_violation, FolderError};
use crate::types::folder::{
    BreadcrumbItem, Folder, FolderNode, FolderTree, FolderUpdate, FolderWithCounts, NewFolder,
    DEFAULT_FOLDER_ICON,
};

const FOLDER_COLUMNS: &str =
    "id, owner_id, name, parent_id, color, icon, path, level, is_expanded, created_at, updated_at";

/// Trait defining folder hierarchy operations.
pub trait FolderManagerTrait {
    fn create_folder(&mut self, input: &NewFolder) -> Result<Folder, FolderError>;
    fn get_folder(&self, id: &str) -> Result<Folder, FolderError>;
    /// Lists the folders directly under `parent_id` (`None` = root level).
    fn list_folders(&self, parent_id: Option<&str>) -> Result<Vec<FolderWithCounts>, FolderError>;
    fn folder_tree(&self) -> Result<FolderTree, FolderError>;
    fn update_folder(&mut self, id: &str, update: &FolderUpdate) -> Result<Folder, FolderError>;
    fn delete_folder(&mut self, id: &str) -> Result<(), FolderError>;
    /// Root-first chain ending at `id`. `None` yields only the root entry.
    fn breadcrumb(&self, id: Option<&str>) -> Result<Vec<BreadcrumbItem>, FolderError>;
}

/// Folder manager scoped to a single owner.
pub struct FolderManager<'a> {
    conn: &'a Connection,
    owner: &'a str,
}

impl<'a> FolderManager<'a> {
    /// Creates a new `FolderManager` for `owner` using the provided connection.
    pub fn new(conn: &'a Connection, owner: &'a str) -> Self {
        Self { conn, owner }
    }

    /// Reads a single `Folder` row into a struct.
    fn row_to_folder(row: &rusqlite::Row) -> rusqlite::Result<Folder> {
        Ok(Folder {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            parent_id: row.get(3)?,
            color: row.get(4)?,
            icon: row.get(5)?,
            path: row.get(6)?,
            level: row.get(7)?,
            is_expanded: row.get(8)?,
            created_at: millis_to_datetime(row.get(9)?),
            updated_at: millis_to_datetime(row.get(10)?),
        })
    }

    fn find_folder(&self, id: &str) -> Result<Option<Folder>, FolderError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM folders WHERE id = ?1 AND owner_id = ?2", FOLDER_COLUMNS),
                params![id, self.owner],
                Self::row_to_folder,
            )
            .optional()
            .map_err(|e| FolderError::DatabaseError(e.to_string()))
    }

    fn sibling_exists(&self, name: &str, parent_id: Option<&str>) -> Result<bool, FolderError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM folders WHERE owner_id = ?1 AND name = ?2 AND parent_id IS ?3",
                params![self.owner, name, parent_id],
                |row| row.get(0),
            )
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;
        Ok(count > 0)
    }

    fn subfolder_count(&self, id: &str) -> Result<i64, FolderError> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM folders WHERE owner_id = ?1 AND parent_id = ?2",
                params![self.owner, id],
                |row| row.get(0),
            )
            .map_err(|e| FolderError::DatabaseError(e.to_string()))
    }

    /// Direct website count per folder id, plus the root-level count.
    fn website_counts(&self) -> Result<(HashMap<String, i64>, i64), FolderError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT folder_id, COUNT(*) FROM websites \
                 WHERE owner_id = ?1 AND folder_id IS NOT NULL GROUP BY folder_id",
            )
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(params![self.owner], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;

        let mut counts = HashMap::new();
        for row in rows {
            let (folder_id, count) = row.map_err(|e| FolderError::DatabaseError(e.to_string()))?;
            counts.insert(folder_id, count);
        }

        let root: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM websites WHERE owner_id = ?1 AND folder_id IS NULL",
                params![self.owner],
                |row| row.get(0),
            )
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;

        Ok((counts, root))
    }
}

/// Builds a node for `folder`, recursively pulling its children out of `children_of`.
fn attach(
    folder: Folder,
    children_of: &mut HashMap<String, Vec<Folder>>,
    counts: &HashMap<String, i64>,
) -> FolderNode {
    let kids = children_of.remove(&folder.id).unwrap_or_default();
    let children = kids
        .into_iter()
        .map(|child| attach(child, children_of, counts))
        .collect();
    FolderNode {
        website_count: counts.get(&folder.id).copied().unwrap_or(0),
        folder,
        children,
    }
}

/// Assembles a forest from a flat folder list.
///
/// Every folder is attached under the folder named by its `parent_id`; a
/// missing or unknown parent puts it at root level. Input order is kept
/// within each sibling list.
pub fn build_forest(folders: Vec<Folder>, counts: &HashMap<String, i64>) -> Vec<FolderNode> {
    let ids: HashSet<String> = folders.iter().map(|f| f.id.clone()).collect();
    let mut children_of: HashMap<String, Vec<Folder>> = HashMap::new();
    let mut roots = Vec::new();

    for folder in folders {
        match folder.parent_id.as_deref() {
            Some(pid) if ids.contains(pid) => {
                children_of.entry(pid.to_string()).or_default().push(folder)
            }
            _ => roots.push(folder),
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children_of, counts))
        .collect()
}

impl<'a> FolderManagerTrait for FolderManager<'a> {
    /// Creates a folder, deriving `path` and `level` from the parent.
    fn create_folder(&mut self, input: &NewFolder) -> Result<Folder, FolderError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(FolderError::EmptyName);
        }
        let parent_id = input.parent_id.as_deref().filter(|p| !p.is_empty());

        let (path, level) = match parent_id {
            Some(pid) => {
                let parent = self
                    .find_folder(pid)?
                    .ok_or_else(|| FolderError::ParentNotFound(pid.to_string()))?;
                (format!("{}/{}", parent.path, name), parent.level + 1)
            }
            None => (format!("/{}", name), 0),
        };

        if self.sibling_exists(name, parent_id)? {
            return Err(FolderError::DuplicateName(name.to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let now = now_millis();
        let color = input.color.clone().unwrap_or_else(|| pick_color().to_string());
        let icon = input
            .icon
            .clone()
            .unwrap_or_else(|| DEFAULT_FOLDER_ICON.to_string());

        self.conn
            .execute(
                "INSERT INTO folders (id, owner_id, name, parent_id, color, icon, path, level, is_expanded, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 1, ?9, ?9)",
                params![id, self.owner, name, parent_id, color, icon, path, level, now],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    FolderError::DuplicateName(name.to_string())
                } else {
                    FolderError::DatabaseError(e.to_string())
                }
            })?;

        info!(owner = %self.owner, folder_id = %id, path = %path, "folder created");
        self.get_folder(&id)
    }

    fn get_folder(&self, id: &str) -> Result<Folder, FolderError> {
        self.find_folder(id)?
            .ok_or_else(|| FolderError::NotFound(id.to_string()))
    }

    /// Counts are computed per folder at query time, never stored.
    fn list_folders(&self, parent_id: Option<&str>) -> Result<Vec<FolderWithCounts>, FolderError> {
        let sql = format!(
            "SELECT {}, \
             (SELECT COUNT(*) FROM websites w WHERE w.owner_id = folders.owner_id AND w.folder_id = folders.id), \
             (SELECT COUNT(*) FROM folders c WHERE c.owner_id = folders.owner_id AND c.parent_id = folders.id) \
             FROM folders WHERE owner_id = ?1 AND parent_id IS ?2 ORDER BY name",
            FOLDER_COLUMNS
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![self.owner, parent_id], |row| {
                Ok(FolderWithCounts {
                    folder: Self::row_to_folder(row)?,
                    website_count: row.get(11)?,
                    subfolder_count: row.get(12)?,
                })
            })
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| FolderError::DatabaseError(e.to_string()))?);
        }
        debug!(owner = %self.owner, parent = ?parent_id, count = results.len(), "listed folders");
        Ok(results)
    }

    fn folder_tree(&self) -> Result<FolderTree, FolderError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM folders WHERE owner_id = ?1 ORDER BY level, name",
                FOLDER_COLUMNS
            ))
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(params![self.owner], Self::row_to_folder)
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;

        let mut folders = Vec::new();
        for row in rows {
            folders.push(row.map_err(|e| FolderError::DatabaseError(e.to_string()))?);
        }

        let (counts, root_website_count) = self.website_counts()?;
        Ok(FolderTree {
            tree: build_forest(folders, &counts),
            root_website_count,
        })
    }

    /// Applies the provided fields. Descendant paths are not rewritten on rename.
    fn update_folder(&mut self, id: &str, update: &FolderUpdate) -> Result<Folder, FolderError> {
        let current = self.get_folder(id)?;

        let name = match update.name.as_deref().map(str::trim) {
            Some("") => return Err(FolderError::EmptyName),
            Some(n) => n.to_string(),
            None => current.name.clone(),
        };
        let color = update.color.clone().unwrap_or(current.color);
        let icon = update.icon.clone().unwrap_or(current.icon);
        let is_expanded = update.is_expanded.unwrap_or(current.is_expanded);

        self.conn
            .execute(
                "UPDATE folders SET name = ?1, color = ?2, icon = ?3, is_expanded = ?4, updated_at = ?5 \
                 WHERE id = ?6 AND owner_id = ?7",
                params![name, color, icon, is_expanded, now_millis(), id, self.owner],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    FolderError::DuplicateName(name.clone())
                } else {
                    FolderError::DatabaseError(e.to_string())
                }
            })?;

        self.get_folder(id)
    }

    /// Deletes a leaf folder. Websites inside it move to root.
    fn delete_folder(&mut self, id: &str) -> Result<(), FolderError> {
        self.get_folder(id)?;

        if self.subfolder_count(id)? > 0 {
            return Err(FolderError::HasSubfolders(id.to_string()));
        }

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;
        let moved = tx
            .execute(
                "UPDATE websites SET folder_id = NULL, updated_at = ?1 WHERE owner_id = ?2 AND folder_id = ?3",
                params![now_millis(), self.owner, id],
            )
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;
        tx.execute(
            "DELETE FROM folders WHERE id = ?1 AND owner_id = ?2",
            params![id, self.owner],
        )
        .map_err(|e| FolderError::DatabaseError(e.to_string()))?;
        tx.commit()
            .map_err(|e| FolderError::DatabaseError(e.to_string()))?;

        info!(owner = %self.owner, folder_id = %id, websites_moved = moved, "folder deleted");
        Ok(())
    }

    fn breadcrumb(&self, id: Option<&str>) -> Result<Vec<BreadcrumbItem>, FolderError> {
        let mut crumbs = vec![BreadcrumbItem::root()];
        let Some(id) = id else {
            return Ok(crumbs);
        };

        let tree = self.folder_tree()?;
        let chain = tree
            .ancestry(id)
            .ok_or_else(|| FolderError::NotFound(id.to_string()))?;
        crumbs.extend(chain.into_iter().map(|node| BreadcrumbItem {
            id: Some(node.folder.id.clone()),
            name: node.folder.name.clone(),
            path: node.folder.path.clone(),
        }));
        Ok(crumbs)
    }
}
