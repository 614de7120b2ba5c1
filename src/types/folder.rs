use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Colours handed out to folders and tags created without an explicit one.
pub const PALETTE: [&str; 10] = [
    "#3b82f6", // blue
    "#ef4444", // red
    "#10b981", // green
    "#f59e0b", // yellow
    "#8b5cf6", // purple
    "#06b6d4", // cyan
    "#f97316", // orange
    "#84cc16", // lime
    "#ec4899", // pink
    "#6366f1", // indigo
];

/// Icon used when a folder is created without one.
pub const DEFAULT_FOLDER_ICON: &str = "folder";

/// Folder id sent by a client, with `""` and `"null"` meaning the root level.
pub fn folder_reference(raw: Option<&str>) -> Option<&str> {
    match raw.map(str::trim) {
        None | Some("") | Some("null") => None,
        Some(id) => Some(id),
    }
}

/// A node in a user's folder hierarchy.
///
/// `path` and `level` are derived from the parent at creation time and are
/// not refreshed when an ancestor is later renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub parent_id: Option<String>,
    pub color: String,
    pub icon: String,
    pub path: String,
    pub level: i64,
    pub is_expanded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A folder annotated with live counts, as returned by folder listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderWithCounts {
    #[serde(flatten)]
    pub folder: Folder,
    pub website_count: i64,
    pub subfolder_count: i64,
}

/// A folder with its direct website count and nested children.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderNode {
    #[serde(flatten)]
    pub folder: Folder,
    pub website_count: i64,
    pub children: Vec<FolderNode>,
}

/// The per-owner folder forest plus the number of websites at root.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderTree {
    pub tree: Vec<FolderNode>,
    pub root_website_count: i64,
}

impl FolderTree {
    /// Total number of folders anywhere in the forest.
    pub fn folder_count(&self) -> usize {
        fn count(nodes: &[FolderNode]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.tree)
    }

    /// Returns the chain of nodes from a root folder down to `id`, or `None`
    /// when no folder in the forest has that id.
    pub fn ancestry(&self, id: &str) -> Option<Vec<&FolderNode>> {
        fn walk<'a>(nodes: &'a [FolderNode], id: &str) -> Option<Vec<&'a FolderNode>> {
            for node in nodes {
                if node.folder.id == id {
                    return Some(vec![node]);
                }
                if let Some(mut chain) = walk(&node.children, id) {
                    chain.insert(0, node);
                    return Some(chain);
                }
            }
            None
        }
        walk(&self.tree, id)
    }
}

/// One step of a breadcrumb trail. The synthetic root entry has no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreadcrumbItem {
    pub id: Option<String>,
    pub name: String,
    pub path: String,
}

impl BreadcrumbItem {
    pub fn root() -> Self {
        Self {
            id: None,
            name: "Home".to_string(),
            path: "/".to_string(),
        }
    }
}

/// Input for creating a folder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFolder {
    #[serde(default)]
    pub name: String,
    pub parent_id: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Partial update for a folder. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_expanded: Option<bool>,
}
