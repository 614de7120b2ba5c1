//! Schema migrations for the SaveKar SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Safe to call on every startup.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: folders, websites, tags")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Reminder lookup index")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = chrono::Utc::now().timestamp_millis();
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: owner-scoped folders, websites and tags with their uniqueness rules.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS folders (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            parent_id TEXT,
            color TEXT NOT NULL,
            icon TEXT NOT NULL DEFAULT 'folder',
            path TEXT NOT NULL,
            level INTEGER NOT NULL DEFAULT 0,
            is_expanded INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (parent_id) REFERENCES folders(id)
        );

        CREATE INDEX IF NOT EXISTS idx_folders_owner_parent ON folders(owner_id, parent_id);
        CREATE INDEX IF NOT EXISTS idx_folders_owner_path ON folders(owner_id, path);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_folders_unique_sibling
            ON folders(owner_id, COALESCE(parent_id, ''), name);

        CREATE TABLE IF NOT EXISTS websites (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            url TEXT NOT NULL,
            type TEXT NOT NULL,
            embed_id TEXT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            thumbnail TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '[]',
            is_favorite INTEGER NOT NULL DEFAULT 0,
            view_count INTEGER NOT NULL DEFAULT 0,
            folder_id TEXT,
            scheduled_for INTEGER,
            reminder_sent INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(owner_id, url),
            FOREIGN KEY (folder_id) REFERENCES folders(id)
        );

        CREATE INDEX IF NOT EXISTS idx_websites_owner_folder ON websites(owner_id, folder_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_websites_owner_type ON websites(owner_id, type);
        CREATE INDEX IF NOT EXISTS idx_websites_owner_favorite ON websites(owner_id, is_favorite);

        CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            usage_count INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(owner_id, name)
        );

        CREATE INDEX IF NOT EXISTS idx_tags_owner_usage ON tags(owner_id, usage_count);
        ",
    )
}

/// V2: index serving the due-reminder scan.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_websites_reminders ON websites(scheduled_for, reminder_sent);",
    )
}
