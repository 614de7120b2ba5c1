//! Unit tests for the SaveKar database layer (connection + migrations).

use savekar::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use savekar::database::Database;

fn object_exists(db: &Database, kind: &str, name: &str) -> bool {
    db.connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = ?1 AND name = ?2",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap_or(false)
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    for table in ["folders", "websites", "tags", "schema_version"] {
        assert!(object_exists(&db, "table", table), "table '{}' should exist", table);
    }
}

#[test]
fn test_migrations_create_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    for index in [
        "idx_folders_owner_parent",
        "idx_folders_unique_sibling",
        "idx_websites_owner_folder",
        "idx_tags_owner_usage",
        "idx_websites_reminders",
    ] {
        assert!(object_exists(&db, "index", index), "index '{}' should exist", index);
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().unwrap();
    run_all(db.connection()).expect("running migrations twice should succeed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_open_file_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("savekar.db");

    {
        let db = Database::open(&path).unwrap();
        db.connection()
            .execute(
                "INSERT INTO tags (id, owner_id, name, color, usage_count, created_at, updated_at) \
                 VALUES ('t1', 'ana@example.com', 'rust', '#3b82f6', 1, 0, 0)",
                [],
            )
            .unwrap();
    }

    let reopened = Database::open(&path).unwrap();
    let count: i64 = reopened
        .connection()
        .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_website_url_unique_per_owner() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    let insert = "INSERT INTO websites (id, owner_id, url, type, title, created_at, updated_at) \
                  VALUES (?1, ?2, 'https://example.com', 'website', 'Example', 0, 0)";

    conn.execute(insert, ["w1", "ana@example.com"]).unwrap();
    conn.execute(insert, ["w2", "ben@example.com"])
        .expect("another owner may save the same url");
    let err = conn.execute(insert, ["w3", "ana@example.com"]).unwrap_err();
    assert!(savekar::types::errors::is_unique_violation(&err));
}

#[test]
fn test_root_folder_names_unique_per_owner() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    let insert = "INSERT INTO folders (id, owner_id, name, parent_id, color, path, created_at, updated_at) \
                  VALUES (?1, 'ana@example.com', 'Work', NULL, '#3b82f6', '/Work', 0, 0)";

    conn.execute(insert, ["f1"]).unwrap();
    let err = conn.execute(insert, ["f2"]).unwrap_err();
    assert!(savekar::types::errors::is_unique_violation(&err));
}

#[test]
fn test_foreign_key_violation_is_not_unique_violation() {
    let db = Database::open_in_memory().unwrap();
    let err = db
        .connection()
        .execute(
            "INSERT INTO folders (id, owner_id, name, parent_id, color, path, created_at, updated_at) \
             VALUES ('f1', 'ana@example.com', 'Child', 'missing', '#3b82f6', '/x', 0, 0)",
            [],
        )
        .unwrap_err();
    assert!(!savekar::types::errors::is_unique_violation(&err));
}
