//! Unit tests for WebsiteManager: storage, URL uniqueness, listing filters,
//! partial updates, replacement and reminder bookkeeping.

use chrono::{Duration, TimeZone, Utc};
use rstest::rstest;

use savekar::database::Database;
use savekar::managers::folder_manager::{FolderManager, FolderManagerTrait};
use savekar::managers::tag_manager::{TagManager, TagManagerTrait};
use savekar::managers::website_manager::{
    due_reminders, mark_reminder_sent, WebsiteManager, WebsiteManagerTrait,
};
use savekar::types::errors::WebsiteError;
use savekar::types::folder::NewFolder;
use savekar::types::website::{ContentType, FolderScope, WebsiteDraft, WebsiteFilter, WebsiteUpdate};

const OWNER: &str = "ana@example.com";

fn draft(url: &str, title: &str) -> WebsiteDraft {
    WebsiteDraft {
        url: url.to_string(),
        content_type: ContentType::Website,
        embed_id: None,
        title: title.to_string(),
        description: String::new(),
        thumbnail: String::new(),
        folder_id: None,
        scheduled_for: None,
    }
}

fn tags(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|t| t.to_string()).collect()
}

#[test]
fn test_create_website_defaults() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);

    let saved = mgr
        .create_website(draft("https://example.com", "Example"), &[])
        .unwrap();
    assert_eq!(saved.url, "https://example.com");
    assert_eq!(saved.title, "Example");
    assert_eq!(saved.owner_id, OWNER);
    assert_eq!(saved.view_count, 0);
    assert!(!saved.is_favorite);
    assert!(!saved.reminder_sent);
    assert_eq!(saved.folder_id, None);
    assert!(saved.tags.is_empty());

    let fetched = mgr.get_website(&saved.id).unwrap();
    assert_eq!(fetched, saved);
}

#[test]
fn test_create_normalizes_and_records_tags() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);

    let saved = mgr
        .create_website(draft("https://example.com", "Example"), &tags(&["AI", " ai ", "Research", "  "]))
        .unwrap();
    assert_eq!(saved.tags, vec!["ai", "ai", "research"]);

    let tag_mgr = TagManager::new(db.connection(), OWNER);
    assert_eq!(tag_mgr.get_tag("ai").unwrap().unwrap().usage_count, 2);
    assert_eq!(tag_mgr.get_tag("research").unwrap().unwrap().usage_count, 1);
}

#[test]
fn test_duplicate_url_returns_existing_entry() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);

    let first = mgr
        .create_website(draft("https://example.com", "First"), &[])
        .unwrap();
    let result = mgr.create_website(draft("https://example.com", "Second"), &tags(&["late"]));
    match result {
        Err(WebsiteError::DuplicateUrl(existing)) => assert_eq!(existing.id, first.id),
        other => panic!("expected DuplicateUrl, got {:?}", other.map(|w| w.id)),
    }

    // The failed insert rolled back its tag usage.
    let tag_mgr = TagManager::new(db.connection(), OWNER);
    assert!(tag_mgr.get_tag("late").unwrap().is_none());
}

#[test]
fn test_same_url_for_different_owners() {
    let db = Database::open_in_memory().unwrap();
    WebsiteManager::new(db.connection(), OWNER)
        .create_website(draft("https://example.com", "Mine"), &[])
        .unwrap();
    let theirs = WebsiteManager::new(db.connection(), "ben@example.com")
        .create_website(draft("https://example.com", "Theirs"), &[])
        .unwrap();
    assert_eq!(theirs.owner_id, "ben@example.com");

    let mine = WebsiteManager::new(db.connection(), OWNER);
    assert!(matches!(mine.get_website(&theirs.id), Err(WebsiteError::NotFound(_))));
}

#[test]
fn test_create_into_unknown_folder_fails() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);

    let mut input = draft("https://example.com", "Example");
    input.folder_id = Some("missing".to_string());
    assert!(matches!(
        mgr.create_website(input, &[]),
        Err(WebsiteError::FolderNotFound(_))
    ));
}

#[test]
fn test_find_by_url() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);
    let saved = mgr.create_website(draft("https://example.com", "Example"), &[]).unwrap();

    assert_eq!(mgr.find_by_url("https://example.com").unwrap().map(|w| w.id), Some(saved.id));
    assert!(mgr.find_by_url("https://other.example").unwrap().is_none());
}

#[test]
fn test_list_defaults_to_root_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let work = FolderManager::new(db.connection(), OWNER)
        .create_folder(&NewFolder {
            name: "Work".to_string(),
            ..Default::default()
        })
        .unwrap();

    let mut mgr = WebsiteManager::new(db.connection(), OWNER);
    let first = mgr.create_website(draft("https://one.example", "One"), &[]).unwrap();
    let second = mgr.create_website(draft("https://two.example", "Two"), &[]).unwrap();
    let mut filed = draft("https://three.example", "Three");
    filed.folder_id = Some(work.id.clone());
    let third = mgr.create_website(filed, &[]).unwrap();

    let root = mgr.list_websites(&WebsiteFilter::default()).unwrap();
    let ids: Vec<&str> = root.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);

    let in_work = mgr
        .list_websites(&WebsiteFilter {
            folder: FolderScope::Folder(work.id.clone()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(in_work.len(), 1);
    assert_eq!(in_work[0].id, third.id);

    let everywhere = mgr
        .list_websites(&WebsiteFilter {
            folder: FolderScope::Any,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(everywhere.len(), 3);
}

#[test]
fn test_list_filters_type_and_favorites() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);

    let mut video = draft("https://youtu.be/abc123", "Talk");
    video.content_type = ContentType::Youtube;
    video.embed_id = Some("abc123".to_string());
    let video = mgr.create_website(video, &[]).unwrap();
    let page = mgr.create_website(draft("https://example.com", "Page"), &[]).unwrap();
    mgr.update_website(
        &page.id,
        &WebsiteUpdate {
            is_favorite: Some(true),
            ..Default::default()
        },
    )
    .unwrap();

    let videos = mgr
        .list_websites(&WebsiteFilter {
            content_type: Some(ContentType::Youtube),
            folder: FolderScope::Any,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].id, video.id);

    let favorites = mgr
        .list_websites(&WebsiteFilter {
            favorites_only: true,
            folder: FolderScope::Any,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, page.id);
}

#[rstest]
#[case("rust", 1)]
#[case("RUST", 1)]
#[case("guide", 1)]
#[case("tutorial", 1)]
#[case("", 2)]
#[case("nothing-matches", 0)]
fn test_list_search(#[case] search: &str, #[case] expected: usize) {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);

    let mut book = draft("https://doc.rust-lang.org/book", "The Rust Book");
    book.description = "An introductory guide".to_string();
    mgr.create_website(book, &tags(&["Tutorial"])).unwrap();
    mgr.create_website(draft("https://example.com", "Example"), &[]).unwrap();

    let found = mgr
        .list_websites(&WebsiteFilter {
            search: Some(search.to_string()),
            folder: FolderScope::Any,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(found.len(), expected);
}

#[test]
fn test_update_merges_fields() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);
    let saved = mgr
        .create_website(draft("https://example.com", "Example"), &tags(&["rust"]))
        .unwrap();

    let update = WebsiteUpdate {
        title: Some("Renamed".to_string()),
        tags: Some(tags(&[" Go ", "", "WASM"])),
        view_count: Some(-5),
        ..Default::default()
    };
    let updated = mgr.update_website(&saved.id, &update).unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.url, saved.url);
    assert_eq!(updated.tags, vec!["go", "wasm"]);
    assert_eq!(updated.view_count, 0);

    // Updating tags does not touch usage counters.
    let tag_mgr = TagManager::new(db.connection(), OWNER);
    assert!(tag_mgr.get_tag("go").unwrap().is_none());
    assert_eq!(tag_mgr.get_tag("rust").unwrap().unwrap().usage_count, 1);
}

#[test]
fn test_update_clears_folder_and_schedule_with_null() {
    let db = Database::open_in_memory().unwrap();
    let work = FolderManager::new(db.connection(), OWNER)
        .create_folder(&NewFolder {
            name: "Work".to_string(),
            ..Default::default()
        })
        .unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);

    let mut input = draft("https://example.com", "Example");
    input.folder_id = Some(work.id.clone());
    input.scheduled_for = Some(Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap());
    let saved = mgr.create_website(input, &[]).unwrap();

    let update: WebsiteUpdate =
        serde_json::from_str(r#"{"folderId": null, "scheduledFor": null}"#).unwrap();
    let updated = mgr.update_website(&saved.id, &update).unwrap();
    assert_eq!(updated.folder_id, None);
    assert_eq!(updated.scheduled_for, None);
}

#[rstest]
#[case(r#"{"folderId": ""}"#)]
#[case(r#"{"folderId": "null"}"#)]
#[case(r#"{"folderId": " null "}"#)]
fn test_update_root_sentinels_move_to_root(#[case] body: &str) {
    let db = Database::open_in_memory().unwrap();
    let work = FolderManager::new(db.connection(), OWNER)
        .create_folder(&NewFolder {
            name: "Work".to_string(),
            ..Default::default()
        })
        .unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);

    let mut input = draft("https://example.com", "Example");
    input.folder_id = Some(work.id.clone());
    let saved = mgr.create_website(input, &[]).unwrap();

    let update: WebsiteUpdate = serde_json::from_str(body).unwrap();
    let updated = mgr.update_website(&saved.id, &update).unwrap();
    assert_eq!(updated.folder_id, None);
}

#[test]
fn test_update_moves_into_folder_and_schedules() {
    let db = Database::open_in_memory().unwrap();
    let work = FolderManager::new(db.connection(), OWNER)
        .create_folder(&NewFolder {
            name: "Work".to_string(),
            ..Default::default()
        })
        .unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);
    let saved = mgr.create_website(draft("https://example.com", "Example"), &[]).unwrap();

    let update: WebsiteUpdate = serde_json::from_value(serde_json::json!({
        "folderId": work.id,
        "scheduledFor": "2030-06-01T08:30",
    }))
    .unwrap();
    let updated = mgr.update_website(&saved.id, &update).unwrap();
    assert_eq!(updated.folder_id.as_deref(), Some(work.id.as_str()));
    assert_eq!(updated.scheduled_for, Some(Utc.with_ymd_and_hms(2030, 6, 1, 8, 30, 0).unwrap()));
}

#[test]
fn test_update_rejects_bad_input() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);
    let saved = mgr.create_website(draft("https://example.com", "Example"), &[]).unwrap();
    mgr.create_website(draft("https://taken.example", "Taken"), &[]).unwrap();

    let blank = WebsiteUpdate {
        url: Some("  ".to_string()),
        ..Default::default()
    };
    assert!(matches!(mgr.update_website(&saved.id, &blank), Err(WebsiteError::MissingUrl)));

    let taken = WebsiteUpdate {
        url: Some("https://taken.example".to_string()),
        ..Default::default()
    };
    assert!(matches!(mgr.update_website(&saved.id, &taken), Err(WebsiteError::UrlTaken(_))));

    let bad_folder = WebsiteUpdate {
        folder_id: Some(Some("missing".to_string())),
        ..Default::default()
    };
    assert!(matches!(
        mgr.update_website(&saved.id, &bad_folder),
        Err(WebsiteError::FolderNotFound(_))
    ));

    let bad_date = WebsiteUpdate {
        scheduled_for: Some(Some("next tuesday".to_string())),
        ..Default::default()
    };
    assert!(matches!(
        mgr.update_website(&saved.id, &bad_date),
        Err(WebsiteError::InvalidSchedule(_))
    ));

    assert!(matches!(
        mgr.update_website("missing", &WebsiteUpdate::default()),
        Err(WebsiteError::NotFound(_))
    ));
}

#[test]
fn test_replace_swaps_entry() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);
    let old = mgr.create_website(draft("https://example.com", "Old"), &[]).unwrap();

    let fresh = mgr
        .replace_website(&old.id, draft("https://example.com", "Fresh"), &tags(&["new"]))
        .unwrap();
    assert_ne!(fresh.id, old.id);
    assert_eq!(fresh.title, "Fresh");
    assert!(matches!(mgr.get_website(&old.id), Err(WebsiteError::NotFound(_))));
    assert_eq!(mgr.list_websites(&WebsiteFilter::default()).unwrap().len(), 1);
}

#[test]
fn test_replace_missing_entry_still_inserts() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);
    let fresh = mgr
        .replace_website("gone", draft("https://example.com", "Fresh"), &[])
        .unwrap();
    assert_eq!(fresh.url, "https://example.com");
}

#[test]
fn test_replace_conflict_keeps_old_entry() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);
    let old = mgr.create_website(draft("https://old.example", "Old"), &[]).unwrap();
    let other = mgr.create_website(draft("https://other.example", "Other"), &[]).unwrap();

    let result = mgr.replace_website(&old.id, draft("https://other.example", "Clash"), &[]);
    match result {
        Err(WebsiteError::DuplicateUrl(existing)) => assert_eq!(existing.id, other.id),
        other => panic!("expected DuplicateUrl, got {:?}", other.map(|w| w.id)),
    }
    assert!(mgr.get_website(&old.id).is_ok());
}

#[test]
fn test_delete_and_record_view() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = WebsiteManager::new(db.connection(), OWNER);
    let saved = mgr.create_website(draft("https://example.com", "Example"), &[]).unwrap();

    assert_eq!(mgr.record_view(&saved.id).unwrap().view_count, 1);
    assert_eq!(mgr.record_view(&saved.id).unwrap().view_count, 2);

    mgr.delete_website(&saved.id).unwrap();
    assert!(matches!(mgr.delete_website(&saved.id), Err(WebsiteError::NotFound(_))));
    assert!(matches!(mgr.record_view(&saved.id), Err(WebsiteError::NotFound(_))));
}

#[test]
fn test_due_reminders_across_owners_and_marked_once() {
    let db = Database::open_in_memory().unwrap();
    let now = Utc::now();

    let mut due = draft("https://due.example", "Due");
    due.scheduled_for = Some(now - Duration::hours(1));
    let due = WebsiteManager::new(db.connection(), OWNER).create_website(due, &[]).unwrap();

    let mut also_due = draft("https://also.example", "Also due");
    also_due.scheduled_for = Some(now - Duration::hours(2));
    let also_due = WebsiteManager::new(db.connection(), "ben@example.com")
        .create_website(also_due, &[])
        .unwrap();

    let mut later = draft("https://later.example", "Later");
    later.scheduled_for = Some(now + Duration::days(1));
    WebsiteManager::new(db.connection(), OWNER).create_website(later, &[]).unwrap();

    let found = due_reminders(db.connection(), now.timestamp_millis()).unwrap();
    let ids: Vec<&str> = found.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec![also_due.id.as_str(), due.id.as_str()]);

    assert!(mark_reminder_sent(db.connection(), &due.id).unwrap());
    assert!(!mark_reminder_sent(db.connection(), &due.id).unwrap());

    let remaining = due_reminders(db.connection(), now.timestamp_millis()).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, also_due.id);
}
