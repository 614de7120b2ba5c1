//! Unit tests for FolderManager: hierarchy paths, sibling uniqueness,
//! counts, forest assembly, deletion rules and breadcrumbs.

use savekar::database::Database;
use savekar::managers::folder_manager::{FolderManager, FolderManagerTrait};
use savekar::managers::website_manager::{WebsiteManager, WebsiteManagerTrait};
use savekar::types::errors::FolderError;
use savekar::types::folder::{FolderUpdate, NewFolder, DEFAULT_FOLDER_ICON, PALETTE};
use savekar::types::website::{ContentType, FolderScope, WebsiteDraft, WebsiteFilter};

const OWNER: &str = "ana@example.com";

fn folder(name: &str, parent_id: Option<&str>) -> NewFolder {
    NewFolder {
        name: name.to_string(),
        parent_id: parent_id.map(str::to_string),
        ..Default::default()
    }
}

fn draft(url: &str, folder_id: Option<&str>) -> WebsiteDraft {
    WebsiteDraft {
        url: url.to_string(),
        content_type: ContentType::Website,
        embed_id: None,
        title: "Saved page".to_string(),
        description: String::new(),
        thumbnail: String::new(),
        folder_id: folder_id.map(str::to_string),
        scheduled_for: None,
    }
}

#[test]
fn test_create_root_folder() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let work = mgr.create_folder(&folder("Work", None)).unwrap();
    assert_eq!(work.name, "Work");
    assert_eq!(work.path, "/Work");
    assert_eq!(work.level, 0);
    assert_eq!(work.parent_id, None);
    assert_eq!(work.owner_id, OWNER);
    assert_eq!(work.icon, DEFAULT_FOLDER_ICON);
    assert!(work.is_expanded);
    assert!(PALETTE.contains(&work.color.as_str()));
}

#[test]
fn test_create_nested_folder_derives_path_and_level() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let work = mgr.create_folder(&folder("Work", None)).unwrap();
    let projects = mgr.create_folder(&folder("Projects", Some(&work.id))).unwrap();
    assert_eq!(projects.path, "/Work/Projects");
    assert_eq!(projects.level, 1);
    assert_eq!(projects.parent_id.as_deref(), Some(work.id.as_str()));

    let rust = mgr.create_folder(&folder("Rust", Some(&projects.id))).unwrap();
    assert_eq!(rust.path, "/Work/Projects/Rust");
    assert_eq!(rust.level, 2);
}

#[test]
fn test_create_keeps_explicit_color_and_icon() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let input = NewFolder {
        name: "Reading".to_string(),
        parent_id: None,
        color: Some("#123456".to_string()),
        icon: Some("book".to_string()),
    };
    let created = mgr.create_folder(&input).unwrap();
    assert_eq!(created.color, "#123456");
    assert_eq!(created.icon, "book");
}

#[test]
fn test_create_trims_name_and_rejects_blank() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let created = mgr.create_folder(&folder("  Work  ", None)).unwrap();
    assert_eq!(created.name, "Work");

    let result = mgr.create_folder(&folder("   ", None));
    assert!(matches!(result, Err(FolderError::EmptyName)));
}

#[test]
fn test_create_with_unknown_parent_fails() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let result = mgr.create_folder(&folder("Orphan", Some("missing")));
    assert!(matches!(result, Err(FolderError::ParentNotFound(_))));
}

#[test]
fn test_duplicate_sibling_name_rejected() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let work = mgr.create_folder(&folder("Work", None)).unwrap();
    assert!(matches!(
        mgr.create_folder(&folder("Work", None)),
        Err(FolderError::DuplicateName(_))
    ));

    mgr.create_folder(&folder("Notes", Some(&work.id))).unwrap();
    assert!(matches!(
        mgr.create_folder(&folder("Notes", Some(&work.id))),
        Err(FolderError::DuplicateName(_))
    ));
}

#[test]
fn test_same_name_allowed_under_different_parents() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let work = mgr.create_folder(&folder("Work", None)).unwrap();
    let home = mgr.create_folder(&folder("Home", None)).unwrap();
    mgr.create_folder(&folder("Notes", Some(&work.id))).unwrap();
    mgr.create_folder(&folder("Notes", Some(&home.id))).unwrap();
    // Root level is a distinct sibling set too.
    mgr.create_folder(&folder("Notes", None)).unwrap();
}

#[test]
fn test_folders_are_owner_scoped() {
    let db = Database::open_in_memory().unwrap();
    let work = FolderManager::new(db.connection(), OWNER)
        .create_folder(&folder("Work", None))
        .unwrap();

    let mut other = FolderManager::new(db.connection(), "ben@example.com");
    assert!(matches!(other.get_folder(&work.id), Err(FolderError::NotFound(_))));
    assert!(other.list_folders(None).unwrap().is_empty());
    // Same name is fine for another owner.
    other.create_folder(&folder("Work", None)).unwrap();
    // Another owner's folder cannot be used as a parent.
    assert!(matches!(
        other.create_folder(&folder("Sub", Some(&work.id))),
        Err(FolderError::ParentNotFound(_))
    ));
}

#[test]
fn test_list_folders_by_parent_with_counts() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let work = mgr.create_folder(&folder("Work", None)).unwrap();
    mgr.create_folder(&folder("Archive", None)).unwrap();
    let projects = mgr.create_folder(&folder("Projects", Some(&work.id))).unwrap();

    let mut websites = WebsiteManager::new(db.connection(), OWNER);
    websites.create_website(draft("https://a.example", Some(&work.id)), &[]).unwrap();
    websites.create_website(draft("https://b.example", Some(&work.id)), &[]).unwrap();
    websites.create_website(draft("https://c.example", Some(&projects.id)), &[]).unwrap();

    let roots = mgr.list_folders(None).unwrap();
    let names: Vec<&str> = roots.iter().map(|f| f.folder.name.as_str()).collect();
    assert_eq!(names, vec!["Archive", "Work"]);

    let work_entry = roots.iter().find(|f| f.folder.id == work.id).unwrap();
    assert_eq!(work_entry.website_count, 2);
    assert_eq!(work_entry.subfolder_count, 1);

    let children = mgr.list_folders(Some(&work.id)).unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].folder.id, projects.id);
    assert_eq!(children[0].website_count, 1);
    assert_eq!(children[0].subfolder_count, 0);
}

#[test]
fn test_folder_tree_nests_children_and_counts_root_websites() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let work = mgr.create_folder(&folder("Work", None)).unwrap();
    let projects = mgr.create_folder(&folder("Projects", Some(&work.id))).unwrap();
    mgr.create_folder(&folder("Rust", Some(&projects.id))).unwrap();
    mgr.create_folder(&folder("Home", None)).unwrap();

    let mut websites = WebsiteManager::new(db.connection(), OWNER);
    websites.create_website(draft("https://root.example", None), &[]).unwrap();
    websites.create_website(draft("https://p.example", Some(&projects.id)), &[]).unwrap();

    let tree = mgr.folder_tree().unwrap();
    assert_eq!(tree.root_website_count, 1);
    assert_eq!(tree.folder_count(), 4);
    assert_eq!(tree.tree.len(), 2);

    let work_node = tree.tree.iter().find(|n| n.folder.id == work.id).unwrap();
    assert_eq!(work_node.website_count, 0);
    assert_eq!(work_node.children.len(), 1);
    let projects_node = &work_node.children[0];
    assert_eq!(projects_node.folder.id, projects.id);
    assert_eq!(projects_node.website_count, 1);
    assert_eq!(projects_node.children[0].folder.name, "Rust");
}

#[test]
fn test_empty_tree() {
    let db = Database::open_in_memory().unwrap();
    let mgr = FolderManager::new(db.connection(), OWNER);

    let tree = mgr.folder_tree().unwrap();
    assert!(tree.tree.is_empty());
    assert_eq!(tree.root_website_count, 0);
}

#[test]
fn test_update_folder_fields() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);
    let work = mgr.create_folder(&folder("Work", None)).unwrap();

    let update = FolderUpdate {
        color: Some("#000000".to_string()),
        is_expanded: Some(false),
        ..Default::default()
    };
    let updated = mgr.update_folder(&work.id, &update).unwrap();
    assert_eq!(updated.name, "Work");
    assert_eq!(updated.color, "#000000");
    assert!(!updated.is_expanded);
    assert_eq!(updated.icon, work.icon);
}

#[test]
fn test_rename_does_not_rewrite_descendant_paths() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let work = mgr.create_folder(&folder("Work", None)).unwrap();
    let projects = mgr.create_folder(&folder("Projects", Some(&work.id))).unwrap();

    let renamed = mgr
        .update_folder(
            &work.id,
            &FolderUpdate {
                name: Some("Job".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Job");
    // The folder's own path is left as created.
    assert_eq!(renamed.path, "/Work");

    let child = mgr.get_folder(&projects.id).unwrap();
    assert_eq!(child.path, "/Work/Projects");
    assert_eq!(child.level, 1);
}

#[test]
fn test_rename_to_sibling_name_conflicts() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    mgr.create_folder(&folder("Work", None)).unwrap();
    let home = mgr.create_folder(&folder("Home", None)).unwrap();

    let result = mgr.update_folder(
        &home.id,
        &FolderUpdate {
            name: Some("Work".to_string()),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(FolderError::DuplicateName(_))));
}

#[test]
fn test_update_missing_folder() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);
    let result = mgr.update_folder("missing", &FolderUpdate::default());
    assert!(matches!(result, Err(FolderError::NotFound(_))));
}

#[test]
fn test_delete_folder_with_subfolders_rejected() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let work = mgr.create_folder(&folder("Work", None)).unwrap();
    let projects = mgr.create_folder(&folder("Projects", Some(&work.id))).unwrap();
    let mut websites = WebsiteManager::new(db.connection(), OWNER);
    let saved = websites
        .create_website(draft("https://a.example", Some(&work.id)), &[])
        .unwrap();

    let result = mgr.delete_folder(&work.id);
    assert!(matches!(result, Err(FolderError::HasSubfolders(_))));

    let kept = mgr.get_folder(&work.id).unwrap();
    assert_eq!(kept.id, work.id);
    let child = mgr.get_folder(&projects.id).unwrap();
    assert_eq!(child.parent_id.as_deref(), Some(work.id.as_str()));
    let unmoved = websites.get_website(&saved.id).unwrap();
    assert_eq!(unmoved.folder_id.as_deref(), Some(work.id.as_str()));
    assert_eq!(unmoved.updated_at, saved.updated_at);
}

#[test]
fn test_delete_folder_moves_websites_to_root() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);
    let work = mgr.create_folder(&folder("Work", None)).unwrap();

    let mut websites = WebsiteManager::new(db.connection(), OWNER);
    let saved = websites
        .create_website(draft("https://a.example", Some(&work.id)), &[])
        .unwrap();

    mgr.delete_folder(&work.id).unwrap();
    assert!(matches!(mgr.get_folder(&work.id), Err(FolderError::NotFound(_))));

    let moved = websites.get_website(&saved.id).unwrap();
    assert_eq!(moved.folder_id, None);
    let at_root = websites
        .list_websites(&WebsiteFilter {
            folder: FolderScope::Root,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(at_root.len(), 1);
}

#[test]
fn test_delete_missing_folder() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);
    assert!(matches!(mgr.delete_folder("missing"), Err(FolderError::NotFound(_))));
}

#[test]
fn test_breadcrumb_root_only() {
    let db = Database::open_in_memory().unwrap();
    let mgr = FolderManager::new(db.connection(), OWNER);

    let crumbs = mgr.breadcrumb(None).unwrap();
    assert_eq!(crumbs.len(), 1);
    assert_eq!(crumbs[0].id, None);
    assert_eq!(crumbs[0].name, "Home");
    assert_eq!(crumbs[0].path, "/");
}

#[test]
fn test_breadcrumb_chain() {
    let db = Database::open_in_memory().unwrap();
    let mut mgr = FolderManager::new(db.connection(), OWNER);

    let work = mgr.create_folder(&folder("Work", None)).unwrap();
    let projects = mgr.create_folder(&folder("Projects", Some(&work.id))).unwrap();

    let crumbs = mgr.breadcrumb(Some(&projects.id)).unwrap();
    let names: Vec<&str> = crumbs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Home", "Work", "Projects"]);
    assert_eq!(crumbs[1].id.as_deref(), Some(work.id.as_str()));
    assert_eq!(crumbs[2].path, "/Work/Projects");
}

#[test]
fn test_breadcrumb_unknown_folder() {
    let db = Database::open_in_memory().unwrap();
    let mgr = FolderManager::new(db.connection(), OWNER);
    assert!(matches!(mgr.breadcrumb(Some("missing")), Err(FolderError::NotFound(_))));
}
