use crate::integration::support::{id, item, sample_tree, write_item, write_item_at};
use serialdb::{ItemStore, StorageError};
use std::fs;
use tempfile::TempDir;

#[test]
fn loads_every_item_file_in_the_tree() {
    let temp = TempDir::new().unwrap();
    let items = sample_tree(temp.path());

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(store.len(), items.len());
    for expected in &items {
        let loaded = store.get_item(&expected.id).unwrap();
        assert_eq!(*loaded, *expected);
    }
}

#[test]
fn missing_root_is_not_found() {
    let temp = TempDir::new().unwrap();
    let result = ItemStore::open_with_base("serialization", temp.path());
    match result {
        Err(StorageError::RootNotFound { path, base }) => {
            assert_eq!(path, temp.path().join("serialization"));
            assert_eq!(base, temp.path());
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected RootNotFound"),
    }
}

#[test]
fn relative_root_resolves_against_base() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("serialization");
    sample_tree(&root);

    let store = ItemStore::open_with_base("serialization", temp.path()).unwrap();
    assert_eq!(store.len(), 10);
    assert!(store.root().ends_with("serialization"));
}

#[test]
fn empty_root_loads_nothing() {
    let temp = TempDir::new().unwrap();
    let store = ItemStore::open(temp.path()).unwrap();
    assert!(store.is_empty());
}

#[test]
fn first_file_with_an_id_wins() {
    let temp = TempDir::new().unwrap();
    let first = item(1, "/sitecore/first", None);
    let mut second = item(1, "/sitecore/second", None);
    second.name = "second".to_string();
    write_item_at(&temp.path().join("master/a.item"), &first);
    write_item_at(&temp.path().join("master/b.item"), &second);

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get_item(&id(1)).unwrap().path, "/sitecore/first");
    assert!(store.get_item("/sitecore/second").is_none());
}

#[test]
fn duplicate_ids_differing_only_in_case_are_duplicates() {
    let temp = TempDir::new().unwrap();
    let first = item(0xabc, "/x", None);
    let mut second = item(0xabc, "/y", None);
    second.id = second.id.to_lowercase();
    write_item_at(&temp.path().join("a.item"), &first);
    write_item_at(&temp.path().join("b.item"), &second);

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn files_load_before_subdirectories() {
    let temp = TempDir::new().unwrap();
    // "a" sorts before "z.item" but files in a directory come first
    let nested = item(1, "/nested", None);
    let mut top = item(1, "/top", None);
    top.name = "top".to_string();
    write_item_at(&temp.path().join("a/nested.item"), &nested);
    write_item_at(&temp.path().join("z.item"), &top);

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(store.get_item(&id(1)).unwrap().path, "/top");
}

#[test]
fn templates_directory_loads_before_its_siblings() {
    let temp = TempDir::new().unwrap();
    let in_content = item(1, "/from-content", None);
    let in_templates = item(1, "/from-templates", None);
    write_item_at(&temp.path().join("master/content/x.item"), &in_content);
    // "content" sorts ahead of "templates", so only the priority pass puts templates first
    write_item_at(&temp.path().join("master/templates/x.item"), &in_templates);

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(store.get_item(&id(1)).unwrap().path, "/from-templates");
}

#[test]
fn template_items_index_ahead_of_content() {
    let temp = TempDir::new().unwrap();
    let items = sample_tree(temp.path());
    write_item(
        temp.path(),
        &item(0x55, "/sitecore/templates/Extra", Some(9)),
    );
    let store = ItemStore::open(temp.path()).unwrap();

    // Index order shows through the template scan
    let using_sample = store.get_items_with_template(&items[0].template_id);
    let paths: Vec<_> = using_sample.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/sitecore",
            "/sitecore/content",
            "/sitecore/templates",
            "/sitecore/templates/Extra",
            "/sitecore/content/Home",
            "/sitecore/content/Home/A",
            "/sitecore/content/Home/B",
            "/sitecore/content/Home/C",
            "/sitecore/content/Home/A/A1",
            "/sitecore/content/Home/A/A2",
        ]
    );
}

#[test]
fn hidden_directories_are_skipped() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());
    write_item_at(&temp.path().join("master/.svn/ghost.item"), &item(0x99, "/ghost", None));
    write_item_at(
        &temp.path().join("master/sitecore/.cache/deep/ghost2.item"),
        &item(0x98, "/ghost2", None),
    );

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(store.len(), 10);
    assert!(store.get_item(&id(0x99)).is_none());
    assert!(store.get_item(&id(0x98)).is_none());
}

#[test]
fn unreadable_files_are_skipped() {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());
    let broken = temp.path().join("master/sitecore/content/Broken.item");
    fs::write(&broken, "this is not an item\n").unwrap();
    let truncated = temp.path().join("master/sitecore/content/Truncated.item");
    fs::write(&truncated, "----item----\nid: {X}\n\n----field----\nfield: {F}\ncontent-length: 50\n\nshort\n").unwrap();

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(store.len(), 10);
}

#[test]
fn other_extensions_are_ignored() {
    let temp = TempDir::new().unwrap();
    let path = write_item(temp.path(), &item(1, "/sitecore", None));
    fs::copy(&path, temp.path().join("master/sitecore.item.bak")).unwrap();
    fs::write(temp.path().join("master/readme.txt"), "notes").unwrap();

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(store.len(), 1);
}
