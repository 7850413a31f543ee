use crate::integration::support::{id, ids, item, sample_tree, write_item, SAMPLE_TEMPLATE};
use serialdb::{ItemStore, ItemVersion, StorageError};
use tempfile::TempDir;

fn sample_store() -> (TempDir, ItemStore) {
    let temp = TempDir::new().unwrap();
    sample_tree(temp.path());
    let store = ItemStore::open(temp.path()).unwrap();
    (temp, store)
}

#[test]
fn item_resolves_by_id_and_by_path() {
    let (_temp, store) = sample_store();
    let by_id = store.get_item(&id(3)).unwrap();
    let by_path = store.get_item("/sitecore/content/Home").unwrap();
    assert_eq!(by_id.id, by_path.id);
    assert_eq!(by_id.name, "Home");
}

#[test]
fn lookup_ignores_case() {
    let (_temp, store) = sample_store();
    let sample = id(SAMPLE_TEMPLATE);
    assert_ne!(sample, sample.to_lowercase());
    assert_eq!(store.get_item(&sample.to_lowercase()).unwrap().id, sample);
    assert_eq!(store.get_item("/SITECORE/Content/home").unwrap().id, id(3));
}

#[test]
fn lookup_ignores_case_beyond_ascii() {
    let temp = TempDir::new().unwrap();
    write_item(temp.path(), &item(1, "/ΟΔΟΣ", None));

    let store = ItemStore::open(temp.path()).unwrap();
    assert!(store.get_item("/ΟΔΟΣ").is_some());
    assert!(store.get_item("/οδοσ").is_some());
    assert!(store.get_item("/οδος").is_some());
}

#[test]
fn unknown_key_is_absent() {
    let (_temp, store) = sample_store();
    assert!(store.get_item(&id(0x404)).is_none());
    assert!(store.get_item("/sitecore/content/Nowhere").is_none());
}

#[test]
fn item_without_version_in_language_is_absent() {
    let (_temp, store) = sample_store();
    assert!(store.get_item_in_language(&id(3), "en").is_some());
    assert!(store.get_item_in_language(&id(3), "EN").is_some());
    assert!(store.get_item_in_language(&id(3), "fr").is_none());
}

#[test]
fn item_with_no_versions_is_invisible() {
    let temp = TempDir::new().unwrap();
    let mut bare = item(1, "/bare", None);
    bare.versions.clear();
    write_item(temp.path(), &bare);

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.get_item(&id(1)).is_none());
}

#[test]
fn default_language_can_be_changed() {
    let temp = TempDir::new().unwrap();
    let mut danish = item(1, "/dansk", None);
    danish.versions = vec![ItemVersion::new("da", 1)];
    write_item(temp.path(), &danish);

    let store = ItemStore::open(temp.path()).unwrap();
    assert!(store.get_item(&id(1)).is_none());

    let store = store.with_language("da");
    assert_eq!(store.language(), "da");
    assert!(store.get_item(&id(1)).is_some());
}

#[test]
fn children_in_load_order() {
    let (_temp, store) = sample_store();
    let children = store.get_children("/sitecore/content/Home");
    assert_eq!(ids(&children), vec![id(4), id(7), id(8)]);
}

#[test]
fn children_of_missing_item_are_empty() {
    let (_temp, store) = sample_store();
    assert!(store.get_children(&id(0x404)).is_empty());
    assert!(store.get_children_in_language(&id(3), "fr").is_empty());
}

#[test]
fn children_of_a_leaf_are_empty() {
    let (_temp, store) = sample_store();
    assert!(store.get_children(&id(8)).is_empty());
}

#[test]
fn children_snapshot_does_not_see_later_items() {
    let (_temp, store) = sample_store();
    let before = store.get_children(&id(3));

    store
        .create_item(item(0xd, "/sitecore/content/Home/D", Some(3)))
        .unwrap();

    assert_eq!(ids(&before), vec![id(4), id(7), id(8)]);
    assert_eq!(
        ids(&store.get_children(&id(3))),
        vec![id(4), id(7), id(8), id(0xd)]
    );
}

#[test]
fn descendants_are_pre_order() {
    let (_temp, store) = sample_store();
    let all = store.get_items("/sitecore/content/Home").unwrap();
    assert_eq!(ids(&all), vec![id(4), id(5), id(6), id(7), id(8)]);
}

#[test]
fn descendants_of_missing_item_are_empty() {
    let (_temp, store) = sample_store();
    assert!(store.get_items("/nowhere").unwrap().is_empty());
}

#[test]
fn parent_cycle_fails_descendant_walk() {
    let temp = TempDir::new().unwrap();
    write_item(temp.path(), &item(1, "/a", Some(2)));
    write_item(temp.path(), &item(2, "/b", Some(1)));

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(ids(&store.get_children(&id(1))), vec![id(2)]);
    assert!(matches!(
        store.get_items(&id(1)),
        Err(StorageError::HierarchyTooDeep { .. })
    ));
}

#[test]
fn template_scan_matches_exactly() {
    let (_temp, store) = sample_store();
    let template = id(SAMPLE_TEMPLATE);

    let matches = store.get_items_with_template(&template);
    assert_eq!(matches.len(), 9);
    assert!(matches.iter().all(|i| i.template_id == template));

    assert!(store.get_items_with_template(&template.to_lowercase()).is_empty());
    assert_eq!(ids(&store.get_items_with_template(&id(0xab))), vec![id(SAMPLE_TEMPLATE)]);
}

#[test]
fn template_scan_includes_items_in_any_language() {
    let (temp, store) = sample_store();
    drop(store);
    let mut french = item(0xf7, "/sitecore/content/Home/Fr", Some(3));
    french.versions = vec![ItemVersion::new("fr", 1)];
    write_item(temp.path(), &french);

    let store = ItemStore::open(temp.path()).unwrap();
    assert_eq!(store.get_items_with_template(&id(SAMPLE_TEMPLATE)).len(), 10);
}
