//! Item Store
//!
//! Loads every serialized item under a root directory into an in-memory index and answers
//! identity, hierarchy and template queries against it. New items are written to their own
//! file before they join the index.
//!
//! Items live in an append-only arena addressed by position; the id, path and parent indexes
//! point into it. Id and path matching is case-insensitive, template matching is exact.

pub mod loader;

use crate::error::StorageError;
use crate::item::{ItemCodec, ItemLayout, SerializedItem, TextItemCodec};
use crate::types::{fold_key, DEFAULT_LANGUAGE};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub use loader::LoadReport;

/// Deepest descendant walk `get_items` performs before giving up
pub const MAX_HIERARCHY_DEPTH: usize = 512;

/// Arena of items plus lookup indexes
#[derive(Default)]
pub(crate) struct ItemIndex {
    items: Vec<Arc<SerializedItem>>,
    /// Folded id -> first item with that id
    by_id: HashMap<String, usize>,
    /// Folded path -> first item with that path
    by_path: HashMap<String, usize>,
    /// Folded parent id -> children in insertion order
    children: HashMap<String, Vec<usize>>,
}

impl ItemIndex {
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(&fold_key(id))
    }

    /// Append an item. The id and path indexes keep the first item seen for a key.
    pub(crate) fn push(&mut self, item: Arc<SerializedItem>) {
        let handle = self.items.len();
        self.by_id.entry(fold_key(&item.id)).or_insert(handle);
        self.by_path.entry(fold_key(&item.path)).or_insert(handle);
        self.children
            .entry(fold_key(&item.parent_id))
            .or_default()
            .push(handle);
        self.items.push(item);
    }

    /// First item whose id or path matches `key`
    fn find(&self, key: &str) -> Option<usize> {
        let key = fold_key(key);
        match (self.by_id.get(&key), self.by_path.get(&key)) {
            (Some(a), Some(b)) => Some(*a.min(b)),
            (Some(a), None) | (None, Some(a)) => Some(*a),
            (None, None) => None,
        }
    }

    /// Matching item, provided it has a version in `language`
    fn lookup(&self, key: &str, language: &str) -> Option<&Arc<SerializedItem>> {
        let item = &self.items[self.find(key)?];
        if item.has_language(language) {
            Some(item)
        } else {
            None
        }
    }

    fn children_of(&self, parent: &SerializedItem) -> Vec<Arc<SerializedItem>> {
        self.children
            .get(&fold_key(&parent.id))
            .map(|handles| handles.iter().map(|h| self.items[*h].clone()).collect())
            .unwrap_or_default()
    }

    fn collect_descendants(
        &self,
        key: &str,
        language: &str,
        depth: usize,
        out: &mut Vec<Arc<SerializedItem>>,
    ) -> Result<(), StorageError> {
        if depth > MAX_HIERARCHY_DEPTH {
            return Err(StorageError::HierarchyTooDeep {
                key: key.to_string(),
                limit: MAX_HIERARCHY_DEPTH,
            });
        }
        let Some(item) = self.lookup(key, language) else {
            return Ok(());
        };
        for child in self.children_of(item) {
            out.push(child.clone());
            self.collect_descendants(&child.id, language, depth + 1, out)?;
        }
        Ok(())
    }
}

/// In-memory store of the serialized items under one root directory
pub struct ItemStore {
    layout: ItemLayout,
    codec: Arc<dyn ItemCodec>,
    language: String,
    index: RwLock<ItemIndex>,
}

impl ItemStore {
    /// Open `root`, resolving a relative path against the current directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base = std::env::current_dir().map_err(|e| StorageError::io(".", e))?;
        Self::open_with_base(root, base)
    }

    /// Open `root`, resolving a relative path against `base`
    pub fn open_with_base(
        root: impl AsRef<Path>,
        base: impl AsRef<Path>,
    ) -> Result<Self, StorageError> {
        Self::open_with_codec(root, base, Arc::new(TextItemCodec))
    }

    /// Open `root` reading and writing item files through `codec`
    pub fn open_with_codec(
        root: impl AsRef<Path>,
        base: impl AsRef<Path>,
        codec: Arc<dyn ItemCodec>,
    ) -> Result<Self, StorageError> {
        let root = resolve_root(root.as_ref(), base.as_ref())?;

        let mut index = ItemIndex::default();
        let report = loader::load_tree(&root, codec.as_ref(), &mut index);
        info!(
            root = %root.display(),
            loaded = report.loaded,
            duplicates = report.duplicates,
            unreadable = report.unreadable,
            "Loaded serialized items"
        );

        Ok(Self {
            layout: ItemLayout::new(root),
            codec,
            language: DEFAULT_LANGUAGE.to_string(),
            index: RwLock::new(index),
        })
    }

    /// Use `language` for lookups that do not name one
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an item with this id is indexed, in any language
    pub fn contains_id(&self, id: &str) -> bool {
        self.index.read().contains_id(id)
    }

    /// Item by id or path in the default language
    pub fn get_item(&self, key: &str) -> Option<Arc<SerializedItem>> {
        self.get_item_in_language(key, &self.language)
    }

    /// Item by id or path (case-insensitive).
    ///
    /// An item without a version in `language` is reported as absent.
    pub fn get_item_in_language(&self, key: &str, language: &str) -> Option<Arc<SerializedItem>> {
        self.index.read().lookup(key, language).cloned()
    }

    /// Direct children of the item at `key`, in load order
    pub fn get_children(&self, key: &str) -> Vec<Arc<SerializedItem>> {
        self.get_children_in_language(key, &self.language)
    }

    /// Direct children of the item at `key`, resolving `key` in `language`
    pub fn get_children_in_language(&self, key: &str, language: &str) -> Vec<Arc<SerializedItem>> {
        let index = self.index.read();
        match index.lookup(key, language) {
            Some(item) => index.children_of(item),
            None => Vec::new(),
        }
    }

    /// All descendants of the item at `key`, depth-first pre-order
    pub fn get_items(&self, key: &str) -> Result<Vec<Arc<SerializedItem>>, StorageError> {
        let index = self.index.read();
        let mut out = Vec::new();
        index.collect_descendants(key, &self.language, 0, &mut out)?;
        Ok(out)
    }

    /// Items whose template id equals `template_id` exactly (case-sensitive)
    pub fn get_items_with_template(&self, template_id: &str) -> Vec<Arc<SerializedItem>> {
        self.index
            .read()
            .items
            .iter()
            .filter(|item| item.template_id == template_id)
            .cloned()
            .collect()
    }

    /// File that holds (or would hold) `item`
    pub fn file_path(&self, item: &SerializedItem) -> PathBuf {
        self.layout.file_path(&item.database_name, &item.path)
    }

    /// Write `item` to a new file and add it to the index.
    ///
    /// Fails with `DuplicateId` if the id is already indexed and with `AlreadyExists` if a
    /// file occupies the target path; the index only changes once the file is fully written.
    pub fn create_item(&self, item: SerializedItem) -> Result<Arc<SerializedItem>, StorageError> {
        if self.index.read().contains_id(&item.id) {
            return Err(StorageError::DuplicateId(item.id));
        }
        let target = self.file_path(&item);
        let text = self.codec.encode(&item)?;

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError::AlreadyExists(target.clone()),
                _ => StorageError::io(&target, e),
            })?;

        if let Err(e) = file.write_all(text.as_bytes()).and_then(|_| file.sync_all()) {
            drop(file);
            discard_file(&target);
            return Err(StorageError::io(&target, e));
        }
        drop(file);

        let item = Arc::new(item);
        {
            let mut index = self.index.write();
            // A concurrent create may have claimed the id while the file was written
            if index.contains_id(&item.id) {
                drop(index);
                discard_file(&target);
                return Err(StorageError::DuplicateId(item.id.clone()));
            }
            index.push(item.clone());
        }
        info!(id = %item.id, path = %item.path, file = %target.display(), "Created item");
        Ok(item)
    }
}

fn discard_file(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(
            "Failed to remove discarded item file {}: {}",
            path.display(),
            e
        );
    }
}

fn resolve_root(root: &Path, base: &Path) -> Result<PathBuf, StorageError> {
    let resolved = if root.is_absolute() {
        root.to_path_buf()
    } else {
        base.join(root)
    };
    if !resolved.is_dir() {
        return Err(StorageError::RootNotFound {
            path: resolved,
            base: base.to_path_buf(),
        });
    }
    dunce::canonicalize(&resolved).map_err(|e| StorageError::io(&resolved, e))
}
