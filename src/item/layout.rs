//! Mapping between item paths and files under the serialization root.
//!
//! `/sitecore/content/Home` in database `master` lives at
//! `<root>/master/sitecore/content/Home.item`; its children live in the sibling
//! directory `<root>/master/sitecore/content/Home/`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension of serialized item files (without the dot)
pub const ITEM_EXTENSION: &str = "item";

/// Directory name whose contents load before any sibling directory
pub const TEMPLATES_DIR: &str = "templates";

const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\\'];

/// File layout rooted at a serialization directory
#[derive(Debug, Clone)]
pub struct ItemLayout {
    root: PathBuf,
}

impl ItemLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the item at `item_path` in `database`
    pub fn file_path(&self, database: &str, item_path: &str) -> PathBuf {
        let mut path = self.root.join(sanitize_segment(database));
        for segment in item_path.split('/').filter(|s| !s.is_empty()) {
            path.push(sanitize_segment(segment));
        }
        // Push rather than set_extension: item names may contain dots.
        let mut file: OsString = path.into_os_string();
        file.push(".");
        file.push(ITEM_EXTENSION);
        PathBuf::from(file)
    }

    pub fn is_item_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(ITEM_EXTENSION))
            .unwrap_or(false)
    }
}

fn sanitize_segment(segment: &str) -> String {
    match segment {
        "." => "_".to_string(),
        ".." => "__".to_string(),
        _ => segment
            .chars()
            .map(|c| if ILLEGAL_CHARS.contains(&c) || c.is_control() { '_' } else { c })
            .collect(),
    }
}
