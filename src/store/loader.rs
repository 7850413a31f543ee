//! Bulk load of a serialization tree.
//!
//! Each directory is handled in three steps: its item files, then a `templates`
//! subdirectory if present, then every other subdirectory. Entries are listed in file
//! name order, so when two files share an id the one that loads first is deterministic.
//! Hidden directories are skipped along with everything below them.

use super::ItemIndex;
use crate::item::layout::TEMPLATES_DIR;
use crate::item::{ItemCodec, ItemLayout};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Counts gathered while loading a tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Files whose id was already indexed
    pub duplicates: usize,
    /// Files that could not be read or decoded
    pub unreadable: usize,
}

pub(crate) fn load_tree(root: &Path, codec: &dyn ItemCodec, index: &mut ItemIndex) -> LoadReport {
    let mut report = LoadReport::default();
    load_directory(root, codec, index, &mut report);
    report
}

fn load_directory(dir: &Path, codec: &dyn ItemCodec, index: &mut ItemIndex, report: &mut LoadReport) {
    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to read directory entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let file_type = entry.file_type();
        if file_type.is_file() && ItemLayout::is_item_file(entry.path()) {
            files.push(entry.into_path());
        } else if file_type.is_dir() && !is_hidden(entry.path()) {
            subdirs.push(entry.into_path());
        }
    }

    for file in &files {
        load_item(file, codec, index, report);
    }

    let (templates, others): (Vec<PathBuf>, Vec<PathBuf>) =
        subdirs.into_iter().partition(|d| is_templates_dir(d));
    for subdir in &templates {
        load_directory(subdir, codec, index, report);
    }
    for subdir in &others {
        load_directory(subdir, codec, index, report);
    }
}

fn load_item(path: &Path, codec: &dyn ItemCodec, index: &mut ItemIndex, report: &mut LoadReport) {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read item file {}: {}", path.display(), e);
            report.unreadable += 1;
            return;
        }
    };

    let item = match codec.decode(text.trim_start_matches('\u{feff}')) {
        Ok(item) => item,
        Err(e) => {
            warn!("Failed to parse item file {}: {}", path.display(), e);
            report.unreadable += 1;
            return;
        }
    };

    if index.contains_id(&item.id) {
        debug!(id = %item.id, file = %path.display(), "Skipping duplicate item id");
        report.duplicates += 1;
        return;
    }

    index.push(Arc::new(item));
    report.loaded += 1;
}

fn is_templates_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.eq_ignore_ascii_case(TEMPLATES_DIR))
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(windows)]
fn is_hidden(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    let dotted = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false);
    dotted
        || fs::metadata(path)
            .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
            .unwrap_or(false)
}
