//! Serialized Items
//!
//! The native record held by the item store, one per serialized file.

pub mod codec;
pub mod layout;

use crate::types::fold_key;
use serde::{Deserialize, Serialize};

pub use codec::{ItemCodec, TextItemCodec};
pub use layout::{ItemLayout, ITEM_EXTENSION};

/// A (field id, value) pair, with the display name and key the file carries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemField {
    pub field_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
    pub value: String,
}

impl ItemField {
    pub fn new(field_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            name: String::new(),
            key: String::new(),
            value: value.into(),
        }
    }

    /// Set the field name; the key is the lower-cased name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.key = self.name.to_lowercase();
        self
    }
}

/// Language-tagged, numbered snapshot of version-specific fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemVersion {
    pub language: String,
    pub version_number: u32,
    #[serde(default)]
    pub revision: String,
    pub fields: Vec<ItemField>,
}

impl ItemVersion {
    pub fn new(language: impl Into<String>, version_number: u32) -> Self {
        Self {
            language: language.into(),
            version_number,
            revision: String::new(),
            fields: Vec::new(),
        }
    }
}

/// Item record as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedItem {
    pub id: String,
    pub path: String,
    pub parent_id: String,
    pub branch_id: String,
    pub template_id: String,
    pub name: String,
    pub template_name: String,
    pub database_name: String,
    pub shared_fields: Vec<ItemField>,
    pub versions: Vec<ItemVersion>,
}

impl SerializedItem {
    /// Whether any version is in `language` (case-insensitive)
    pub fn has_language(&self, language: &str) -> bool {
        self.versions
            .iter()
            .any(|v| same_language(&v.language, language))
    }

    /// Versions in `language`, in stored order
    pub fn versions_in<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a ItemVersion> + 'a {
        self.versions
            .iter()
            .filter(move |v| same_language(&v.language, language))
    }

    /// Highest-numbered version in `language`
    pub fn latest_version<'a>(&'a self, language: &'a str) -> Option<&'a ItemVersion> {
        self.versions_in(language).max_by_key(|v| v.version_number)
    }
}

fn same_language(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || fold_key(a) == fold_key(b)
}
