//! Host data-provider contract.
//!
//! Transfer objects and the read/write operations a content repository host calls on a
//! data provider. Identifiers on this side are `Uuid`s.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field value as the host sees it. Shared fields carry neither language nor version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDto {
    pub id: Uuid,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

/// Item as the host sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDto {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub name: String,
    pub parent_id: Uuid,
    pub template_id: Uuid,
    pub field_values: Vec<FieldDto>,
}

/// Outcome of a parent lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentId {
    /// The item has a parent
    Parent(Uuid),
    /// The item exists and sits at the top of the tree
    Root,
    /// No such item
    NotFound,
}

/// Read side of a data provider
pub trait DataProvider: Send + Sync {
    fn get_item(&self, id: Uuid) -> Result<Option<ItemDto>, ApiError>;
    fn get_parent_id(&self, id: Uuid) -> Result<ParentId, ApiError>;
    fn get_child_ids(&self, parent_id: Uuid) -> Result<Vec<Uuid>, ApiError>;
    fn get_template_item_ids(&self, template_id: Uuid) -> Result<Vec<Uuid>, ApiError>;
    fn get_items_in_workflow_state(&self, workflow_state_id: Uuid)
        -> Result<Vec<ItemDto>, ApiError>;
}

/// Write side of a data provider
pub trait WritableDataProvider: DataProvider {
    /// Create an item under `parent_id`. Returns whether the item was created.
    fn create_item(
        &self,
        id: Uuid,
        name: &str,
        template_id: Uuid,
        parent_id: Uuid,
    ) -> Result<bool, ApiError>;
    fn delete_item(&self, id: Uuid) -> Result<bool, ApiError>;
    fn store(&self, item: &ItemDto) -> Result<(), ApiError>;
}
