//! Data provider backed by an `ItemStore`.
//!
//! Translates host queries keyed by `Uuid` into store lookups keyed by canonical id
//! strings, and flattens stored items into `ItemDto`s.

use crate::config::ProviderConfig;
use crate::error::ApiError;
use crate::item::{ItemField, ItemVersion, SerializedItem};
use crate::provider::contract::{DataProvider, FieldDto, ItemDto, ParentId, WritableDataProvider};
use crate::store::ItemStore;
use crate::types::{canonical_id, null_id, parse_id, DEFAULT_DATABASE};
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

/// Provider over a tree of serialized item files
pub struct SerializationProvider {
    store: ItemStore,
    database_name: String,
}

impl SerializationProvider {
    pub fn new(store: ItemStore) -> Self {
        Self {
            store,
            database_name: DEFAULT_DATABASE.to_string(),
        }
    }

    /// Open the serialization tree at `root` (relative paths resolve against the current directory)
    pub fn open(root: impl AsRef<Path>) -> Result<Self, ApiError> {
        Ok(Self::new(ItemStore::open(root)?))
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ApiError> {
        let store = ItemStore::open(&config.root)?.with_language(config.language.clone());
        Ok(Self::new(store).with_database(config.database.clone()))
    }

    /// Database tag stamped on created items
    pub fn with_database(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = database_name.into();
        self
    }

    pub fn item_store(&self) -> &ItemStore {
        &self.store
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}

/// Stored id to `Uuid`; an empty id is the null id
fn to_uuid(raw: &str) -> Result<Uuid, ApiError> {
    match parse_id(raw) {
        None => Ok(Uuid::nil()),
        Some(Ok(id)) => Ok(id),
        Some(Err(_)) => Err(ApiError::InvalidId(raw.to_string())),
    }
}

fn to_field_dto(field: &ItemField, version: Option<&ItemVersion>) -> Result<FieldDto, ApiError> {
    Ok(FieldDto {
        id: to_uuid(&field.field_id)?,
        value: field.value.clone(),
        language: version.map(|v| v.language.clone()),
        version: version.map(|v| v.version_number),
    })
}

/// Shared fields first, then each version's fields in version order
fn to_item_dto(item: &SerializedItem) -> Result<ItemDto, ApiError> {
    let mut field_values = Vec::new();
    for field in &item.shared_fields {
        field_values.push(to_field_dto(field, None)?);
    }
    for version in &item.versions {
        for field in &version.fields {
            field_values.push(to_field_dto(field, Some(version))?);
        }
    }

    Ok(ItemDto {
        id: to_uuid(&item.id)?,
        branch_id: to_uuid(&item.branch_id)?,
        name: item.name.clone(),
        parent_id: to_uuid(&item.parent_id)?,
        template_id: to_uuid(&item.template_id)?,
        field_values,
    })
}

impl DataProvider for SerializationProvider {
    fn get_item(&self, id: Uuid) -> Result<Option<ItemDto>, ApiError> {
        self.store
            .get_item(&canonical_id(id))
            .map(|item| to_item_dto(&item))
            .transpose()
    }

    fn get_parent_id(&self, id: Uuid) -> Result<ParentId, ApiError> {
        let Some(item) = self.store.get_item(&canonical_id(id)) else {
            return Ok(ParentId::NotFound);
        };
        let parent = to_uuid(&item.parent_id)?;
        if parent.is_nil() {
            Ok(ParentId::Root)
        } else {
            Ok(ParentId::Parent(parent))
        }
    }

    fn get_child_ids(&self, parent_id: Uuid) -> Result<Vec<Uuid>, ApiError> {
        self.store
            .get_children(&canonical_id(parent_id))
            .iter()
            .map(|item| to_uuid(&item.id))
            .collect()
    }

    fn get_template_item_ids(&self, template_id: Uuid) -> Result<Vec<Uuid>, ApiError> {
        self.store
            .get_items_with_template(&canonical_id(template_id))
            .iter()
            .map(|item| to_uuid(&item.id))
            .collect()
    }

    /// Workflow is not tracked in serialized trees
    fn get_items_in_workflow_state(
        &self,
        _workflow_state_id: Uuid,
    ) -> Result<Vec<ItemDto>, ApiError> {
        Ok(Vec::new())
    }
}

impl WritableDataProvider for SerializationProvider {
    fn create_item(
        &self,
        id: Uuid,
        name: &str,
        template_id: Uuid,
        parent_id: Uuid,
    ) -> Result<bool, ApiError> {
        if name.is_empty() || name.contains('/') {
            return Err(ApiError::Precondition(format!(
                "Invalid item name {:?}",
                name
            )));
        }
        if self.store.contains_id(&canonical_id(id)) {
            return Err(ApiError::Precondition(format!(
                "Item id already in use: {}",
                canonical_id(id)
            )));
        }
        let parent = self.store.get_item(&canonical_id(parent_id)).ok_or_else(|| {
            ApiError::Precondition(format!("Parent item not found: {}", canonical_id(parent_id)))
        })?;
        let template = self.store.get_item(&canonical_id(template_id)).ok_or_else(|| {
            ApiError::Precondition(format!(
                "Template item not found: {}",
                canonical_id(template_id)
            ))
        })?;

        // First version in the default language so the item is visible to lookups
        let mut version = ItemVersion::new(self.store.language(), 1);
        version.revision = canonical_id(Uuid::new_v4());

        let item = SerializedItem {
            id: canonical_id(id),
            path: format!("{}/{}", parent.path, name),
            parent_id: canonical_id(parent_id),
            branch_id: null_id(),
            template_id: canonical_id(template_id),
            name: name.to_string(),
            template_name: template.name.clone(),
            database_name: self.database_name.clone(),
            shared_fields: Vec::new(),
            versions: vec![version],
        };
        debug!(id = %item.id, path = %item.path, "Creating item");

        self.store.create_item(item)?;
        Ok(true)
    }

    fn delete_item(&self, _id: Uuid) -> Result<bool, ApiError> {
        Err(ApiError::NotImplemented("delete_item"))
    }

    fn store(&self, _item: &ItemDto) -> Result<(), ApiError> {
        Err(ApiError::NotImplemented("store"))
    }
}
