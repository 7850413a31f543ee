//! Serialdb: Serialized Item Data Provider
//!
//! Exposes a directory tree of serialized item files through a content repository
//! data-provider contract. The item store indexes every file under a root directory and
//! answers id, path, hierarchy and template queries; the provider maps stored items into
//! the host's transfer objects.

pub mod config;
pub mod error;
pub mod item;
pub mod logging;
pub mod provider;
pub mod store;
pub mod types;

pub use error::{ApiError, StorageError};
pub use item::{ItemField, ItemVersion, SerializedItem};
pub use provider::{DataProvider, ItemDto, ParentId, SerializationProvider, WritableDataProvider};
pub use store::ItemStore;
