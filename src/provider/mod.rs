//! Data provider: the host contract and its serialization-backed adapter.

pub mod contract;
pub mod serialization;

pub use contract::{DataProvider, FieldDto, ItemDto, ParentId, WritableDataProvider};
pub use serialization::SerializationProvider;
