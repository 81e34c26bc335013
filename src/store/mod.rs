//! Key-value store seam. Handlers hold an `Arc<dyn KeyValueStore>` shared for the process lifetime.

use crate::config::TableSpec;
use crate::error::StoreError;
use crate::service::ConditionExpression;
use async_trait::async_trait;
use serde_json::{Map, Value};

mod dynamo;
mod memory;

pub use dynamo::DynamoStore;
pub use memory::MemoryStore;

/// A stored record: attribute name to JSON value.
pub type Item = Map<String, Value>;

/// Single-item, single-table operations with atomic check-and-write on `put_item`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Create the table; an already existing table is not an error.
    async fn create_table(&self, table: &TableSpec) -> Result<(), StoreError>;

    /// Drop the table; a missing table is not an error.
    async fn delete_table(&self, table_name: &str) -> Result<(), StoreError>;

    /// Write `item`, replacing any item at the same key, if `condition` holds for the current item.
    async fn put_item(&self, table_name: &str, item: Item, condition: &ConditionExpression) -> Result<(), StoreError>;

    async fn get_item(&self, table_name: &str, key: &Item) -> Result<Option<Item>, StoreError>;

    /// Remove the item at `key`. Removing an absent item succeeds.
    async fn delete_item(&self, table_name: &str, key: &Item) -> Result<(), StoreError>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> Result<(), StoreError>;
}
