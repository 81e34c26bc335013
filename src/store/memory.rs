//! In-process store for local runs and tests. Conditions are checked and writes applied under one lock.

use crate::config::TableSpec;
use crate::error::StoreError;
use crate::service::{Condition, ConditionExpression};
use crate::store::{Item, KeyValueStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

struct MemoryTable {
    key_names: Vec<String>,
    items: HashMap<Vec<String>, Item>,
}

impl MemoryTable {
    /// Canonical key: the JSON text of each key attribute, in schema order.
    fn key_of(&self, table_name: &str, attrs: &Item) -> Result<Vec<String>, StoreError> {
        self.key_names
            .iter()
            .map(|name| match attrs.get(name) {
                Some(v) if !v.is_null() => Ok(v.to_string()),
                _ => Err(StoreError::client(
                    "ValidationException",
                    format!("{}: missing key attribute '{}'", table_name, name),
                )),
            })
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items currently in `table_name`, if the table exists.
    pub async fn item_count(&self, table_name: &str) -> Option<usize> {
        self.tables.read().await.get(table_name).map(|t| t.items.len())
    }
}

fn table_not_found(table_name: &str) -> StoreError {
    StoreError::client(
        "ResourceNotFoundException",
        format!("requested table not found: {}", table_name),
    )
}

fn holds(condition: &ConditionExpression, current: Option<&Item>) -> bool {
    condition.clauses().iter().all(|clause| {
        let present = current.map(|item| item.contains_key(clause.attribute())).unwrap_or(false);
        match clause {
            Condition::AttributeExists(_) => present,
            Condition::AttributeNotExists(_) => !present,
        }
    })
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn create_table(&self, table: &TableSpec) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.entry(table.name.clone()).or_insert_with(|| MemoryTable {
            key_names: table.key_attributes().map(|k| k.name.clone()).collect(),
            items: HashMap::new(),
        });
        Ok(())
    }

    async fn delete_table(&self, table_name: &str) -> Result<(), StoreError> {
        self.tables.write().await.remove(table_name);
        Ok(())
    }

    async fn put_item(&self, table_name: &str, item: Item, condition: &ConditionExpression) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let table = tables.get_mut(table_name).ok_or_else(|| table_not_found(table_name))?;
        let key = table.key_of(table_name, &item)?;
        if !holds(condition, table.items.get(&key)) {
            return Err(StoreError::ConditionFailed(condition.to_string()));
        }
        table.items.insert(key, item);
        Ok(())
    }

    async fn get_item(&self, table_name: &str, key: &Item) -> Result<Option<Item>, StoreError> {
        let tables = self.tables.read().await;
        let table = tables.get(table_name).ok_or_else(|| table_not_found(table_name))?;
        let key = table.key_of(table_name, key)?;
        Ok(table.items.get(&key).cloned())
    }

    async fn delete_item(&self, table_name: &str, key: &Item) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let table = tables.get_mut(table_name).ok_or_else(|| table_not_found(table_name))?;
        let key = table.key_of(table_name, key)?;
        table.items.remove(&key);
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
