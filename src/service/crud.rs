//! Generic CRUD execution against the key-value store: one store call per request.

use crate::config::{AttributeType, HandlerConfig, Operation};
use crate::error::{AppError, StoreError};
use crate::service::{ConditionExpression, ConditionPlanner, ResolvedKey};
use crate::store::{Item, KeyValueStore};
use serde::Serialize;
use serde_json::{Number, Value};

/// Echo of the store call a handler issued; surfaced as `data` outside production.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub operation: &'static str,
    pub table_name: String,
    pub key: Item,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Created { record: Item, request: StoreRequest },
    Updated { record: Item, request: StoreRequest },
    Found { record: Item, request: StoreRequest },
    /// Get addressed no item. A handled outcome, not a fault.
    Absent { request: StoreRequest },
    Deleted { request: StoreRequest },
}

pub struct CrudService;

impl CrudService {
    /// Run the configured operation for an already resolved key.
    pub async fn execute(
        store: &dyn KeyValueStore,
        config: &HandlerConfig,
        key: &ResolvedKey,
        body: Item,
    ) -> Result<Outcome, AppError> {
        let key_item = key_to_item(config, key)?;
        match config.operation {
            Operation::Create => {
                let condition = ConditionPlanner::plan(Operation::Create, key.names());
                let (record, request) = Self::put(store, config, key_item, body, condition).await.map_err(|e| match e {
                    StoreError::ConditionFailed(_) => AppError::AlreadyExists(e),
                    other => AppError::StoreFault(other),
                })?;
                Ok(Outcome::Created { record, request })
            }
            Operation::Update => {
                let condition = ConditionPlanner::plan(Operation::Update, key.names());
                let (record, request) = Self::put(store, config, key_item, body, condition).await.map_err(|e| match e {
                    StoreError::ConditionFailed(_) => AppError::NotFound(e),
                    other => AppError::StoreFault(other),
                })?;
                Ok(Outcome::Updated { record, request })
            }
            Operation::Get => Self::get(store, config, key_item).await,
            Operation::Delete => Self::delete(store, config, key_item).await,
        }
    }

    /// Write key fields merged over the body. Returns the written record.
    async fn put(
        store: &dyn KeyValueStore,
        config: &HandlerConfig,
        key: Item,
        body: Item,
        condition: ConditionExpression,
    ) -> Result<(Item, StoreRequest), StoreError> {
        let mut record = body;
        for (name, value) in &key {
            record.insert(name.clone(), value.clone());
        }
        let request = StoreRequest {
            operation: "PutItem",
            table_name: config.table_name.clone(),
            key,
            condition_expression: (!condition.is_empty()).then(|| condition.to_string()),
        };
        tracing::debug!(
            table = %config.table_name,
            operation = %config.operation,
            condition = %condition,
            "put item"
        );
        store.put_item(&config.table_name, record.clone(), &condition).await?;
        Ok((record, request))
    }

    async fn get(store: &dyn KeyValueStore, config: &HandlerConfig, key: Item) -> Result<Outcome, AppError> {
        tracing::debug!(table = %config.table_name, "get item");
        let found = store
            .get_item(&config.table_name, &key)
            .await
            .map_err(AppError::StoreFault)?;
        let request = StoreRequest {
            operation: "GetItem",
            table_name: config.table_name.clone(),
            key,
            condition_expression: None,
        };
        Ok(match found {
            Some(record) => Outcome::Found { record, request },
            None => Outcome::Absent { request },
        })
    }

    /// Unconditional; deleting an absent item still succeeds.
    async fn delete(store: &dyn KeyValueStore, config: &HandlerConfig, key: Item) -> Result<Outcome, AppError> {
        tracing::debug!(table = %config.table_name, "delete item");
        store
            .delete_item(&config.table_name, &key)
            .await
            .map_err(AppError::StoreFault)?;
        Ok(Outcome::Deleted {
            request: StoreRequest {
                operation: "DeleteItem",
                table_name: config.table_name.clone(),
                key,
                condition_expression: None,
            },
        })
    }
}

/// Convert resolved key strings to typed JSON values per the table key schema.
fn key_to_item(config: &HandlerConfig, key: &ResolvedKey) -> Result<Item, AppError> {
    let mut item = Item::new();
    for (name, raw) in key.iter() {
        let value = match config.key_type(name) {
            AttributeType::Number => raw
                .parse::<Number>()
                .map(Value::Number)
                .map_err(|_| AppError::InvalidKey {
                    name: name.to_string(),
                    reason: format!("'{}' is not a number", raw),
                })?,
            AttributeType::String | AttributeType::Binary => Value::String(raw.to_string()),
        };
        item.insert(name.to_string(), value);
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeyAttribute, KeyFieldSpec, SourceLocation, TableParams, TableSpec};
    use crate::request::ResourceRequest;
    use crate::service::KeyResolver;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::collections::HashMap;

    fn config(operation: Operation, key_type: AttributeType) -> HandlerConfig {
        HandlerConfig {
            table_name: "Items".into(),
            key_types: HashMap::from([("id".to_string(), key_type)]),
            params: TableParams {
                keys: vec![KeyFieldSpec::from_location("id", SourceLocation::PathParameter)],
            },
            operation,
        }
    }

    async fn store(key_type: AttributeType) -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_table(&TableSpec {
                name: "Items".into(),
                partition_key: KeyAttribute {
                    name: "id".into(),
                    type_: key_type,
                },
                sort_key: None,
            })
            .await
            .unwrap();
        store
    }

    fn key(cfg: &HandlerConfig, id: &str) -> ResolvedKey {
        let req = ResourceRequest {
            path_params: HashMap::from([("id".to_string(), id.to_string())]),
            ..Default::default()
        };
        KeyResolver::resolve(&cfg.params.keys, &req).unwrap()
    }

    fn body(v: Value) -> Item {
        match v {
            Value::Object(m) => m,
            _ => Item::new(),
        }
    }

    #[tokio::test]
    async fn create_then_duplicate_create() {
        let store = store(AttributeType::String).await;
        let cfg = config(Operation::Create, AttributeType::String);
        let k = key(&cfg, "a1");

        let out = CrudService::execute(&store, &cfg, &k, body(json!({ "name": "widget" })))
            .await
            .unwrap();
        let Outcome::Created { record, request } = out else { panic!("expected created") };
        assert_eq!(Value::Object(record), json!({ "id": "a1", "name": "widget" }));
        assert_eq!(request.condition_expression.as_deref(), Some("attribute_not_exists(id)"));

        let err = CrudService::execute(&store, &cfg, &k, Item::new()).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn key_fields_override_body_fields() {
        let store = store(AttributeType::String).await;
        let cfg = config(Operation::Create, AttributeType::String);
        let out = CrudService::execute(&store, &cfg, &key(&cfg, "a1"), body(json!({ "id": "spoofed" })))
            .await
            .unwrap();
        let Outcome::Created { record, .. } = out else { panic!("expected created") };
        assert_eq!(record.get("id"), Some(&json!("a1")));
    }

    #[tokio::test]
    async fn update_requires_existing_item_and_replaces_it() {
        let store = store(AttributeType::String).await;
        let update = config(Operation::Update, AttributeType::String);
        let err = CrudService::execute(&store, &update, &key(&update, "a1"), Item::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let create = config(Operation::Create, AttributeType::String);
        CrudService::execute(&store, &create, &key(&create, "a1"), body(json!({ "name": "w", "color": "red" })))
            .await
            .unwrap();
        CrudService::execute(&store, &update, &key(&update, "a1"), body(json!({ "name": "w2" })))
            .await
            .unwrap();

        let get = config(Operation::Get, AttributeType::String);
        let out = CrudService::execute(&store, &get, &key(&get, "a1"), Item::new()).await.unwrap();
        let Outcome::Found { record, .. } = out else { panic!("expected found") };
        assert_eq!(Value::Object(record), json!({ "id": "a1", "name": "w2" }));
    }

    #[tokio::test]
    async fn get_missing_is_absent_and_delete_is_idempotent() {
        let store = store(AttributeType::String).await;
        let get = config(Operation::Get, AttributeType::String);
        let out = CrudService::execute(&store, &get, &key(&get, "nope"), Item::new()).await.unwrap();
        assert!(matches!(out, Outcome::Absent { .. }));

        let delete = config(Operation::Delete, AttributeType::String);
        for _ in 0..2 {
            let out = CrudService::execute(&store, &delete, &key(&delete, "nope"), Item::new())
                .await
                .unwrap();
            assert!(matches!(out, Outcome::Deleted { .. }));
        }
    }

    #[tokio::test]
    async fn numeric_keys_are_typed() {
        let store = store(AttributeType::Number).await;
        let cfg = config(Operation::Create, AttributeType::Number);
        let out = CrudService::execute(&store, &cfg, &key(&cfg, "42"), Item::new()).await.unwrap();
        let Outcome::Created { record, .. } = out else { panic!("expected created") };
        assert_eq!(record.get("id"), Some(&json!(42)));

        let err = CrudService::execute(&store, &cfg, &key(&cfg, "forty-two"), Item::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidKey { .. }));
    }

    #[tokio::test]
    async fn missing_table_is_store_fault() {
        let store = MemoryStore::new();
        let cfg = config(Operation::Get, AttributeType::String);
        let err = CrudService::execute(&store, &cfg, &key(&cfg, "a1"), Item::new()).await.unwrap_err();
        assert!(matches!(err, AppError::StoreFault(_)));
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
