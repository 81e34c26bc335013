//! Per-route handler configuration: what one generated handler needs at request time.

use crate::config::{AttributeType, Operation, ResourceDescriptor, RouteDescriptor, TableParams};
use crate::error::AppError;
use std::collections::HashMap;

pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
pub const TABLE_PARAMS_VAR: &str = "TABLE_PARAMS";
/// Optional JSON object of key attribute name to type, e.g. `{"id":"N"}`. Absent means every key is a string.
pub const TABLE_KEY_TYPES_VAR: &str = "TABLE_KEY_TYPES";

#[derive(Clone, Debug)]
pub struct HandlerConfig {
    pub table_name: String,
    /// Declared types of the table key attributes. Keys without an entry are strings.
    pub key_types: HashMap<String, AttributeType>,
    pub params: TableParams,
    pub operation: Operation,
}

impl HandlerConfig {
    pub fn for_route(resource: &ResourceDescriptor, route: &RouteDescriptor) -> Self {
        HandlerConfig {
            table_name: resource.table.name.clone(),
            key_types: resource
                .table
                .key_attributes()
                .map(|k| (k.name.clone(), k.type_))
                .collect(),
            params: route.params.clone(),
            operation: route.operation,
        }
    }

    /// Build from `TABLE_NAME` / `TABLE_PARAMS` / `TABLE_KEY_TYPES` in the process environment.
    pub fn from_env(operation: Operation) -> Result<Self, AppError> {
        Self::from_lookup(operation, |name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(operation: Operation, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let table_name = lookup(TABLE_NAME_VAR)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::ConfigMissing(TABLE_NAME_VAR.into()))?;
        let raw_params = lookup(TABLE_PARAMS_VAR)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::ConfigMissing(TABLE_PARAMS_VAR.into()))?;
        let params: TableParams = serde_json::from_str(&raw_params)
            .map_err(|e| AppError::ConfigMissing(format!("{}: {}", TABLE_PARAMS_VAR, e)))?;
        let key_types: HashMap<String, AttributeType> = match lookup(TABLE_KEY_TYPES_VAR).filter(|s| !s.is_empty()) {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::ConfigMissing(format!("{}: {}", TABLE_KEY_TYPES_VAR, e)))?,
            None => HashMap::new(),
        };
        Ok(HandlerConfig {
            table_name,
            key_types,
            params,
            operation,
        })
    }

    pub fn key_type(&self, name: &str) -> AttributeType {
        self.key_types.get(name).copied().unwrap_or(AttributeType::String)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeySource;

    #[test]
    fn reads_table_params_from_lookup() {
        let env: HashMap<&str, &str> = HashMap::from([
            (TABLE_NAME_VAR, "Resource2"),
            (TABLE_PARAMS_VAR, r#"{"keys":[{"name":"id","configuredIn":"pathParameters"}]}"#),
        ]);
        let cfg = HandlerConfig::from_lookup(Operation::Get, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.table_name, "Resource2");
        assert_eq!(cfg.params.keys[0].source(), KeySource::PathParameter);
        assert_eq!(cfg.key_type("id"), AttributeType::String);
    }

    #[test]
    fn missing_table_name_is_config_missing() {
        let err = HandlerConfig::from_lookup(Operation::Create, |_| None).unwrap_err();
        assert!(matches!(err, AppError::ConfigMissing(ref v) if v == TABLE_NAME_VAR));
    }

    #[test]
    fn malformed_table_params_is_config_missing() {
        let err = HandlerConfig::from_lookup(Operation::Create, |k| match k {
            TABLE_NAME_VAR => Some("T".into()),
            _ => Some("{not json".into()),
        })
        .unwrap_err();
        assert!(matches!(err, AppError::ConfigMissing(_)));
    }

    #[test]
    fn key_types_travel_with_the_channel() {
        let env: HashMap<&str, &str> = HashMap::from([
            (TABLE_NAME_VAR, "Counters"),
            (TABLE_PARAMS_VAR, r#"{"keys":[{"name":"id","configuredIn":"pathParameters"}]}"#),
            (TABLE_KEY_TYPES_VAR, r#"{"id":"N"}"#),
        ]);
        let cfg = HandlerConfig::from_lookup(Operation::Get, |k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.key_type("id"), AttributeType::Number);
    }

    #[test]
    fn malformed_key_types_is_config_missing() {
        let env: HashMap<&str, &str> = HashMap::from([
            (TABLE_NAME_VAR, "Counters"),
            (TABLE_PARAMS_VAR, r#"{"keys":[{"name":"id"}]}"#),
            (TABLE_KEY_TYPES_VAR, r#"{"id":"X"}"#),
        ]);
        let err = HandlerConfig::from_lookup(Operation::Get, |k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, AppError::ConfigMissing(ref v) if v.starts_with(TABLE_KEY_TYPES_VAR)));
    }
}
