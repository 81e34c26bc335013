//! Config validation: unique tables and routes, route keys consistent with the table key schema.

use crate::config::{AttributeType, ResourceManagementConfig, RouteDescriptor, SourceLocation, TableSpec};
use crate::error::ConfigError;
use std::collections::{HashMap, HashSet};

pub fn validate(config: &ResourceManagementConfig) -> Result<(), ConfigError> {
    let mut table_names = HashSet::new();
    let mut routes = HashSet::new();
    let mut shapes: HashMap<String, &str> = HashMap::new();

    for resource in &config.resources {
        let table = &resource.table;
        if table.name.trim().is_empty() {
            return Err(ConfigError::Validation("table name must not be empty".into()));
        }
        if !table_names.insert(table.name.as_str()) {
            return Err(ConfigError::DuplicateTable(table.name.clone()));
        }
        if let Some(binary) = table.key_attributes().find(|k| k.type_ == AttributeType::Binary) {
            return Err(ConfigError::Validation(format!(
                "table {}: binary key attribute '{}' is not supported; use S or N",
                table.name, binary.name
            )));
        }
        if let Some(sort_key) = &table.sort_key {
            if sort_key.name == table.partition_key.name {
                return Err(ConfigError::Validation(format!(
                    "table {}: sort key repeats partition key '{}'",
                    table.name, sort_key.name
                )));
            }
        }

        for route in &resource.routes {
            if !route.path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "route path must start with '/': {}",
                    route.path
                )));
            }
            if !routes.insert((route.method, route.path.as_str())) {
                return Err(ConfigError::DuplicateRoute {
                    method: route.method.to_string(),
                    path: route.path.clone(),
                });
            }
            let shape = path_shape(&route.path);
            match shapes.get(shape.as_str()) {
                Some(existing) if *existing != route.path => {
                    return Err(ConfigError::Validation(format!(
                        "paths {} and {} differ only in parameter names",
                        existing, route.path
                    )));
                }
                _ => {
                    shapes.insert(shape, route.path.as_str());
                }
            }
            validate_route_keys(table, route)?;
        }
    }

    Ok(())
}

/// Path with every `{param}` segment blanked; routes with equal shapes must use equal names.
fn path_shape(path: &str) -> String {
    path.split('/')
        .map(|s| if s.starts_with('{') && s.ends_with('}') { "{}" } else { s })
        .collect::<Vec<_>>()
        .join("/")
}

fn validate_route_keys(table: &TableSpec, route: &RouteDescriptor) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidRouteKeys {
        method: route.method.to_string(),
        path: route.path.clone(),
        reason,
    };

    let keys = &route.params.keys;
    if keys.is_empty() {
        return Err(invalid("at least one key is required".into()));
    }

    let mut names = HashSet::new();
    for key in keys {
        if key.name.trim().is_empty() {
            return Err(invalid("key name must not be empty".into()));
        }
        if !names.insert(key.name.as_str()) {
            return Err(invalid(format!("duplicate key '{}'", key.name)));
        }
        let numeric = table
            .key_attributes()
            .any(|k| k.name == key.name && k.type_ == AttributeType::Number);
        if numeric && key.configured_in.is_none() {
            return Err(invalid(format!(
                "key '{}' is numeric and cannot be generated",
                key.name
            )));
        }
        if key.configured_in == Some(SourceLocation::PathParameter) {
            let segment = format!("{{{}}}", key.name);
            if !route.path.split('/').any(|s| s == segment) {
                return Err(invalid(format!("path has no {} segment", segment)));
            }
        }
    }

    let table_keys: HashSet<&str> = table.key_attributes().map(|k| k.name.as_str()).collect();
    if names != table_keys {
        let mut expected: Vec<_> = table_keys.into_iter().collect();
        expected.sort_unstable();
        return Err(invalid(format!(
            "keys must match table {} key schema [{}]",
            table.name,
            expected.join(", ")
        )));
    }

    Ok(())
}
