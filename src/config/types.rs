//! Raw config types matching the resource configuration JSON (camelCase keys).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Scalar type of a table key attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    #[serde(rename = "S", alias = "STRING", alias = "string")]
    String,
    #[serde(rename = "N", alias = "NUMBER", alias = "number")]
    Number,
    #[serde(rename = "B", alias = "BINARY", alias = "binary")]
    Binary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: AttributeType,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSpec {
    pub name: String,
    pub partition_key: KeyAttribute,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<KeyAttribute>,
}

impl TableSpec {
    /// Key attributes in schema order: partition key, then sort key.
    pub fn key_attributes(&self) -> impl Iterator<Item = &KeyAttribute> {
        std::iter::once(&self.partition_key).chain(self.sort_key.as_ref())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        };
        f.write_str(s)
    }
}

/// The single store operation a route performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Get,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Get => "get",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Request location a key value is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceLocation {
    #[serde(rename = "headers")]
    Header,
    #[serde(rename = "pathParameters")]
    PathParameter,
    #[serde(rename = "queryStringParameters")]
    QueryParameter,
    #[serde(rename = "body")]
    Body,
}

/// Where a key field's value comes from, with generation made explicit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeySource {
    Generated,
    Header,
    PathParameter,
    QueryParameter,
    Body,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyFieldSpec {
    pub name: String,
    /// Absent means a fresh identifier is generated for every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_in: Option<SourceLocation>,
}

impl KeyFieldSpec {
    pub fn generated(name: impl Into<String>) -> Self {
        KeyFieldSpec {
            name: name.into(),
            configured_in: None,
        }
    }

    pub fn from_location(name: impl Into<String>, location: SourceLocation) -> Self {
        KeyFieldSpec {
            name: name.into(),
            configured_in: Some(location),
        }
    }

    pub fn source(&self) -> KeySource {
        match self.configured_in {
            None => KeySource::Generated,
            Some(SourceLocation::Header) => KeySource::Header,
            Some(SourceLocation::PathParameter) => KeySource::PathParameter,
            Some(SourceLocation::QueryParameter) => KeySource::QueryParameter,
            Some(SourceLocation::Body) => KeySource::Body,
        }
    }
}

/// Per-route key policy. Serialized form is what `TABLE_PARAMS` carries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableParams {
    pub keys: Vec<KeyFieldSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDescriptor {
    pub path: String,
    pub method: HttpMethod,
    pub operation: Operation,
    #[serde(default)]
    pub is_authorize: bool,
    #[serde(default)]
    pub params: TableParams,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub table: TableSpec,
    #[serde(default)]
    pub routes: Vec<RouteDescriptor>,
}

/// Deployment mode; anything but production exposes diagnostics in responses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentMode {
    #[default]
    Development,
    Production,
}

impl DeploymentMode {
    pub fn from_env_value(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            DeploymentMode::Production
        } else {
            DeploymentMode::Development
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, DeploymentMode::Production)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    /// Tables are dropped on teardown only when set.
    #[serde(default)]
    pub is_destroyable: bool,
}

/// Top-level resource configuration document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResourceManagementConfig {
    pub resources: Vec<ResourceDescriptor>,
    #[serde(default)]
    pub environments: HashMap<DeploymentMode, EnvironmentConfig>,
}

impl ResourceManagementConfig {
    pub fn environment(&self, mode: DeploymentMode) -> EnvironmentConfig {
        self.environments.get(&mode).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_resource() {
        let raw = r#"{
            "table": {
                "name": "Resource1",
                "partitionKey": { "name": "pkey", "type": "S" },
                "sortKey": { "name": "id", "type": "STRING" }
            },
            "routes": [{
                "path": "/resource1/{id}",
                "method": "GET",
                "operation": "get",
                "isAuthorize": true,
                "params": { "keys": [
                    { "name": "pkey", "configuredIn": "queryStringParameters" },
                    { "name": "id", "configuredIn": "pathParameters" }
                ] }
            }]
        }"#;
        let resource: ResourceDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(resource.table.key_attributes().count(), 2);
        let route = &resource.routes[0];
        assert_eq!(route.method, HttpMethod::Get);
        assert!(route.is_authorize);
        assert_eq!(route.params.keys[0].source(), KeySource::QueryParameter);
        assert_eq!(route.params.keys[1].source(), KeySource::PathParameter);
    }

    #[test]
    fn missing_location_means_generated() {
        let spec: KeyFieldSpec = serde_json::from_str(r#"{ "name": "id" }"#).unwrap();
        assert_eq!(spec.source(), KeySource::Generated);
    }

    #[test]
    fn unknown_location_is_rejected() {
        let res = serde_json::from_str::<KeyFieldSpec>(r#"{ "name": "id", "configuredIn": "cookies" }"#);
        assert!(res.is_err());
    }

    #[test]
    fn deployment_mode_from_env() {
        assert!(DeploymentMode::from_env_value("Production").is_production());
        assert!(DeploymentMode::from_env_value("production").is_production());
        assert!(!DeploymentMode::from_env_value("Development").is_production());
        assert!(!DeploymentMode::from_env_value("staging").is_production());
    }
}
