//! Key resolution: derive a route's key field values from the request, or generate them.

use crate::config::{KeyFieldSpec, KeySource};
use crate::error::AppError;
use crate::request::ResourceRequest;
use serde_json::Value;

/// Key field values for one request, in declared order. Every value is non-empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedKey {
    fields: Vec<(String, String)>,
}

impl ResolvedKey {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

pub struct KeyResolver;

impl KeyResolver {
    /// Resolve keys, generating UUID v4 values for fields with no configured source.
    pub fn resolve(keys: &[KeyFieldSpec], request: &ResourceRequest) -> Result<ResolvedKey, AppError> {
        Self::resolve_with(keys, request, || uuid::Uuid::new_v4().to_string())
    }

    /// Resolve keys in declared order; the first field resolving to an empty value fails.
    pub fn resolve_with<G>(
        keys: &[KeyFieldSpec],
        request: &ResourceRequest,
        mut generate: G,
    ) -> Result<ResolvedKey, AppError>
    where
        G: FnMut() -> String,
    {
        let mut fields = Vec::with_capacity(keys.len());
        for key in keys {
            let name = key.name.as_str();
            let value = match key.source() {
                KeySource::Generated => generate(),
                KeySource::Header => request
                    .headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string(),
                KeySource::PathParameter => request.path_params.get(name).cloned().unwrap_or_default(),
                KeySource::QueryParameter => request.query_params.get(name).cloned().unwrap_or_default(),
                KeySource::Body => body_value(request.body.get(name)),
            };
            if value.is_empty() {
                return Err(AppError::MissingKey(name.to_string()));
            }
            fields.push((name.to_string(), value));
        }
        Ok(ResolvedKey { fields })
    }
}

fn body_value(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceLocation;
    use axum::http::{HeaderMap, HeaderValue};
    use std::collections::HashMap;

    fn request() -> ResourceRequest {
        let mut headers = HeaderMap::new();
        headers.insert("tenant", HeaderValue::from_static("acme"));
        let mut body = serde_json::Map::new();
        body.insert("pkey".into(), Value::String("p-1".into()));
        body.insert("count".into(), Value::from(7));
        ResourceRequest {
            headers,
            path_params: HashMap::from([("id".to_string(), "abc".to_string())]),
            query_params: HashMap::from([("pkey".to_string(), "q-1".to_string())]),
            body,
        }
    }

    #[test]
    fn reads_each_location() {
        let keys = vec![
            KeyFieldSpec::from_location("tenant", SourceLocation::Header),
            KeyFieldSpec::from_location("id", SourceLocation::PathParameter),
            KeyFieldSpec::from_location("pkey", SourceLocation::QueryParameter),
            KeyFieldSpec::from_location("count", SourceLocation::Body),
        ];
        let key = KeyResolver::resolve(&keys, &request()).unwrap();
        assert_eq!(key.get("tenant"), Some("acme"));
        assert_eq!(key.get("id"), Some("abc"));
        assert_eq!(key.get("pkey"), Some("q-1"));
        assert_eq!(key.get("count"), Some("7"));
        assert_eq!(key.names().collect::<Vec<_>>(), vec!["tenant", "id", "pkey", "count"]);
    }

    #[test]
    fn header_lookup_ignores_case() {
        let keys = vec![KeyFieldSpec::from_location("Tenant", SourceLocation::Header)];
        let key = KeyResolver::resolve(&keys, &request()).unwrap();
        assert_eq!(key.get("Tenant"), Some("acme"));
    }

    #[test]
    fn generated_keys_use_generator() {
        let keys = vec![KeyFieldSpec::from_location("pkey", SourceLocation::Body), KeyFieldSpec::generated("id")];
        let key = KeyResolver::resolve_with(&keys, &request(), || "gen-1".to_string()).unwrap();
        assert_eq!(key.get("pkey"), Some("p-1"));
        assert_eq!(key.get("id"), Some("gen-1"));
    }

    #[test]
    fn generated_keys_differ_between_requests() {
        let keys = vec![KeyFieldSpec::generated("id")];
        let a = KeyResolver::resolve(&keys, &ResourceRequest::default()).unwrap();
        let b = KeyResolver::resolve(&keys, &ResourceRequest::default()).unwrap();
        assert_ne!(a.get("id"), b.get("id"));
        assert!(uuid::Uuid::parse_str(a.get("id").unwrap()).is_ok());
    }

    #[test]
    fn first_missing_field_is_reported() {
        let keys = vec![
            KeyFieldSpec::from_location("missing_one", SourceLocation::QueryParameter),
            KeyFieldSpec::from_location("missing_two", SourceLocation::Header),
        ];
        let err = KeyResolver::resolve(&keys, &request()).unwrap_err();
        assert!(matches!(err, AppError::MissingKey(ref name) if name == "missing_one"));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let mut req = request();
        req.path_params.insert("id".into(), String::new());
        let keys = vec![KeyFieldSpec::from_location("id", SourceLocation::PathParameter)];
        assert!(matches!(KeyResolver::resolve(&keys, &req), Err(AppError::MissingKey(_))));
    }

    #[test]
    fn non_scalar_body_values_are_missing() {
        let mut req = request();
        req.body.insert("pkey".into(), serde_json::json!({ "nested": true }));
        let keys = vec![KeyFieldSpec::from_location("pkey", SourceLocation::Body)];
        assert!(matches!(KeyResolver::resolve(&keys, &req), Err(AppError::MissingKey(_))));
    }
}
