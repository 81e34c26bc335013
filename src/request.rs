//! The parts of an inbound call a generated handler reads keys and payload from.

use crate::error::AppError;
use axum::http::HeaderMap;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct ResourceRequest {
    pub headers: HeaderMap,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
    /// JSON object body; empty when the request had no body.
    pub body: Map<String, Value>,
}

impl ResourceRequest {
    /// Assemble a request, parsing `body` as a JSON object. An empty or whitespace body is `{}`.
    pub fn parse(
        headers: HeaderMap,
        path_params: HashMap<String, String>,
        query_params: HashMap<String, String>,
        body: &[u8],
    ) -> Result<Self, AppError> {
        let body = body_to_map(body)?;
        Ok(ResourceRequest {
            headers,
            path_params,
            query_params,
            body,
        })
    }
}

fn body_to_map(raw: &[u8]) -> Result<Map<String, Value>, AppError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| AppError::BadRequest(format!("invalid JSON body: {}", e)))?;
    match value {
        Value::Object(m) => Ok(m),
        Value::Null => Ok(Map::new()),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}
