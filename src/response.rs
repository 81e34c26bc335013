//! Response classification: executor outcome to HTTP status and body.
//!
//! Diagnostics (`data` on success, `error` on failure) are attached here and only outside production.

use crate::config::{DeploymentMode, Operation};
use crate::error::AppError;
use crate::service::{Outcome, StoreRequest};
use crate::store::Item;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

pub const NOT_FOUND_MESSAGE: &str = "Resource not found";
pub const DELETED_MESSAGE: &str = "Deleted resource";

#[derive(Serialize)]
struct ErrorDetail<'a> {
    name: &'a str,
    message: String,
    stack: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorDetail<'a>>,
}

/// Client-facing failure message for each operation.
pub fn failure_message(operation: Operation) -> &'static str {
    match operation {
        Operation::Create => "Error creating resource",
        Operation::Update => "Error updating resource",
        Operation::Get => "Error retrieving resource",
        Operation::Delete => "Error deleting resource",
    }
}

pub fn classify(operation: Operation, result: Result<Outcome, AppError>, mode: DeploymentMode) -> Response {
    match result {
        Ok(outcome) => success(outcome, mode),
        Err(err) => failure(operation, &err, mode),
    }
}

fn success(outcome: Outcome, mode: DeploymentMode) -> Response {
    let (status, mut body, request) = match outcome {
        Outcome::Created { record, request } => (StatusCode::CREATED, record, Some(request)),
        Outcome::Updated { record, request } | Outcome::Found { record, request } => {
            (StatusCode::OK, record, Some(request))
        }
        // Not-found carries only its message in every mode.
        Outcome::Absent { .. } => (StatusCode::NOT_FOUND, message(NOT_FOUND_MESSAGE), None),
        Outcome::Deleted { request } => (StatusCode::OK, message(DELETED_MESSAGE), Some(request)),
    };
    if let Some(request) = request.filter(|_| !mode.is_production()) {
        body.insert("data".into(), diagnostics(&request));
    }
    (status, Json(Value::Object(body))).into_response()
}

fn failure(operation: Operation, err: &AppError, mode: DeploymentMode) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(%operation, error = %err, error_name = err.name(), "resource request failed");
    } else {
        tracing::warn!(%operation, error = %err, error_name = err.name(), "resource request rejected");
    }
    let body = ErrorBody {
        message: failure_message(operation),
        error: (!mode.is_production()).then(|| ErrorDetail {
            name: err.name(),
            message: err.to_string(),
            stack: err.source_chain(),
        }),
    };
    (status, Json(body)).into_response()
}

fn message(text: &str) -> Item {
    let mut body = Item::new();
    body.insert("message".into(), Value::String(text.into()));
    body
}

fn diagnostics(request: &StoreRequest) -> Value {
    serde_json::to_value(request).unwrap_or_else(|_| json!({}))
}
