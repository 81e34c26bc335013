//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Startup errors: loading, validating, and provisioning resource configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("duplicate table name: {0}")]
    DuplicateTable(String),
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute { method: String, path: String },
    #[error("invalid route keys: {method} {path}: {reason}")]
    InvalidRouteKeys {
        method: String,
        path: String,
        reason: String,
    },
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
    #[error("provisioning table {table}: {source}")]
    Provision {
        table: String,
        #[source]
        source: StoreError,
    },
}

/// Which side of the store call a fault is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultOrigin {
    Client,
    Server,
}

/// Errors reported by a [`KeyValueStore`](crate::store::KeyValueStore) backend.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The write precondition was evaluated and rejected.
    #[error("conditional check failed: {0}")]
    ConditionFailed(String),
    #[error("{name}: {message}")]
    Fault {
        origin: FaultOrigin,
        name: String,
        message: String,
    },
}

impl StoreError {
    pub fn client(name: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Fault {
            origin: FaultOrigin::Client,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn server(name: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Fault {
            origin: FaultOrigin::Server,
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Request-time errors produced by a generated resource handler.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("missing key: {0}")]
    MissingKey(String),
    #[error("invalid key {name}: {reason}")]
    InvalidKey { name: String, reason: String },
    #[error("missing configuration: {0}")]
    ConfigMissing(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("resource already exists")]
    AlreadyExists(#[source] StoreError),
    #[error("resource not found")]
    NotFound(#[source] StoreError),
    #[error(transparent)]
    StoreFault(StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::StoreFault(StoreError::Fault {
                origin: FaultOrigin::Server,
                ..
            }) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Short error identity used in diagnostic bodies.
    pub fn name(&self) -> &str {
        match self {
            AppError::MissingKey(_) => "MissingKey",
            AppError::InvalidKey { .. } => "InvalidKey",
            AppError::ConfigMissing(_) => "ConfigMissing",
            AppError::BadRequest(_) => "BadRequest",
            AppError::AlreadyExists(_) => "AlreadyExists",
            AppError::NotFound(_) => "NotFound",
            AppError::StoreFault(StoreError::Fault { name, .. }) => name,
            AppError::StoreFault(StoreError::ConditionFailed(_)) => "ConditionFailed",
        }
    }

    /// Display of this error followed by each source, one per line.
    pub fn source_chain(&self) -> String {
        let mut out = self.to_string();
        let mut cur = std::error::Error::source(self);
        while let Some(e) = cur {
            out.push_str("\n    caused by: ");
            out.push_str(&e.to_string());
            cur = e.source();
        }
        out
    }
}

/// Bearer authorization failure; always answered with 401 before the handler runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid bearer token")]
    InvalidToken,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "message": "Unauthorized" });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_fault_status_follows_origin() {
        let server = AppError::StoreFault(StoreError::server("InternalServerError", "boom"));
        let client = AppError::StoreFault(StoreError::client("ValidationException", "bad key"));
        assert_eq!(server.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(client.status(), StatusCode::BAD_REQUEST);
        assert_eq!(client.name(), "ValidationException");
    }

    #[test]
    fn precondition_outcomes_are_client_errors() {
        let exists = AppError::AlreadyExists(StoreError::ConditionFailed("put".into()));
        let missing = AppError::NotFound(StoreError::ConditionFailed("put".into()));
        assert_eq!(exists.status(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert!(exists.source_chain().contains("caused by: conditional check failed"));
    }

    #[tokio::test]
    async fn auth_rejection_is_bare_unauthorized() {
        let res = AuthRejection::InvalidToken.into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Unauthorized" }));
    }
}
