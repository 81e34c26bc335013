//! Bearer authorization for routes marked `isAuthorize`.

use crate::error::AuthRejection;
use crate::extractors::BearerToken;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashSet;
use std::sync::Arc;

#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, headers: &HeaderMap) -> Result<(), AuthRejection>;
}

/// Accepts a fixed set of bearer tokens. An empty set rejects every request.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenAuthorizer {
    tokens: HashSet<String>,
}

impl StaticTokenAuthorizer {
    pub fn new<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Authorizer for StaticTokenAuthorizer {
    async fn authorize(&self, headers: &HeaderMap) -> Result<(), AuthRejection> {
        match BearerToken::from_headers(headers).0 {
            None => Err(AuthRejection::MissingToken),
            Some(token) if self.tokens.contains(&token) => Ok(()),
            Some(_) => Err(AuthRejection::InvalidToken),
        }
    }
}

/// Middleware for `axum::middleware::from_fn_with_state`.
pub async fn require_authorization(
    State(authorizer): State<Arc<dyn Authorizer>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();
    let verdict = authorizer.authorize(&parts.headers).await;
    match verdict {
        Ok(()) => next.run(Request::from_parts(parts, body)).await,
        Err(rejection) => {
            tracing::warn!(
                method = %parts.method,
                path = %parts.uri.path(),
                reason = %rejection,
                "unauthorized request"
            );
            rejection.into_response()
        }
    }
}
