//! Router assembly: generated resource routes plus the common routes.

mod common;

pub use common::common_routes;

use crate::compiler::CompiledApi;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, Router};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Full service router: resource routes and common routes behind request tracing and a body size limit.
pub fn app_router(api: CompiledApi, state: AppState, body_limit: usize) -> Router {
    api.router
        .merge(common_routes(state))
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
}
