//! One generated handler per route: parse, resolve key, execute, classify.

use crate::config::{DeploymentMode, HandlerConfig, Operation};
use crate::error::AppError;
use crate::request::ResourceRequest;
use crate::response::classify;
use crate::service::{CrudService, KeyResolver, Outcome};
use crate::store::KeyValueStore;
use axum::{http::HeaderMap, response::Response};
use std::collections::HashMap;
use std::sync::Arc;

/// Holds only immutable configuration and the shared store client.
#[derive(Clone)]
pub struct ResourceHandler {
    config: Arc<HandlerConfig>,
    store: Arc<dyn KeyValueStore>,
    mode: DeploymentMode,
}

impl ResourceHandler {
    pub fn new(config: HandlerConfig, store: Arc<dyn KeyValueStore>, mode: DeploymentMode) -> Self {
        Self {
            config: Arc::new(config),
            store,
            mode,
        }
    }

    /// Handler built from the `TABLE_NAME` / `TABLE_PARAMS` environment channel.
    pub fn from_env(
        operation: Operation,
        store: Arc<dyn KeyValueStore>,
        mode: DeploymentMode,
    ) -> Result<Self, AppError> {
        Ok(Self::new(HandlerConfig::from_env(operation)?, store, mode))
    }

    pub async fn handle(
        &self,
        headers: HeaderMap,
        path_params: HashMap<String, String>,
        query_params: HashMap<String, String>,
        body: &[u8],
    ) -> Response {
        let result = match ResourceRequest::parse(headers, path_params, query_params, body) {
            Ok(request) => self.run(request).await,
            Err(err) => Err(err),
        };
        classify(self.config.operation, result, self.mode)
    }

    async fn run(&self, request: ResourceRequest) -> Result<Outcome, AppError> {
        let key = KeyResolver::resolve(&self.config.params.keys, &request)?;
        CrudService::execute(self.store.as_ref(), &self.config, &key, request.body).await
    }
}
