//! Resource compiler: provisions tables and turns route descriptors into an axum router.

use crate::auth::{require_authorization, Authorizer};
use crate::config::{
    validate, DeploymentMode, HandlerConfig, HttpMethod, Operation, ResourceManagementConfig, RouteDescriptor,
};
use crate::error::ConfigError;
use crate::handlers::ResourceHandler;
use crate::store::KeyValueStore;
use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::HeaderMap,
    middleware,
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::info;

/// One registered route, for startup logging and inspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteBinding {
    pub method: HttpMethod,
    pub path: String,
    pub table: String,
    pub operation: Operation,
    pub authorized: bool,
}

pub struct CompiledApi {
    pub router: Router,
    pub routes: Vec<RouteBinding>,
}

pub struct ResourceCompiler {
    store: Arc<dyn KeyValueStore>,
    authorizer: Arc<dyn Authorizer>,
    mode: DeploymentMode,
}

impl ResourceCompiler {
    pub fn new(store: Arc<dyn KeyValueStore>, authorizer: Arc<dyn Authorizer>, mode: DeploymentMode) -> Self {
        Self {
            store,
            authorizer,
            mode,
        }
    }

    /// Validate, provision every table, and register one handler per route.
    pub async fn compile(&self, config: &ResourceManagementConfig) -> Result<CompiledApi, ConfigError> {
        validate(config)?;

        let mut paths: BTreeMap<String, MethodRouter> = BTreeMap::new();
        let mut routes = Vec::new();
        for resource in &config.resources {
            let table = &resource.table;
            self.store
                .create_table(table)
                .await
                .map_err(|source| ConfigError::Provision {
                    table: table.name.clone(),
                    source,
                })?;
            info!(table = %table.name, "table provisioned");

            for route in &resource.routes {
                let handler = ResourceHandler::new(
                    HandlerConfig::for_route(resource, route),
                    self.store.clone(),
                    self.mode,
                );
                let method_router = self.method_router(route, handler);
                let path = router_path(&route.path);
                let merged = match paths.remove(&path) {
                    Some(existing) => existing.merge(method_router),
                    None => method_router,
                };
                paths.insert(path, merged);

                let binding = RouteBinding {
                    method: route.method,
                    path: route.path.clone(),
                    table: table.name.clone(),
                    operation: route.operation,
                    authorized: route.is_authorize,
                };
                info!(
                    method = %binding.method,
                    path = %binding.path,
                    table = %binding.table,
                    operation = %binding.operation,
                    authorized = binding.authorized,
                    "route registered"
                );
                routes.push(binding);
            }
        }

        let router = paths
            .into_iter()
            .fold(Router::new(), |router, (path, method_router)| router.route(&path, method_router));
        Ok(CompiledApi { router, routes })
    }

    /// Drop provisioned tables when the environment allows it; otherwise leave them in place.
    pub async fn teardown(&self, config: &ResourceManagementConfig) -> Result<(), ConfigError> {
        let destroyable = config.environment(self.mode).is_destroyable;
        for resource in &config.resources {
            let table = &resource.table.name;
            if !destroyable {
                info!(table = %table, mode = ?self.mode, "table retained");
                continue;
            }
            self.store
                .delete_table(table)
                .await
                .map_err(|source| ConfigError::Provision {
                    table: table.clone(),
                    source,
                })?;
            info!(table = %table, "table dropped");
        }
        Ok(())
    }

    fn method_router(&self, route: &RouteDescriptor, handler: ResourceHandler) -> MethodRouter {
        let method_router = on(
            method_filter(route.method),
            move |path: Option<Path<HashMap<String, String>>>,
                  Query(query): Query<HashMap<String, String>>,
                  headers: HeaderMap,
                  body: Bytes| async move {
                let path_params = path.map(|Path(params)| params).unwrap_or_default();
                handler.handle(headers, path_params, query, &body).await
            },
        );
        if route.is_authorize {
            method_router.route_layer(middleware::from_fn_with_state(
                self.authorizer.clone(),
                require_authorization,
            ))
        } else {
            method_router
        }
    }
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
        HttpMethod::Head => MethodFilter::HEAD,
        HttpMethod::Options => MethodFilter::OPTIONS,
    }
}

/// `/items/{id}` to axum's `/items/:id`.
pub fn router_path(path: &str) -> String {
    path.split('/')
        .map(|segment| match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => format!(":{}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}
