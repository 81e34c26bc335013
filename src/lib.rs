//! Resource manager: declarative resource configuration compiled into CRUD routes over a key-value store.

pub mod auth;
pub mod compiler;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod request;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use auth::{Authorizer, StaticTokenAuthorizer};
pub use compiler::{CompiledApi, ResourceCompiler, RouteBinding};
pub use config::{
    init_tracing, load_from_path, DeploymentMode, HandlerConfig, ResourceManagementConfig, Settings, StoreBackend,
};
pub use error::{AppError, AuthRejection, ConfigError, StoreError};
pub use handlers::ResourceHandler;
pub use routes::{app_router, common_routes};
pub use state::AppState;
pub use store::{DynamoStore, KeyValueStore, MemoryStore};
