//! Example consumer: serves the routes described by `CONFIG_PATH`.
//!
//! Run from repo root: `cargo run -p example-consumer`
//! Use `STORE_BACKEND=dynamodb` (and optionally `DYNAMODB_ENDPOINT`) for a real table store.

use resource_manager::{
    app_router, init_tracing, load_from_path, AppState, DynamoStore, KeyValueStore, MemoryStore,
    ResourceCompiler, Settings, StaticTokenAuthorizer, StoreBackend,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing("resource_manager=info,example_consumer=info,tower_http=info");

    let settings = Settings::from_env()?;
    let store: Arc<dyn KeyValueStore> = match &settings.store {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::DynamoDb { endpoint } => Arc::new(DynamoStore::from_env(endpoint.as_deref()).await),
    };
    if settings.auth_tokens.is_empty() {
        tracing::warn!("AUTH_TOKENS is empty; authorized routes will reject every request");
    }
    let authorizer = Arc::new(StaticTokenAuthorizer::new(settings.auth_tokens.iter().cloned()));

    let config = load_from_path(&settings.config_path).await?;
    let compiler = ResourceCompiler::new(store.clone(), authorizer, settings.mode);
    let api = compiler.compile(&config).await?;
    tracing::info!(routes = api.routes.len(), mode = ?settings.mode, "resources compiled");

    let app = app_router(api, AppState { store }, settings.body_limit);
    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("Example consumer listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    compiler.teardown(&config).await?;
    Ok(())
}
