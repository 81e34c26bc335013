//! Process settings from environment variables (after `dotenvy`).

use crate::config::DeploymentMode;
use crate::error::ConfigError;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_CONFIG_PATH: &str = "sample/resources.json";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    DynamoDb { endpoint: Option<String> },
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub mode: DeploymentMode,
    pub config_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub auth_tokens: HashSet<String>,
    pub body_limit: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = lookup("ENV")
            .map(|v| DeploymentMode::from_env_value(&v))
            .unwrap_or_default();
        let config_path = PathBuf::from(lookup("CONFIG_PATH").unwrap_or_else(|| DEFAULT_CONFIG_PATH.into()));
        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::Validation(format!("invalid BIND_ADDR: {}", bind_raw)))?;

        let endpoint = lookup("DYNAMODB_ENDPOINT").filter(|s| !s.is_empty());
        let store = match lookup("STORE_BACKEND").as_deref().map(str::to_lowercase).as_deref() {
            None | Some("memory") => StoreBackend::Memory,
            Some("dynamodb") => StoreBackend::DynamoDb { endpoint },
            Some(other) => {
                return Err(ConfigError::Validation(format!(
                    "invalid STORE_BACKEND: {} (expected memory or dynamodb)",
                    other
                )))
            }
        };

        let auth_tokens = lookup("AUTH_TOKENS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let body_limit = match lookup("BODY_LIMIT_BYTES") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid BODY_LIMIT_BYTES: {}", v)))?,
            None => DEFAULT_BODY_LIMIT,
        };

        Ok(Settings {
            mode,
            config_path,
            bind_addr,
            store,
            auth_tokens,
            body_limit,
        })
    }
}

/// Install the global `tracing` subscriber; `RUST_LOG` overrides `default_directive`.
pub fn init_tracing(default_directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
