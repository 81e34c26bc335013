//! Shared application state for the common routes.

use crate::store::KeyValueStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// One store client per process, shared with every generated handler.
    pub store: Arc<dyn KeyValueStore>,
}
