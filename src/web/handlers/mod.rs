//! API handlers for the depot Web API.

pub mod files;

pub use files::*;

use crate::store::FileStore;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// File store backing every endpoint.
    pub store: FileStore,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }
}
