//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use storefront_core::{DatabaseService, DeliveryNotifier, ImageStorageService};

/// The shared application state, created once at startup and passed to all handlers.
///
/// It holds no per-user data: the caller's identity travels with each request.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub delivery: Arc<DeliveryNotifier>,
    /// `None` when no image host is configured.
    pub images: Option<Arc<dyn ImageStorageService>>,
}
