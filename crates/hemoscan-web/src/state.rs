//! Shared application state for the web server.

use std::sync::Arc;

use hemoscan_classifier::Classifier;
use hemoscan_config::Config;

use crate::render::Templates;

/// Shared state injected into every Axum handler.
pub struct AppState {
    /// Loaded once at startup and only read afterwards.
    pub classifier: Arc<dyn Classifier>,
    pub templates: Templates,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(classifier: Arc<dyn Classifier>) -> Result<Self, minijinja::Error> {
        Ok(Self {
            classifier,
            templates: Templates::new()?,
            max_upload_bytes: Config::default().upload.max_bytes,
        })
    }

    pub fn with_max_upload_bytes(mut self, max_bytes: usize) -> Self {
        self.max_upload_bytes = max_bytes;
        self
    }
}

pub type SharedState = Arc<AppState>;
