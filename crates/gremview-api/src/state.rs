//! Shared application state.

use gremview_client::Backend;
use gremview_core::GremviewConfig;
use gremview_query::Pipeline;
use std::sync::Arc;

/// State shared by all handlers.
pub struct AppState {
    /// The query pipeline; cheap to clone into request tasks.
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    /// Creates state around an existing pipeline.
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Creates state for `backend` with `config`.
    pub fn from_config(backend: Arc<dyn Backend>, config: GremviewConfig) -> Self {
        Self::new(Pipeline::new(backend, config))
    }

    /// The active configuration.
    pub fn config(&self) -> &GremviewConfig {
        self.pipeline.config()
    }
}
