//! API state management for the REST server.

use std::sync::Arc;

use crate::guide::GuideService;

/// Shared state for the REST API
#[derive(Clone)]
pub struct ApiState {
    /// The guide service handling all sequence and enrichment operations
    pub service: Arc<GuideService>,
}

impl ApiState {
    /// Create new API state around a constructed service
    pub fn new(service: Arc<GuideService>) -> Self {
        Self { service }
    }
}
