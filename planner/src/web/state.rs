//! Shared application state

use std::sync::Arc;

use crate::pipeline::PlanRunner;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Runner invoked by `POST /plan-project`
    pub runner: Arc<dyn PlanRunner>,
}

impl AppState {
    /// Create new app state
    pub fn new(runner: Arc<dyn PlanRunner>) -> Self {
        Self { runner }
    }
}
