//! Shared application state for the facilitator.

use std::sync::Arc;

use crate::upstream::BoxUpstream;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<BoxUpstream>,
}

impl AppState {
    pub fn new(upstream: BoxUpstream) -> Self {
        Self {
            upstream: Arc::new(upstream),
        }
    }
}
