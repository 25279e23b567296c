//! API server state

use crate::apps::AppsClient;

/// State shared by all request handlers. Everything inside is immutable
/// after startup; the client clones cheaply.
#[derive(Clone)]
pub struct AppState {
    /// Client for the upstream apps service
    pub apps: AppsClient,
}

impl AppState {
    pub fn new(apps: AppsClient) -> Self {
        Self { apps }
    }
}
