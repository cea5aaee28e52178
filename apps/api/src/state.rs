use std::sync::Arc;

use crate::analysis::collaborators::KeyValueStore;
use crate::analysis::orchestrator::ResumeAnalyzer;
use crate::config::Config;
use crate::upload::selection::SelectionPolicy;
use crate::upload::session::InFlightSessions;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: ResumeAnalyzer,
    /// Read side of record storage, for the detail endpoint.
    pub kv: Arc<dyn KeyValueStore>,
    pub sessions: InFlightSessions,
    pub selection_policy: SelectionPolicy,
    pub config: Config,
}
