use std::sync::Arc;

use crate::config::Config;
use crate::document::PageConfig;
use crate::profile::store::ProfileRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable profile store. Production: `PgProfileRepository`.
    pub repo: Arc<dyn ProfileRepository>,
    pub config: Config,
    /// Page geometry for generated documents (A4, 2 cm margins).
    pub page_config: PageConfig,
}

#[cfg(test)]
impl AppState {
    pub fn for_tests(repo: Arc<dyn ProfileRepository>) -> Self {
        AppState {
            repo,
            config: Config {
                database_url: String::new(),
                port: 0,
                rust_log: "info".to_string(),
                upload_limits: crate::profile::validation::UploadLimits::default(),
                db_max_connections: 1,
            },
            page_config: crate::document::default_page_config(),
        }
    }
}
