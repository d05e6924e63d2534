pub mod routes;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::api_client::ApiClient;

/// Shared handler state: the one configuration object and the one API
/// client (it owns the cookie jar, so it must be shared, not rebuilt).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub api: Arc<ApiClient>,
}
