use std::env;

use tracing::info;

/// Runtime configuration, read once at startup and passed explicitly to every
/// consumer. Nothing else in the crate touches the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the congress API, without a trailing slash.
    pub api_base: String,
    /// Name of the anti-forgery cookie issued by the API.
    pub token_cookie: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let api_base = var_or("CONGRESO_API_URL", "http://127.0.0.1:8000");
        let api_base = api_base.trim_end_matches('/').to_string();
        let token_cookie = var_or("CONGRESO_TOKEN_COOKIE", "csrftoken");
        let host = var_or("HOST", "127.0.0.1");
        let port = var_or("PORT", "3000").parse().unwrap_or(3000);

        Self {
            api_base,
            token_cookie,
            host,
            port,
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}
