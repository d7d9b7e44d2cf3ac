use config::Config;
use log::info;
use std::sync::Arc;

pub mod config;
pub mod logging;

/// Builds the outbound HTTP client shared by every identity endpoint call.
///
/// Calls made with this client are never retried.
pub fn init_http_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    info!(
        "Identity client config: principal_source={}, endpoint={}, public_origin={}, timeout={}",
        config.principal_source,
        config.identity_endpoint_url().unwrap_or("unset"),
        config.public_origin().unwrap_or("unset"),
        config
            .identity_request_timeout()
            .map(|t| format!("{}s", t.as_secs()))
            .unwrap_or_else(|| "none".to_string()),
    );

    let mut builder = reqwest::Client::builder()
        .use_rustls_tls()
        .user_agent(format!("portal-auth/{}", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = config.identity_request_timeout() {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

// Service-level state containing only infrastructure concerns
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub http_client: Arc<reqwest::Client>,
    pub config: Config,
}

impl AppState {
    pub fn new(app_config: Config, http_client: &Arc<reqwest::Client>) -> Self {
        Self {
            http_client: Arc::clone(http_client),
            config: app_config,
        }
    }

    pub fn http_client_ref(&self) -> &reqwest::Client {
        self.http_client.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_http_client_with_and_without_timeout() {
        let config = Config::from_env();
        assert!(init_http_client(&config).is_ok());

        let mut config = Config::from_env();
        config.identity_request_timeout_secs = 3;
        assert!(init_http_client(&config).is_ok());
    }

    #[test]
    fn test_app_state_shares_http_client() {
        let client = Arc::new(reqwest::Client::new());
        let state = AppState::new(Config::from_env(), &client);
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.http_client, &cloned.http_client));
        assert_eq!(Arc::strong_count(&client), 3);
    }
}
