use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use domain::error::Error as DomainError;
use domain::PrincipalResolver;
use log::*;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

mod controller;
mod error;
mod extractors;
mod middleware;
mod router;

pub use router::define_routes;

/// Web-level state: the service infrastructure plus the shared principal resolver.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub principal_resolver: Arc<PrincipalResolver>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service_state: service::AppState) -> Result<Self, DomainError> {
        let principal_resolver = PrincipalResolver::new(
            &service_state.config,
            service_state.http_client_ref().clone(),
        )?;

        Ok(Self {
            service_state,
            principal_resolver: Arc::new(principal_resolver),
            started_at: Instant::now(),
        })
    }

    pub fn config(&self) -> &service::config::Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = app_state.config();
    let interface = config.interface.as_deref().unwrap_or("127.0.0.1");
    let server_url = format!("{}:{}", interface, config.port);

    info!(
        "Server starting... listening for connections on http://{server_url} ({} environment, principal source: {})",
        config.runtime_env(),
        config.principal_source
    );

    let cors_layer = cors_layer(&config.allowed_origins);
    let listener = TcpListener::bind(&server_url).await?;

    axum::serve(listener, define_routes(app_state).layer(cors_layer)).await
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin:?}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_credentials(true)
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .allow_origin(AllowOrigin::list(origins))
}
