use log::{error, info};
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!(
        "Starting portal identity service [{}] in {} mode",
        env!("CARGO_PKG_VERSION"),
        config.runtime_env()
    );

    let http_client = match service::init_http_client(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build identity endpoint client: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config, &http_client);

    let app_state = match web::AppState::new(service_state) {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Failed to configure principal resolution: {}", e.message());
            std::process::exit(1);
        }
    };

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
