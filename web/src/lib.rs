use axum::http::{header, HeaderValue, Method};
use log::*;
use service::config::Config;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use service::AppState;

mod controller;
mod error;
mod middleware;
mod params;
pub mod router;
mod ws;

pub use error::{Error, Result};

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let listen_addr = format!("{interface}:{}", app_state.config.port);
    let cors = cors_layer(&app_state.config);

    info!(
        "Server starting... listening for connections on http://{listen_addr} (WebSocket at {})",
        app_state.config.ws_path()
    );

    let listener = TcpListener::bind(&listen_addr).await?;
    let app = router::define_routes(app_state).layer(cors);

    axum::serve(listener, app).await
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
