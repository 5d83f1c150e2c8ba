mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use dialdesk_api::auth::{AppState, AppStateInner};
use dialdesk_api::identity::GoogleIdentity;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dialdesk=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    let db = dialdesk_db::Database::open(&PathBuf::from(&config.db_path))?;

    let state: AppState = Arc::new(AppStateInner {
        db,
        vapi_private_key: config.vapi_private_key.clone(),
        webhook_key: config.webhook_key.clone(),
        identity: config.google_client_id.clone().map(GoogleIdentity::new),
    });

    let app = dialdesk_api::router(state)
        .layer(cors_layer(&config)?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("DialDesk server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Restrict CORS to the configured allow-list; stay permissive when none is
/// configured so local dashboards work out of the box.
fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    if config.cors_origins.is_empty() {
        return Ok(CorsLayer::permissive());
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true))
}
