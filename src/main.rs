use std::sync::{Arc, Mutex};

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use auditorium::config::AppConfig;
use auditorium::db;
use auditorium::services::storage::cloudinary::CloudinaryStorage;
use auditorium::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;

    if config.token_secret == "changeme" {
        tracing::warn!("TOKEN_SECRET is not set, using an insecure default");
    }
    if config.roles.is_empty() {
        tracing::warn!("ROLE_EMAILS is empty, no admin can register");
    }
    if config.cloudinary_cloud_name.is_empty() {
        tracing::warn!("CLOUDINARY_CLOUD_NAME is not set, document uploads will fail");
    }

    let conn = db::init_db(&config.database_url)?;

    let storage = CloudinaryStorage::new(
        config.cloudinary_cloud_name.clone(),
        config.cloudinary_api_key.clone(),
        config.cloudinary_api_secret.clone(),
        config.cloudinary_folder.clone(),
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        storage: Box::new(storage),
    });

    let app = auditorium::build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
