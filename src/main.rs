//! HTTP server for the time & attendance engine.
//!
//! Environment:
//! - `KINTAI_CONFIG_DIR`: tenant configuration directory (default `./config/default`)
//! - `KINTAI_BIND_ADDR`: listen address (default `127.0.0.1:3000`)
//! - `RUST_LOG`: tracing filter (default `info`)

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kintai_engine::api::{create_router, AppState};
use kintai_engine::config::ConfigLoader;
use kintai_engine::engine::Engine;
use kintai_engine::repository::InMemoryRepository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_dir =
        std::env::var("KINTAI_CONFIG_DIR").unwrap_or_else(|_| "./config/default".to_string());
    let addr = std::env::var("KINTAI_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());

    let loader = ConfigLoader::load(&config_dir)?;
    let repo = InMemoryRepository::new();
    loader.seed(&repo)?;
    let engine = Engine::new(repo, loader.engine_settings()?);
    info!(
        tenant_id = %loader.tenant().tenant_id,
        config_dir = %config_dir,
        "Engine ready"
    );

    let app = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
