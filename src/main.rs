//! multiblog - multi-tenant blog front

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use multiblog::{
    api::{self, AppState},
    config::Config,
    db,
    services::I18nService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "multiblog=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting multiblog...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!(runtime_mode = %config.runtime_mode, "Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    // Run migrations
    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!(applied, "Database migrations completed");

    // Build application state (repositories, services, themes)
    let addr = config.server_addr();
    let state = AppState::new(config, pool)?;
    tracing::info!(
        themes = ?state.theme_engine.list_themes(),
        default = state.theme_engine.default_theme(),
        "Theme engine initialized"
    );

    tracing::info!(locales = ?I18nService::available_locales(), "Locales bundled");

    // Build router
    let app = api::build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
