use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use api::{AppState, create_router, images::ImageDepot};
use common::{
    database::{DatabaseConfig, health_check, init_pool},
    settings::Settings,
};
use store::PgStore;
use token::JwtMaker;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting API service");

    let settings = Settings::load()?;
    let token_maker = JwtMaker::new(&settings.token_symmetric_key)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let store = PgStore::new(pool)
        .await?
        .with_operation_timeout(settings.operation_timeout());

    let app_state = AppState {
        store: Arc::new(store),
        token_maker: Arc::new(token_maker),
        images: ImageDepot::new(&settings.images_path),
    };

    // Start the web server
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&settings.server_address).await?;
    info!("API service listening on {}", settings.server_address);

    axum::serve(listener, app).await?;

    Ok(())
}
