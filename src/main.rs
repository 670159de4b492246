use tracing_subscriber::EnvFilter;

use reelmate_api::api::{create_router, AppState};
use reelmate_api::config::{Config, StorageBackend};
use reelmate_api::storage::postgres::create_pool;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = match config.storage {
        StorageBackend::Memory => {
            tracing::info!("composing services over the in-memory store");
            AppState::in_memory()
        }
        StorageBackend::Postgres => {
            tracing::info!("composing services over PostgreSQL");
            let pool = create_pool(&config.database_url).await?;
            sqlx::migrate!().run(&pool).await?;
            AppState::with_postgres(pool)
        }
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
