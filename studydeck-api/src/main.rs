//! # StudyDeck API Server
//!
//! Multi-tenant task-tracking backend: registration/login with JWT identity,
//! per-user task CRUD with filtering and sorting, and dashboard statistics.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p studydeck-api
//! ```

use studydeck_api::{
    app::{build_router, AppState},
    config::Config,
};
use studydeck_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "studydeck_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "StudyDeck API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    if config.uses_default_secret() {
        tracing::warn!(
            "JWT_SECRET is not set; falling back to the well-known insecure default. \
             Do NOT run a reachable deployment this way."
        );
    }

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
