//! HumanTic API server entrypoint

use anyhow::Context;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use humantic_api::{routes::create_router, AppState, Config};

#[cfg(feature = "billing")]
use humantic_api::state::BillingState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;

    let pool = humantic_shared::db::create_pool(
        &config.database_url,
        config.database_max_connections,
    )
    .await
    .context("Failed to connect to database")?;

    humantic_shared::db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    #[cfg(feature = "billing")]
    let billing = if config.enable_billing {
        Some(BillingState::from_env(pool.clone()).context("Failed to initialize billing")?)
    } else {
        tracing::warn!("Billing is disabled by configuration");
        None
    };

    let bind_address = config.bind_address.clone();
    let state = AppState::new(
        config,
        pool,
        #[cfg(feature = "billing")]
        billing,
    );

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new());

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!(address = %bind_address, "HumanTic API listening");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,humantic_api=debug"));

    // JSON logs in production, human-readable otherwise
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
