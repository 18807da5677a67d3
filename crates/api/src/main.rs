use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use wayside_api::config::ServerConfig;
use wayside_api::router::build_app_router;
use wayside_api::state::AppState;
use wayside_core::cities::CityDirectory;
use wayside_db::DbPool;

const DEFAULT_LOG_FILTER: &str = "wayside_api=debug,wayside_db=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let addr = config.bind_addr();

    let cities = CityDirectory::load(&config.cities_path).expect("Failed to load city directory");
    if cities.is_empty() {
        tracing::warn!(path = %config.cities_path, "City directory is empty; feeds will 404");
    }

    let pool = connect_database(&config).await;

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cities: Arc::new(cities),
    };
    let app = build_app_router(state, &config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Shut down cleanly");
}

/// `RUST_LOG` when set, otherwise [`DEFAULT_LOG_FILTER`].
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, probe and migrate. Any failure aborts startup.
async fn connect_database(config: &ServerConfig) -> DbPool {
    let pool = wayside_db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    wayside_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    wayside_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!(max_connections = config.db_max_connections, "Database ready");
    pool
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Ctrl-C handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, draining connections"),
        () = terminate => tracing::info!("SIGTERM received, draining connections"),
    }
}
