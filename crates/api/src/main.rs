//! API server entry point.

use axum::Router;
use domain::{Money, Product, UserAccount};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{MemoryStore, PostgresStore};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use api::config::Config;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Seeds a small catalog and directory so the in-memory server answers
/// requests out of the box.
async fn seed_demo_records(store: &MemoryStore) {
    store
        .upsert_product(
            Product::new("SKU-001", "Ceramic mug", Money::from_cents(4999), 50).with_moq(2),
        )
        .await;
    store
        .upsert_product(Product::new(
            "SKU-002",
            "Walnut desk organizer",
            Money::from_cents(12900),
            20,
        ))
        .await;
    store
        .upsert_account(UserAccount::manager("manager@example.com"))
        .await;
}

/// Builds the application router over the store `DATABASE_URL` selects.
async fn build_app(config: &Config, metrics_handle: PrometheusHandle) -> Router {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresStore::connect(url)
                .await
                .expect("failed to connect to database");
            store
                .run_migrations()
                .await
                .expect("failed to run migrations");
            tracing::info!("using PostgreSQL store");
            let state = api::create_state(store, config.checkout());
            api::create_app(state, metrics_handle)
        }
        None => {
            let store = MemoryStore::new();
            seed_demo_records(&store).await;
            tracing::info!("using in-memory store with demo records");
            let state = api::create_state(store, config.checkout());
            api::create_app(state, metrics_handle)
        }
    }
}

#[tokio::main]
async fn main() {
    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let prometheus_builder = metrics_exporter_prometheus::PrometheusBuilder::new();
    let metrics_handle = prometheus_builder
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Build the application over the configured store
    let config = Config::from_env();
    let app = build_app(&config, metrics_handle).await;

    // 4. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
