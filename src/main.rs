use recruit_portal::{
    AppState,
    config::{AppConfig, DEFAULT_ADMIN_PASSWORD, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
    storage::{MediaStorage, ObjectStore, S3ObjectStore},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Entry point: configuration, logging, database (with migrations), object
/// storage, then the HTTP server. Every startup failure is fatal.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: invalid configuration");

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for this crate and request logs from tower_http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "recruit_portal=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for log aggregation.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    if config.admin_password == DEFAULT_ADMIN_PASSWORD {
        tracing::warn!("ADMIN_PASSWORD is not set; the default admin password is in use");
    }

    // 4. Database Initialization (Postgres)
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: database migrations failed");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Storage Initialization (S3/MinIO)
    // Without a bucket the service still runs: uploads and /storage reads answer 500.
    let storage = match config.s3_bucket.as_deref() {
        Some(bucket) => {
            let store = S3ObjectStore::new(
                &config.s3_endpoint,
                &config.s3_region,
                &config.s3_key,
                &config.s3_secret,
                bucket,
            );

            // LOCAL-ONLY: create the MinIO bucket for the Dockerized setup.
            if config.env == Env::Local {
                store.ensure_bucket_exists().await;
            }

            tracing::info!(bucket, endpoint = %config.s3_endpoint, "object storage configured");
            MediaStorage::new(Arc::new(store), &config.uploads_dir)
        }
        None => {
            tracing::warn!("S3_BUCKET_NAME is not set; object storage is disabled");
            MediaStorage::unconfigured(&config.uploads_dir)
        }
    };

    // 6. Unified State Assembly
    let port = config.port;
    let app_state = AppState {
        repo,
        storage,
        config,
    };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("FATAL: failed to bind HTTP listener");

    tracing::info!("Listening on 0.0.0.0:{port}");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:{port}/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server error");
}
