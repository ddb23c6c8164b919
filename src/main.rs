// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vitacare::config::Config;
use vitacare::db::{MemoryStore, PgStore, SharedStore, UserStore};
use vitacare::models::user::{NewUser, Role};
use vitacare::routes;
use vitacare::services::payment::HttpPaymentGateway;
use vitacare::state::AppState;
use vitacare::utils::hash::hash_password;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load configuration from environment (.env included)
    let config = Config::from_env()?;

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let store = open_store(&config).await?;

    // Seed Admin User
    if let Err(e) = seed_admin_user(&store, &config).await {
        tracing::error!("Failed to seed admin user: {:?}", e);
    }

    let gateway = HttpPaymentGateway::new(&config.payment)?;

    let state = AppState {
        store,
        gateway: Arc::new(gateway),
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// In-memory store for `memory://`, otherwise Postgres with a connection retry loop.
async fn open_store(config: &Config) -> Result<SharedStore, BoxError> {
    if config.uses_memory_store() {
        tracing::warn!("Using the in-memory store; data is lost on restart.");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    return Err(format!(
                        "Failed to connect to database after 5 retries: {e}"
                    )
                    .into());
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected...");

    let store = PgStore::new(pool);

    // Run Migrations Automatically
    tracing::info!("Running migrations...");
    store.migrate().await?;
    tracing::info!("Migrations applied successfully.");

    Ok(Arc::new(store))
}

async fn seed_admin_user(store: &SharedStore, config: &Config) -> Result<(), BoxError> {
    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        if store.user_by_email(email).await?.is_none() {
            tracing::info!("Seeding admin user: {}", email);
            let hashed_password = hash_password(password)?;

            store
                .insert_user(NewUser {
                    name: "Administrator".to_string(),
                    email: email.trim().to_lowercase(),
                    password: hashed_password,
                    role: Role::Admin,
                    is_expert: false,
                    can_manage_content: true,
                    can_manage_inquiry: true,
                    phone: None,
                })
                .await?;
            tracing::info!("Admin user created successfully.");
        }
    }
    Ok(())
}
