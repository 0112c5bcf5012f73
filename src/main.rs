use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware,
    routing::{get, Router},
};
use tokio::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use crate::{
    config::Config,
    services::{
        AuthService, Database, FollowService, NotificationService, PostService, StorageService,
        UserService,
    },
    state::AppState,
    utils::middleware::auth_middleware,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL")
                .unwrap_or_else(|_| "rainbow_social=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Rainbow-Social service...");

    // Configuration
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // Database connection
    let db = Arc::new(match Database::new(&config).await {
        Ok(db) => match db.verify_connection().await {
            Ok(_) => {
                info!("Database connection established successfully");
                db
            }
            Err(e) => {
                warn!("Database connection failed: {}", e);
                info!("Attempting to auto-start database...");

                if let Err(start_err) = auto_start_database(&config).await {
                    error!(
                        "Failed to auto-start database: {}. Original error: {}",
                        start_err, e
                    );
                    return Err(anyhow::anyhow!("Database connection failed"));
                }

                let db = Database::new(&config).await?;
                db.verify_connection().await?;
                info!("Database auto-started and connected successfully");
                db
            }
        },
        Err(e) => {
            error!("Failed to create database connection: {}", e);
            return Err(anyhow::anyhow!("Database initialization failed"));
        }
    });

    // Services
    let auth_service = AuthService::new(&config).await?;
    let storage_service = StorageService::new(&config).await?;
    let notification_service = NotificationService::new(db.clone()).await?;
    let user_service =
        UserService::new(db.clone(), auth_service.clone(), storage_service.clone()).await?;
    let follow_service = FollowService::new(db.clone(), notification_service.clone()).await?;
    let post_service = PostService::new(
        db.clone(),
        notification_service.clone(),
        storage_service.clone(),
    )
    .await?;

    // Application state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        db: (*db).clone(),
        auth_service,
        user_service,
        follow_service,
        post_service,
        notification_service,
        storage_service,
    });

    // CORS
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .allow_origin(
            config
                .cors_allowed_origins
                .split(',')
                .map(|origin| origin.parse::<HeaderValue>().unwrap())
                .collect::<Vec<_>>(),
        );

    // Routes
    let app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/auth", routes::auth::router())
        .nest("/api/users", routes::users::router())
        .nest("/api/posts", routes::posts::router())
        .nest("/api/notifications", routes::notifications::router())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Serve
    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "Rainbow-Social is running!"
}

async fn auto_start_database(config: &Config) -> anyhow::Result<()> {
    info!("Attempting to start SurrealDB...");

    let output = tokio::process::Command::new("surreal")
        .args([
            "start",
            "--user",
            &config.database_username,
            "--pass",
            &config.database_password,
            "memory",
        ])
        .spawn();

    match output {
        Ok(_) => {
            info!("SurrealDB started successfully");
            tokio::time::sleep(Duration::from_secs(3)).await;
            Ok(())
        }
        Err(e) => {
            error!("Failed to start SurrealDB: {}", e);
            Err(anyhow::anyhow!("Failed to start database"))
        }
    }
}
