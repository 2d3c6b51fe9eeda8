//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::config::Settings;
use crate::infrastructure::{cache, database};
use crate::presentation::http::handlers::health;
use crate::presentation::http::routes;
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::gateway::Gateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: ConnectionManager,
    pub gateway: Arc<Gateway>,
    pub settings: Arc<Settings>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool and bring the schema up to date
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        // Create Redis client
        let redis = cache::create_redis_client(&settings.redis).await?;
        tracing::info!("Redis connection established");

        // Create WebSocket gateway
        let gateway = Arc::new(Gateway::new(settings.websocket.heartbeat_interval_ms));

        // Pin the start time the health probes report uptime from
        health::init_server_start();

        // Create app state
        let state = AppState {
            db,
            redis,
            gateway,
            settings: Arc::new(settings.clone()),
        };

        // Build router with middleware
        let router = routes::create_router(state.clone())
            .layer(logging::create_trace_layer())
            .layer(cors::create_cors_layer(&settings.cors));

        // Bind to address; the host may be a name, tokio resolves it
        let listener = TcpListener::bind(settings.server_addr()).await?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
