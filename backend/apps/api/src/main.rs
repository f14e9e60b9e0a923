//! API Server Entry Point
//!
//! Wires configuration, stores and routers together. Uses `anyhow` for
//! startup errors only; handlers return their crate's error type.

mod config;

use auth::application::session_store::SessionStore;
use auth::domain::repository::AuthStore;
use auth::{
    GateState, GoogleIdentityProvider, MemoryAuthRepository, PgAuthRepository, analytics_router,
    auth_router,
};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
};
use catalog::domain::repository::ChapterRepository;
use catalog::{MemoryChapterRepository, PgChapterRepository, cache_control, catalog_router};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    if !config.oauth_configured() {
        tracing::warn!("GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET not set, sign-in will fail");
    }
    let provider = Arc::new(GoogleIdentityProvider::new(config.auth.oauth.clone())?);

    let app = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;
            tracing::info!("Migrations completed");

            build_app(
                Arc::new(PgAuthRepository::new(pool.clone())),
                Arc::new(PgChapterRepository::new(pool)),
                provider,
                &config,
            )
            .await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running on in-memory stores");
            build_app(
                Arc::new(MemoryAuthRepository::new()),
                Arc::new(MemoryChapterRepository::new()),
                provider,
                &config,
            )
            .await
        }
    };

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(cors(&config.auth.frontend_url));

    tracing::info!(
        address = %config.bind_address,
        allowed_domain = %config.auth.allowed_domain,
        "Listening"
    );
    let listener = TcpListener::bind(config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn build_app<A, C>(
    auth_repo: Arc<A>,
    chapters: Arc<C>,
    provider: Arc<GoogleIdentityProvider>,
    config: &ServerConfig,
) -> Router
where
    A: AuthStore,
    C: ChapterRepository + Sync + 'static,
{
    let auth_config = Arc::new(config.auth.clone());
    let catalog_config = Arc::new(config.catalog.clone());

    // A failed sweep must not keep the server down
    let sessions = SessionStore::new(auth_repo.clone(), auth_config.clone());
    match sessions.sweep_expired().await {
        Ok(deleted) => {
            tracing::info!(sessions_deleted = deleted, "Startup session sweep completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Startup session sweep failed, continuing anyway");
        }
    }
    spawn_session_sweeper(sessions);

    let gate = GateState::new(auth_repo.clone(), auth_config.clone());

    let analytics = analytics_router(auth_repo.clone(), gate.clone()).layer(
        middleware::from_fn_with_state(catalog_config.clone(), cache_control),
    );

    Router::new()
        .nest("/auth", auth_router(auth_repo, provider, auth_config))
        .nest("/api/analytics", analytics)
        .nest("/api/chapters", catalog_router(chapters, catalog_config, gate))
}

/// Reclaim sessions that expired without ever being looked up again
fn spawn_session_sweeper<A: AuthStore>(sessions: SessionStore<A>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        // The first tick completes immediately; startup already swept
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = sessions.sweep_expired().await {
                tracing::warn!(error = %e, "Session sweep failed");
            }
        }
    });
}

fn cors(frontend_url: &str) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = frontend_url
        .split(',')
        .filter_map(|origin| origin.trim().trim_end_matches('/').parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .expose_headers([HeaderName::from_static("x-auth-required")])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
