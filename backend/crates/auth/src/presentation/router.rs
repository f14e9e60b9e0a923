//! Auth Router

use axum::{Router, middleware, routing::get};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::AuthStore;
use crate::presentation::handlers::{self, AnalyticsState, AuthAppState};
use crate::presentation::middleware::{GateState, require_member};

/// Routes mounted under `/auth`
pub fn auth_router<R, P>(repo: Arc<R>, provider: Arc<P>, config: Arc<AuthConfig>) -> Router
where
    R: AuthStore,
    P: IdentityProvider + Sync + 'static,
{
    let state = AuthAppState {
        gate: GateState::new(repo.clone(), config.clone()),
        repo,
        provider,
        config,
    };

    Router::new()
        .route("/google", get(handlers::google_login::<R, P>))
        .route("/google/callback", get(handlers::google_callback::<R, P>))
        .route("/user", get(handlers::current_user::<R, P>))
        .route("/check", get(handlers::check_session::<R, P>))
        .route(
            "/logout",
            get(handlers::logout::<R, P>).post(handlers::logout::<R, P>),
        )
        .with_state(state)
}

/// Routes mounted under `/api/analytics`, member-only
pub fn analytics_router<R>(repo: Arc<R>, gate: GateState<R>) -> Router
where
    R: AuthStore,
{
    let state = AnalyticsState { repo };

    Router::new()
        .route("/overview", get(handlers::analytics_overview::<R>))
        .route("/users", get(handlers::analytics_users::<R>))
        .route("/activity", get(handlers::analytics_activity::<R>))
        .route_layer(middleware::from_fn_with_state(gate, require_member::<R>))
        .with_state(state)
}
