//! Catalog Router

use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

use auth::domain::repository::AuthStore;
use auth::presentation::middleware::{GateState, require_member, require_session};

use crate::application::config::CatalogConfig;
use crate::domain::repository::ChapterRepository;
use crate::presentation::handlers::{self, CatalogAppState};
use crate::presentation::middleware::cache_control;

/// Routes mounted under `/api/chapters`.
///
/// Reads need a session; writes need a session from the allowed domain.
pub fn catalog_router<R, A>(repo: Arc<R>, config: Arc<CatalogConfig>, gate: GateState<A>) -> Router
where
    R: ChapterRepository + Sync + 'static,
    A: AuthStore,
{
    let state = CatalogAppState::new(repo, config.clone());

    let reads = Router::new()
        .route("/", get(handlers::list_chapters::<R>))
        .route("/{id}", get(handlers::get_chapter::<R>))
        .route_layer(middleware::from_fn_with_state(
            gate.clone(),
            require_session::<A>,
        ));

    let writes = Router::new()
        .route("/", post(handlers::create_chapter::<R>))
        .route(
            "/{id}",
            put(handlers::update_chapter::<R>).delete(handlers::delete_chapter::<R>),
        )
        .route("/{id}/duplicate", post(handlers::duplicate_chapter::<R>))
        .route_layer(middleware::from_fn_with_state(gate, require_member::<A>));

    reads
        .merge(writes)
        .layer(middleware::from_fn_with_state(config, cache_control))
        .with_state(state)
}
