//! Catalog Backend Module
//!
//! Course-material chapters grouped by class and unit.
//!
//! Clean Architecture structure:
//! - `domain/` - Chapter entity, value objects, validation, repository trait
//! - `application/` - Cached listing and write use cases
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, Cache-Control middleware, router
//!
//! Listings are memoized per filter for a bounded freshness window. Any
//! successful write clears the whole listing cache before it responds.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use infra::memory::MemoryChapterRepository;
pub use infra::postgres::PgChapterRepository;
pub use presentation::middleware::cache_control;
pub use presentation::router::catalog_router;

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}
