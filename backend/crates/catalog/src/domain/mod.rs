//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Chapter, ChapterDraft)
//! - Domain value objects (ClassNumber, ChapterNumber, ChapterFilter)
//! - Domain services (input and filter validation)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
