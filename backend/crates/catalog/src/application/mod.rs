//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic, the listing cache and persistence.

pub mod config;
pub mod get_chapter;
pub mod list_chapters;
pub mod manage_chapter;
