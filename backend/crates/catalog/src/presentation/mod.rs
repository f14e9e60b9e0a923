//! Presentation Layer - HTTP API
//!
//! This layer contains:
//! - HTTP handlers
//! - Request/Response DTOs
//! - Cache-Control middleware
//! - Router configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
