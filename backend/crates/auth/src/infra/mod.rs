//! Infrastructure Layer

pub mod google;
pub mod memory;
pub mod postgres;
