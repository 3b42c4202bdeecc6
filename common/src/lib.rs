//! Shared building blocks for the MongoDB administration services:
//! configuration, error taxonomy, response envelope, models and middleware.

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
