//! Persistence layer: repositories, row models, and database errors.

pub mod errors;
pub mod handlers;
pub mod models;
