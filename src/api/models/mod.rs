//! API request and response models.
//!
//! Wire-facing types with camelCase field names, separate from the database
//! models so the storage schema can change without breaking clients. Create
//! and update types carry their own `validate()` which runs before any
//! persistence side effect.

pub mod allocations;
pub mod auth;
pub mod finance;
pub mod housing;
pub mod meals;
pub mod operations;
pub mod payments;
pub mod stats;
pub mod system_config;
pub mod users;
