//! Database record models matching table schemas.
//!
//! Each model struct corresponds to a database table row. Repositories return
//! `*DBResponse` rows and accept `*CreateDBRequest` / `*UpdateDBRequest`
//! structs. Database models are distinct from the API models in
//! [`crate::api::models`] so storage and wire representations can evolve
//! independently.

pub mod allocations;
pub mod finance;
pub mod housing;
pub mod meals;
pub mod operations;
pub mod payments;
pub mod system_config;
pub mod users;
