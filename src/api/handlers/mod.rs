//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and authorization checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`allocations`]: Seat allocation management and per-student history
//! - [`auth`]: Login, logout, and current session lookup
//! - [`finance`]: Vendor payments, expenses, and staff salaries
//! - [`housing`]: Block and room management
//! - [`meals`]: Meal rates, daily meal records, and bulk submission
//! - [`operations`]: Notices, complaints, and attendance
//! - [`payments`]: Student fee payments and approval
//! - [`stats`]: Dashboard and meal cost aggregations
//! - [`system_config`]: Keyed configuration entries
//! - [`users`]: User CRUD and role-scoped listings
//!
//! # Authentication
//!
//! All handlers except login, logout, and the health check require a session
//! cookie. The [`crate::auth`] module provides the extractors handlers use to
//! access the current user and to gate admin-only routes.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to appropriate
//! HTTP status codes and JSON error responses.

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
