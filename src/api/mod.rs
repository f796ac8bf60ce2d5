//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! Everything is served under `/api`, divided into functional areas:
//!
//! - **Authentication** (`/api/auth/*`): Login, logout, current session
//! - **Users** (`/api/users/*`, `/api/students`, `/api/employees`)
//! - **Housing** (`/api/blocks/*`, `/api/rooms/*`, `/api/seat-allocations/*`)
//! - **Money** (`/api/student-payments/*`, `/api/vendor-payments/*`, `/api/expenses/*`, `/api/salaries/*`)
//! - **Mess** (`/api/meal-rates/*`, `/api/meal-records/*`)
//! - **Operations** (`/api/notices/*`, `/api/complaints/*`, `/api/attendance/*`)
//! - **Configuration** (`/api/system-config/*`)
//! - **Read side** (`/api/stats/*`)
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! Interactive API documentation is served at `/docs`.

pub mod handlers;
pub mod models;
