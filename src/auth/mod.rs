//! Authentication and authorization.
//!
//! Browser-based authentication with secure HTTP-only cookies:
//! - Users log in via `/api/auth/login` with email and password
//! - The session token is an opaque random value held in a cookie
//! - Tokens resolve through an in-process [`session::SessionStore`]
//!
//! Authorization is role-based. [`current_user::RequireAdmin`] gates the
//! management routes; handlers that allow self-service compare the
//! authenticated user's id against the target resource.

pub mod current_user;
pub mod password;
pub mod session;

pub use current_user::RequireAdmin;
pub use session::SessionStore;
