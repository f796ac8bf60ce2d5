//! Request extractors for the authenticated user and the admin gate.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session::token_from_cookie_header,
    db::{
        errors::DbError,
        handlers::{Repository, Users},
    },
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    /// Resolves the session cookie to a live user row. The role and active
    /// flag come from the database on every request, so a deactivation or
    /// demotion takes effect immediately.
    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let cookie_header = parts
            .headers
            .get(axum::http::header::COOKIE)
            .ok_or(Error::Unauthenticated { message: None })?;

        let cookie_str = cookie_header.to_str().map_err(|e| Error::BadRequest {
            message: format!("Invalid cookie header: {e}"),
        })?;

        let token = token_from_cookie_header(cookie_str, &state.config.auth.cookie_name)
            .ok_or(Error::Unauthenticated { message: None })?;

        let user_id = state.sessions.resolve(&token).ok_or_else(|| {
            trace!("Session token not found in store");
            Error::Unauthenticated { message: None }
        })?;

        let mut conn = state.db.acquire().await.map_err(DbError::from)?;
        let user = Users::new(&mut conn)
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| {
                // The account was deleted while the session was live
                state.sessions.revoke(&token);
                Error::Unauthenticated { message: None }
            })?;

        if !user.is_active {
            debug!("Rejecting session for deactivated user {}", user.id);
            return Err(Error::Unauthenticated {
                message: Some("Account is deactivated".to_string()),
            });
        }

        Ok(CurrentUser::from(user))
    }
}

/// Extractor that additionally requires an admin role.
///
/// ADMIN and SUPER_ADMIN pass; everyone else gets a 403.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(Error::Forbidden {
                message: "Admin access required".to_string(),
            });
        }
        Ok(RequireAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app_state, create_test_user};
    use axum::extract::FromRequestParts as _;
    use sqlx::PgPool;

    fn parts_with_cookie(cookie: &str) -> Parts {
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .header(axum::http::header::COOKIE, cookie)
            .body(())
            .unwrap();
        let (parts, _body) = request.into_parts();
        parts
    }

    #[sqlx::test]
    async fn test_valid_session_resolves_user(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let token = state.sessions.create(user.id);

        let cookie = format!("{}={}", state.config.auth.cookie_name, token);
        let mut parts = parts_with_cookie(&cookie);

        let current = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(current.id, user.id);
        assert_eq!(current.role, Role::Student);
    }

    #[sqlx::test]
    async fn test_unknown_token_rejected(pool: PgPool) {
        let state = create_test_app_state(pool);
        let cookie = format!("{}=not-a-real-token", state.config.auth.cookie_name);
        let mut parts = parts_with_cookie(&cookie);

        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_missing_cookie_rejected(pool: PgPool) {
        let state = create_test_app_state(pool);
        let request = axum::http::Request::builder()
            .uri("http://localhost/test")
            .body(())
            .unwrap();
        let (mut parts, _body) = request.into_parts();

        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_student_fails_admin_gate(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let token = state.sessions.create(user.id);

        let cookie = format!("{}={}", state.config.auth.cookie_name, token);
        let mut parts = parts_with_cookie(&cookie);

        let err = RequireAdmin::from_request_parts(&mut parts, &state).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_admin_passes_admin_gate(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let token = state.sessions.create(user.id);

        let cookie = format!("{}={}", state.config.auth.cookie_name, token);
        let mut parts = parts_with_cookie(&cookie);

        let RequireAdmin(current) = RequireAdmin::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(current.id, user.id);
    }
}
