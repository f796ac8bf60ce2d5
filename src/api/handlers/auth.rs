use axum::{Json, extract::State, http::HeaderMap};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, LoginRequest, LoginResponse, LogoutResponse, MeResponse},
        users::{CurrentUser, UserResponse},
    },
    auth::{password, session},
    db::{errors::DbError, handlers::Users},
    errors::Error,
};

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(DbError::from)?;
    let mut user_repo = Users::new(&mut pool_conn);

    // Find user by email
    let user = user_repo
        .get_by_email(&request.email)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        });
    }

    if !user.is_active {
        return Err(Error::Unauthenticated {
            message: Some("Account is deactivated".to_string()),
        });
    }

    let token = state.sessions.create(user.id);
    let cookie = session::session_cookie(&state.config.auth.cookie_name, &token);

    Ok(LoginResponse {
        auth_response: AuthResponse {
            user: UserResponse::from(user),
            message: "Login successful".to_string(),
        },
        cookie,
    })
}

/// Logout (revoke session)
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Result<LogoutResponse, Error> {
    // Revoke the session server-side when a token is presented. Logging out
    // with no cookie still succeeds.
    if let Some(cookie_header) = headers.get(axum::http::header::COOKIE)
        && let Ok(cookie_str) = cookie_header.to_str()
        && let Some(token) = session::token_from_cookie_header(cookie_str, &state.config.auth.cookie_name)
    {
        state.sessions.revoke(&token);
    }

    let cookie = session::clear_session_cookie(&state.config.auth.cookie_name);

    Ok(LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie,
    })
}

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(
        ("session_token" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn me(current_user: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse { user: current_user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::Repository;
    use crate::test_utils::{create_test_app_state, create_test_user};
    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::PgPool;

    fn auth_router(state: AppState) -> axum::Router {
        axum::Router::new()
            .route("/auth/login", axum::routing::post(login))
            .route("/auth/logout", axum::routing::post(logout))
            .route("/auth/me", axum::routing::get(me))
            .with_state(state)
    }

    #[sqlx::test]
    async fn test_login_sets_cookie_and_me_resolves(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let server = TestServer::new(auth_router(state)).unwrap();

        let response = server
            .post("/auth/login")
            .json(&json!({"email": user.email, "password": "password123"}))
            .await;
        response.assert_status_ok();
        let set_cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap().to_string();
        assert!(set_cookie.contains("HttpOnly"));

        let body: AuthResponse = response.json();
        assert_eq!(body.user.email, "resident@example.com");

        let me_response = server
            .get("/auth/me")
            .add_header(
                axum::http::header::COOKIE,
                set_cookie.split(';').next().unwrap().to_string(),
            )
            .await;
        me_response.assert_status_ok();
        let body: MeResponse = me_response.json();
        assert_eq!(body.user.id, user.id);
        assert_eq!(body.user.email, "resident@example.com");
    }

    #[sqlx::test]
    async fn test_login_wrong_password(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let server = TestServer::new(auth_router(state)).unwrap();

        let response = server
            .post("/auth/login")
            .json(&json!({"email": user.email, "password": "not-the-password"}))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_login_deactivated_user(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user(&pool, "resident@example.com", Role::Student).await;

        let mut conn = pool.acquire().await.unwrap();
        Users::new(&mut conn)
            .update(
                user.id,
                &crate::db::models::users::UserUpdateDBRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let server = TestServer::new(auth_router(state)).unwrap();
        let response = server
            .post("/auth/login")
            .json(&json!({"email": user.email, "password": "password123"}))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_login_unknown_email(pool: PgPool) {
        let state = create_test_app_state(pool);
        let server = TestServer::new(auth_router(state)).unwrap();

        let response = server
            .post("/auth/login")
            .json(&json!({"email": "nobody@example.com", "password": "password123"}))
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_logout_revokes_session(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let token = state.sessions.create(user.id);
        let cookie = format!("{}={}", state.config.auth.cookie_name, token);
        let server = TestServer::new(auth_router(state.clone())).unwrap();

        let response = server
            .post("/auth/logout")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .await;
        response.assert_status_ok();
        assert!(
            response
                .headers()
                .get("set-cookie")
                .unwrap()
                .to_str()
                .unwrap()
                .contains("Max-Age=0")
        );

        // The old token no longer authenticates
        let me_response = server.get("/auth/me").add_header(axum::http::header::COOKIE, cookie).await;
        me_response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }
}
