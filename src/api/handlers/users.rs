use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::users::{CurrentUser, ListUsersQuery, Role, UserCreate, UserResponse, UserUpdate},
    auth::{RequireAdmin, password},
    db::{
        errors::DbError,
        handlers::{Repository, Users, users::UserFilter},
        models::users::{UserCreateDBRequest, UserUpdateDBRequest},
    },
    errors::Error,
    types::UserId,
};

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of users", body = Vec<UserResponse>),
        (status = 403, description = "Admin access required"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let users = Users::new(&mut conn)
        .list(&UserFilter {
            role: query.role,
            is_active: query.is_active,
        })
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserCreate,
    tag = "users",
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already in use"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    request.validate()?;

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = Users::new(&mut conn)
        .create(&UserCreateDBRequest {
            name: request.name,
            email: request.email,
            password_hash,
            phone: request.phone,
            address: request.address,
            guardian_name: request.guardian_name,
            guardian_phone: request.guardian_phone,
            date_of_birth: request.date_of_birth,
            joining_date: request.joining_date,
            role: request.role,
            is_active: true,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let user = Users::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "user".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(UserResponse::from(user)))
}

/// Update a user
///
/// Users may update their own profile. Changing `role` or `isActive`, or
/// updating someone else's account, requires an admin role.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    request_body = UserUpdate,
    tag = "users",
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Not allowed to update this user"),
        (status = 404, description = "User not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    request.validate()?;

    let is_admin = current_user.role.is_admin();
    if !is_admin && current_user.id != id {
        return Err(Error::Forbidden {
            message: "You may only update your own account".to_string(),
        });
    }
    if !is_admin && (request.role.is_some() || request.is_active.is_some()) {
        return Err(Error::Forbidden {
            message: "Only admins may change role or active state".to_string(),
        });
    }

    let password_hash = match request.password {
        Some(password) => Some(
            tokio::task::spawn_blocking(move || password::hash_string(&password))
                .await
                .map_err(|e| Error::Internal {
                    operation: format!("spawn password hashing task: {e}"),
                })??,
        ),
        None => None,
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = Users::new(&mut conn)
        .update(
            id,
            &UserUpdateDBRequest {
                name: request.name,
                phone: request.phone,
                address: request.address,
                guardian_name: request.guardian_name,
                guardian_phone: request.guardian_phone,
                date_of_birth: request.date_of_birth,
                joining_date: request.joining_date,
                password_hash,
                role: request.role,
                is_active: request.is_active,
            },
        )
        .await?;

    // Deactivation kicks out any live sessions
    if request.is_active == Some(false) {
        state.sessions.revoke_for_user(id);
    }

    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<UserId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Users::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "user".to_string(),
            id: id.to_string(),
        });
    }

    state.sessions.revoke_for_user(id);
    Ok(StatusCode::NO_CONTENT)
}

/// List students
#[utoipa::path(
    get,
    path = "/students",
    tag = "users",
    responses(
        (status = 200, description = "List of students", body = Vec<UserResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_students(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<UserResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let students = Users::new(&mut conn)
        .list(&UserFilter {
            role: Some(Role::Student),
            is_active: None,
        })
        .await?;

    Ok(Json(students.into_iter().map(UserResponse::from).collect()))
}

/// List employees
#[utoipa::path(
    get,
    path = "/employees",
    tag = "users",
    responses(
        (status = 200, description = "List of employees", body = Vec<UserResponse>),
        (status = 403, description = "Admin access required"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_employees(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<UserResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let employees = Users::new(&mut conn)
        .list(&UserFilter {
            role: Some(Role::Employee),
            is_active: None,
        })
        .await?;

    Ok(Json(employees.into_iter().map(UserResponse::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, login_as};
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_student_cannot_list_users(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let student = crate::test_utils::create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &student);

        let response = server
            .get("/api/users")
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_admin_creates_and_lists_users(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = crate::test_utils::create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let cookie = login_as(&state, &admin);

        let response = server
            .post("/api/users")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({
                "name": "Asha Rahman",
                "email": "asha@example.com",
                "password": "secret123",
                "role": "STUDENT"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let created: UserResponse = response.json();
        assert_eq!(created.role, Role::Student);
        assert!(created.is_active);

        let list_response = server
            .get("/api/users?role=STUDENT")
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        list_response.assert_status_ok();
        let users: Vec<UserResponse> = list_response.json();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "asha@example.com");
    }

    #[sqlx::test]
    async fn test_duplicate_email_conflicts(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = crate::test_utils::create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let cookie = login_as(&state, &admin);

        let body = serde_json::json!({
            "name": "Asha Rahman",
            "email": "asha@example.com",
            "password": "secret123"
        });
        server
            .post("/api/users")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&body)
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .post("/api/users")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&body)
            .await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[sqlx::test]
    async fn test_user_updates_own_profile_but_not_role(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let student = crate::test_utils::create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &student);

        let response = server
            .patch(&format!("/api/users/{}", student.id))
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({"phone": "01712345678"}))
            .await;
        response.assert_status_ok();
        let updated: UserResponse = response.json();
        assert_eq!(updated.phone.as_deref(), Some("01712345678"));

        let escalation = server
            .patch(&format!("/api/users/{}", student.id))
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&serde_json::json!({"role": "ADMIN"}))
            .await;
        escalation.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_user_cannot_update_other_user(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let student = crate::test_utils::create_test_user(&pool, "resident@example.com", Role::Student).await;
        let other = crate::test_utils::create_test_user(&pool, "other@example.com", Role::Student).await;
        let cookie = login_as(&state, &student);

        let response = server
            .patch(&format!("/api/users/{}", other.id))
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&serde_json::json!({"phone": "01712345678"}))
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_deactivation_revokes_sessions(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = crate::test_utils::create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let student = crate::test_utils::create_test_user(&pool, "resident@example.com", Role::Student).await;
        let admin_cookie = login_as(&state, &admin);
        let student_cookie = login_as(&state, &student);

        server
            .patch(&format!("/api/users/{}", student.id))
            .add_header(axum::http::header::COOKIE, admin_cookie)
            .json(&serde_json::json!({"isActive": false}))
            .await
            .assert_status_ok();

        let response = server
            .get("/api/auth/me")
            .add_header(axum::http::header::COOKIE, student_cookie)
            .await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_delete_user(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = crate::test_utils::create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let student = crate::test_utils::create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &admin);

        server
            .delete(&format!("/api/users/{}", student.id))
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .await
            .assert_status(axum::http::StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/users/{}", student.id))
            .add_header(axum::http::header::COOKIE, cookie)
            .await
            .assert_status(axum::http::StatusCode::NOT_FOUND);
    }
}
