use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        system_config::{ConfigCreate, ConfigResponse, ConfigUpdate},
        users::CurrentUser,
    },
    auth::RequireAdmin,
    db::{
        errors::DbError,
        handlers::SystemConfig,
        models::system_config::{ConfigCreateDBRequest, ConfigUpdateDBRequest},
    },
    errors::Error,
};

/// List configuration entries
#[utoipa::path(
    get,
    path = "/system-config",
    tag = "system-config",
    responses(
        (status = 200, description = "All configuration entries", body = Vec<ConfigResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_config(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<ConfigResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let entries = SystemConfig::new(&mut conn).list().await?;

    Ok(Json(entries.into_iter().map(ConfigResponse::from).collect()))
}

/// Get a configuration entry by key
#[utoipa::path(
    get,
    path = "/system-config/{key}",
    tag = "system-config",
    responses(
        (status = 200, description = "Configuration entry", body = ConfigResponse),
        (status = 404, description = "Key not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_config(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(key): Path<String>,
) -> Result<Json<ConfigResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let entry = SystemConfig::new(&mut conn)
        .get_by_key(&key)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "config".to_string(),
            id: key,
        })?;

    Ok(Json(ConfigResponse::from(entry)))
}

/// Create a configuration entry
#[utoipa::path(
    post,
    path = "/system-config",
    request_body = ConfigCreate,
    tag = "system-config",
    responses(
        (status = 201, description = "Entry created", body = ConfigResponse),
        (status = 409, description = "Key already exists"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_config(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<ConfigCreate>,
) -> Result<(StatusCode, Json<ConfigResponse>), Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = SystemConfig::new(&mut conn)
        .create(&ConfigCreateDBRequest {
            key: request.key,
            value: request.value,
            description: request.description,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ConfigResponse::from(created))))
}

/// Update a configuration entry by key
#[utoipa::path(
    patch,
    path = "/system-config/{key}",
    request_body = ConfigUpdate,
    tag = "system-config",
    responses(
        (status = 200, description = "Entry updated", body = ConfigResponse),
        (status = 404, description = "Key not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_config(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(key): Path<String>,
    Json(request): Json<ConfigUpdate>,
) -> Result<Json<ConfigResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = SystemConfig::new(&mut conn)
        .update_by_key(
            &key,
            &ConfigUpdateDBRequest {
                value: request.value,
                description: request.description,
            },
        )
        .await?;

    Ok(Json(ConfigResponse::from(updated)))
}

/// Delete a configuration entry by key
#[utoipa::path(
    delete,
    path = "/system-config/{key}",
    tag = "system-config",
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Key not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_config(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(key): Path<String>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = SystemConfig::new(&mut conn).delete_by_key(&key).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "config".to_string(),
            id: key,
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
