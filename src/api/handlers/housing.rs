use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        housing::{BlockCreate, BlockResponse, BlockUpdate, ListRoomsQuery, RoomCreate, RoomResponse, RoomUpdate},
        users::CurrentUser,
    },
    auth::RequireAdmin,
    db::{
        errors::DbError,
        handlers::{Blocks, Repository, Rooms, housing::RoomFilter},
        models::housing::{BlockCreateDBRequest, BlockUpdateDBRequest, RoomCreateDBRequest, RoomUpdateDBRequest},
    },
    errors::Error,
    types::{BlockId, RoomId},
};

/// List blocks
#[utoipa::path(
    get,
    path = "/blocks",
    tag = "housing",
    responses(
        (status = 200, description = "List of blocks", body = Vec<BlockResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_blocks(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<BlockResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let blocks = Blocks::new(&mut conn).list(&()).await?;

    Ok(Json(blocks.into_iter().map(BlockResponse::from).collect()))
}

/// Get a block by id
#[utoipa::path(
    get,
    path = "/blocks/{id}",
    tag = "housing",
    responses(
        (status = 200, description = "Block found", body = BlockResponse),
        (status = 404, description = "Block not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_block(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<BlockId>,
) -> Result<Json<BlockResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let block = Blocks::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "block".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(BlockResponse::from(block)))
}

/// Create a block
#[utoipa::path(
    post,
    path = "/blocks",
    request_body = BlockCreate,
    tag = "housing",
    responses(
        (status = 201, description = "Block created", body = BlockResponse),
        (status = 409, description = "Block name already in use"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_block(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<BlockCreate>,
) -> Result<(StatusCode, Json<BlockResponse>), Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = Blocks::new(&mut conn)
        .create(&BlockCreateDBRequest {
            name: request.name,
            description: request.description,
            floor_count: request.floor_count,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(BlockResponse::from(created))))
}

/// Update a block
#[utoipa::path(
    patch,
    path = "/blocks/{id}",
    request_body = BlockUpdate,
    tag = "housing",
    responses(
        (status = 200, description = "Block updated", body = BlockResponse),
        (status = 404, description = "Block not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_block(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<BlockId>,
    Json(request): Json<BlockUpdate>,
) -> Result<Json<BlockResponse>, Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = Blocks::new(&mut conn)
        .update(
            id,
            &BlockUpdateDBRequest {
                name: request.name,
                description: request.description,
                floor_count: request.floor_count,
            },
        )
        .await?;

    Ok(Json(BlockResponse::from(updated)))
}

/// Delete a block
#[utoipa::path(
    delete,
    path = "/blocks/{id}",
    tag = "housing",
    responses(
        (status = 204, description = "Block deleted"),
        (status = 404, description = "Block not found"),
        (status = 409, description = "Block still has rooms"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_block(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<BlockId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Blocks::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "block".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List rooms
#[utoipa::path(
    get,
    path = "/rooms",
    tag = "housing",
    params(ListRoomsQuery),
    responses(
        (status = 200, description = "List of rooms", body = Vec<RoomResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_rooms(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListRoomsQuery>,
) -> Result<Json<Vec<RoomResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let rooms = Rooms::new(&mut conn)
        .list(&RoomFilter {
            block_id: query.block_id,
        })
        .await?;

    Ok(Json(rooms.into_iter().map(RoomResponse::from).collect()))
}

/// Get a room by id
#[utoipa::path(
    get,
    path = "/rooms/{id}",
    tag = "housing",
    responses(
        (status = 200, description = "Room found", body = RoomResponse),
        (status = 404, description = "Room not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_room(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<RoomId>,
) -> Result<Json<RoomResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let room = Rooms::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "room".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(RoomResponse::from(room)))
}

/// Create a room
#[utoipa::path(
    post,
    path = "/rooms",
    request_body = RoomCreate,
    tag = "housing",
    responses(
        (status = 201, description = "Room created", body = RoomResponse),
        (status = 400, description = "Referenced block does not exist"),
        (status = 409, description = "Room number already in use in this block"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_room(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<RoomCreate>,
) -> Result<(StatusCode, Json<RoomResponse>), Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = Rooms::new(&mut conn)
        .create(&RoomCreateDBRequest {
            block_id: request.block_id,
            room_number: request.room_number,
            capacity: request.capacity,
            room_type: request.room_type,
            floor: request.floor,
            monthly_rent: request.monthly_rent,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RoomResponse::from(created))))
}

/// Update a room
#[utoipa::path(
    patch,
    path = "/rooms/{id}",
    request_body = RoomUpdate,
    tag = "housing",
    responses(
        (status = 200, description = "Room updated", body = RoomResponse),
        (status = 404, description = "Room not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_room(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<RoomId>,
    Json(request): Json<RoomUpdate>,
) -> Result<Json<RoomResponse>, Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = Rooms::new(&mut conn)
        .update(
            id,
            &RoomUpdateDBRequest {
                room_number: request.room_number,
                capacity: request.capacity,
                room_type: request.room_type,
                floor: request.floor,
                monthly_rent: request.monthly_rent,
            },
        )
        .await?;

    Ok(Json(RoomResponse::from(updated)))
}

/// Delete a room
#[utoipa::path(
    delete,
    path = "/rooms/{id}",
    tag = "housing",
    responses(
        (status = 204, description = "Room deleted"),
        (status = 404, description = "Room not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_room(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<RoomId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Rooms::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "room".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
