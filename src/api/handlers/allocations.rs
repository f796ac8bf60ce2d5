use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        allocations::{AllocationCreate, AllocationResponse, AllocationUpdate},
        users::CurrentUser,
    },
    auth::RequireAdmin,
    db::{
        errors::DbError,
        handlers::{Repository, SeatAllocations, allocations::AllocationFilter},
        models::allocations::{AllocationCreateDBRequest, AllocationUpdateDBRequest},
    },
    errors::Error,
    types::{AllocationId, UserId},
};

/// List seat allocations
#[utoipa::path(
    get,
    path = "/seat-allocations",
    tag = "allocations",
    responses(
        (status = 200, description = "List of allocations", body = Vec<AllocationResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_allocations(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<AllocationResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let allocations = SeatAllocations::new(&mut conn).list(&AllocationFilter::default()).await?;

    Ok(Json(allocations.into_iter().map(AllocationResponse::from).collect()))
}

/// List a student's seat allocations
#[utoipa::path(
    get,
    path = "/seat-allocations/student/{student_id}",
    tag = "allocations",
    responses(
        (status = 200, description = "Allocations for the student", body = Vec<AllocationResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_allocations_for_student(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(student_id): Path<UserId>,
) -> Result<Json<Vec<AllocationResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let allocations = SeatAllocations::new(&mut conn)
        .list(&AllocationFilter {
            student_id: Some(student_id),
        })
        .await?;

    Ok(Json(allocations.into_iter().map(AllocationResponse::from).collect()))
}

/// Allocate a seat to a student
///
/// A student can hold at most one active allocation. Creating a second one
/// fails with 409 until the current allocation is deactivated.
#[utoipa::path(
    post,
    path = "/seat-allocations",
    request_body = AllocationCreate,
    tag = "allocations",
    responses(
        (status = 201, description = "Seat allocated", body = AllocationResponse),
        (status = 400, description = "Referenced student or room does not exist"),
        (status = 409, description = "Student already has an active allocation"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_allocation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<AllocationCreate>,
) -> Result<(StatusCode, Json<AllocationResponse>), Error> {
    request.validate()?;

    // Check-then-insert inside one transaction. The partial unique index
    // still catches a concurrent creator that slips past the check.
    let mut tx = state.db.begin().await.map_err(DbError::from)?;
    let mut repo = SeatAllocations::new(&mut tx);

    if repo.get_active_for_student(request.student_id).await?.is_some() {
        return Err(Error::Conflict {
            message: "Student already has an active seat allocation".to_string(),
        });
    }

    let created = repo
        .create(&AllocationCreateDBRequest {
            student_id: request.student_id,
            room_id: request.room_id,
            bed_number: request.bed_number,
            allocated_date: request.allocated_date,
        })
        .await?;

    tx.commit().await.map_err(DbError::from)?;

    Ok((StatusCode::CREATED, Json(AllocationResponse::from(created))))
}

/// Update a seat allocation
#[utoipa::path(
    patch,
    path = "/seat-allocations/{id}",
    request_body = AllocationUpdate,
    tag = "allocations",
    responses(
        (status = 200, description = "Allocation updated", body = AllocationResponse),
        (status = 404, description = "Allocation not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_allocation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<AllocationId>,
    Json(request): Json<AllocationUpdate>,
) -> Result<Json<AllocationResponse>, Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = SeatAllocations::new(&mut conn)
        .update(
            id,
            &AllocationUpdateDBRequest {
                room_id: request.room_id,
                bed_number: request.bed_number,
                allocated_date: request.allocated_date,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(Json(AllocationResponse::from(updated)))
}

/// Delete a seat allocation
#[utoipa::path(
    delete,
    path = "/seat-allocations/{id}",
    tag = "allocations",
    responses(
        (status = 204, description = "Allocation deleted"),
        (status = 404, description = "Allocation not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_allocation(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<AllocationId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = SeatAllocations::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "allocation".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
