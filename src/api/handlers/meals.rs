use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        meals::{
            BulkMealEntry, BulkMealRequest, ListMealRecordsQuery, MealRateCreate,
            MealRateResponse, MealRateUpdate, MealRecordCreate, MealRecordResponse,
            MealRecordUpdate,
        },
        users::CurrentUser,
    },
    auth::RequireAdmin,
    db::{
        errors::DbError,
        handlers::{MealRates, MealRecords, Repository, meals::MealRecordFilter},
        models::meals::{
            MealRateCreateDBRequest, MealRateUpdateDBRequest, MealRecordCreateDBRequest,
            MealRecordUpdateDBRequest,
        },
    },
    errors::Error,
    types::{MealRateId, MealRecordId},
};

/// List active meal rates
#[utoipa::path(
    get,
    path = "/meal-rates",
    tag = "meals",
    responses(
        (status = 200, description = "Active meal rates", body = Vec<MealRateResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_meal_rates(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<MealRateResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let rates = MealRates::new(&mut conn).list_active().await?;

    Ok(Json(rates.into_iter().map(MealRateResponse::from).collect()))
}

/// Get a meal rate by id
#[utoipa::path(
    get,
    path = "/meal-rates/{id}",
    tag = "meals",
    responses(
        (status = 200, description = "Meal rate found", body = MealRateResponse),
        (status = 404, description = "Meal rate not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_meal_rate(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<MealRateId>,
) -> Result<Json<MealRateResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let rate = MealRates::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "meal rate".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(MealRateResponse::from(rate)))
}

/// Create a meal rate
#[utoipa::path(
    post,
    path = "/meal-rates",
    request_body = MealRateCreate,
    tag = "meals",
    responses(
        (status = 201, description = "Meal rate created", body = MealRateResponse),
        (status = 400, description = "Invalid input"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_meal_rate(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<MealRateCreate>,
) -> Result<(StatusCode, Json<MealRateResponse>), Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = MealRates::new(&mut conn)
        .create(&MealRateCreateDBRequest {
            meal_type: request.meal_type,
            rate: request.rate,
            effective_from: request.effective_from,
            is_active: request.is_active,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MealRateResponse::from(created))))
}

/// Update a meal rate
#[utoipa::path(
    patch,
    path = "/meal-rates/{id}",
    request_body = MealRateUpdate,
    tag = "meals",
    responses(
        (status = 200, description = "Meal rate updated", body = MealRateResponse),
        (status = 404, description = "Meal rate not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_meal_rate(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<MealRateId>,
    Json(request): Json<MealRateUpdate>,
) -> Result<Json<MealRateResponse>, Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = MealRates::new(&mut conn)
        .update(
            id,
            &MealRateUpdateDBRequest {
                rate: request.rate,
                effective_from: request.effective_from,
                is_active: request.is_active,
            },
        )
        .await?;

    Ok(Json(MealRateResponse::from(updated)))
}

/// Delete a meal rate
#[utoipa::path(
    delete,
    path = "/meal-rates/{id}",
    tag = "meals",
    responses(
        (status = 204, description = "Meal rate deleted"),
        (status = 404, description = "Meal rate not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_meal_rate(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<MealRateId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = MealRates::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "meal rate".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List meal records
#[utoipa::path(
    get,
    path = "/meal-records",
    tag = "meals",
    params(ListMealRecordsQuery),
    responses(
        (status = 200, description = "List of meal records", body = Vec<MealRecordResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_meal_records(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListMealRecordsQuery>,
) -> Result<Json<Vec<MealRecordResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let records = MealRecords::new(&mut conn)
        .list(&MealRecordFilter {
            student_id: query.student_id,
            date: None,
        })
        .await?;

    Ok(Json(records.into_iter().map(MealRecordResponse::from).collect()))
}

/// Get a meal record by id
#[utoipa::path(
    get,
    path = "/meal-records/{id}",
    tag = "meals",
    responses(
        (status = 200, description = "Meal record found", body = MealRecordResponse),
        (status = 404, description = "Meal record not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_meal_record(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<MealRecordId>,
) -> Result<Json<MealRecordResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let record = MealRecords::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "meal record".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(MealRecordResponse::from(record)))
}

/// Record a day's meals for a student
#[utoipa::path(
    post,
    path = "/meal-records",
    request_body = MealRecordCreate,
    tag = "meals",
    responses(
        (status = 201, description = "Meal record created", body = MealRecordResponse),
        (status = 409, description = "Day already recorded for this student"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_meal_record(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(request): Json<MealRecordCreate>,
) -> Result<(StatusCode, Json<MealRecordResponse>), Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = MealRecords::new(&mut conn)
        .create(&MealRecordCreateDBRequest {
            student_id: request.student_id,
            date: request.date,
            breakfast: request.breakfast,
            lunch: request.lunch,
            dinner: request.dinner,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(MealRecordResponse::from(created))))
}

/// Update a meal record
#[utoipa::path(
    patch,
    path = "/meal-records/{id}",
    request_body = MealRecordUpdate,
    tag = "meals",
    responses(
        (status = 200, description = "Meal record updated", body = MealRecordResponse),
        (status = 404, description = "Meal record not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_meal_record(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<MealRecordId>,
    Json(request): Json<MealRecordUpdate>,
) -> Result<Json<MealRecordResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = MealRecords::new(&mut conn)
        .update(
            id,
            &MealRecordUpdateDBRequest {
                breakfast: request.breakfast,
                lunch: request.lunch,
                dinner: request.dinner,
            },
        )
        .await?;

    Ok(Json(MealRecordResponse::from(updated)))
}

/// Delete a meal record
#[utoipa::path(
    delete,
    path = "/meal-records/{id}",
    tag = "meals",
    responses(
        (status = 204, description = "Meal record deleted"),
        (status = 404, description = "Meal record not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_meal_record(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<MealRecordId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = MealRecords::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "meal record".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Record meals for many students on one date
///
/// Entries that fail to parse are skipped; every valid entry is written in a
/// single transaction, merging into any rows already stored for that date.
/// The response lists the written records in input order.
#[utoipa::path(
    post,
    path = "/meal-records/bulk",
    request_body = BulkMealRequest,
    tag = "meals",
    responses(
        (status = 200, description = "Records written", body = Vec<MealRecordResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn bulk_meal_records(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(request): Json<BulkMealRequest>,
) -> Result<Json<Vec<MealRecordResponse>>, Error> {
    let mut tx = state.db.begin().await.map_err(DbError::from)?;

    let mut written = Vec::new();
    for raw in request.meals {
        let Ok(entry) = serde_json::from_value::<BulkMealEntry>(raw) else {
            continue;
        };
        let record = MealRecords::new(&mut tx)
            .upsert_day(
                entry.student_id,
                request.date,
                &MealRecordUpdateDBRequest {
                    breakfast: entry.breakfast,
                    lunch: entry.lunch,
                    dinner: entry.dinner,
                },
            )
            .await?;
        written.push(MealRecordResponse::from(record));
    }

    tx.commit().await.map_err(DbError::from)?;

    Ok(Json(written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{meals::MealType, users::Role};
    use crate::test_utils::{create_test_app, create_test_user, login_as};
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_bulk_skips_malformed_entries(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let first = create_test_user(&pool, "first@example.com", Role::Student).await;
        let second = create_test_user(&pool, "second@example.com", Role::Student).await;
        let cookie = login_as(&state, &admin);

        let response = server
            .post("/api/meal-records/bulk")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&serde_json::json!({
                "date": "2024-06-10",
                "meals": [
                    {"studentId": first.id, "breakfast": true, "lunch": true},
                    {"studentId": "not-a-uuid", "breakfast": true},
                    {"studentId": second.id, "dinner": true},
                ]
            }))
            .await;
        response.assert_status_ok();
        let written: Vec<MealRecordResponse> = response.json();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].student_id, first.id);
        assert!(written[0].breakfast && written[0].lunch && !written[0].dinner);
        assert_eq!(written[1].student_id, second.id);
        assert!(written[1].dinner);
    }

    #[sqlx::test]
    async fn test_get_meal_record_by_id(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &student);

        let created: MealRecordResponse = server
            .post("/api/meal-records")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({
                "studentId": student.id,
                "date": "2024-06-10",
                "breakfast": true,
                "dinner": true
            }))
            .await
            .json();

        let response = server
            .get(&format!("/api/meal-records/{}", created.id))
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .await;
        response.assert_status_ok();
        let found: MealRecordResponse = response.json();
        assert_eq!(found.id, created.id);
        assert!(found.breakfast && !found.lunch && found.dinner);

        let missing = server
            .get(&format!("/api/meal-records/{}", uuid::Uuid::new_v4()))
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        missing.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn test_bulk_merges_into_existing_day(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &admin);

        let created_response = server
            .post("/api/meal-records")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({
                "studentId": student.id,
                "date": "2024-06-10",
                "breakfast": true
            }))
            .await;
        created_response.assert_status(axum::http::StatusCode::CREATED);
        let created: MealRecordResponse = created_response.json();

        let bulk_response = server
            .post("/api/meal-records/bulk")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&serde_json::json!({
                "date": "2024-06-10",
                "meals": [{"studentId": student.id, "dinner": true}]
            }))
            .await;
        bulk_response.assert_status_ok();
        let written: Vec<MealRecordResponse> = bulk_response.json();
        assert_eq!(written.len(), 1);
        // Same row, merged flags
        assert_eq!(written[0].id, created.id);
        assert!(written[0].breakfast && written[0].dinner);
    }

    #[sqlx::test]
    async fn test_duplicate_meal_record_conflicts(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &admin);

        let body = serde_json::json!({
            "studentId": student.id,
            "date": "2024-06-10",
            "lunch": true
        });
        server
            .post("/api/meal-records")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&body)
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        server
            .post("/api/meal-records")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&body)
            .await
            .assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[sqlx::test]
    async fn test_student_cannot_create_meal_rate(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &student);

        let response = server
            .post("/api/meal-rates")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&serde_json::json!({
                "mealType": "LUNCH",
                "rate": "45.00",
                "effectiveFrom": "2024-06-01"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_meal_rates_list_active_only(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let cookie = login_as(&state, &admin);

        let created_response = server
            .post("/api/meal-rates")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({
                "mealType": "DINNER",
                "rate": "50.00",
                "effectiveFrom": "2024-06-01"
            }))
            .await;
        created_response.assert_status(axum::http::StatusCode::CREATED);
        let created: MealRateResponse = created_response.json();
        assert_eq!(created.meal_type, MealType::Dinner);

        server
            .patch(&format!("/api/meal-rates/{}", created.id))
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({"isActive": false}))
            .await
            .assert_status_ok();

        let list_response = server
            .get("/api/meal-rates")
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        let rates: Vec<MealRateResponse> = list_response.json();
        assert!(rates.is_empty());
    }
}
