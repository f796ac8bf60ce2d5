use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    api::models::{
        stats::{DashboardStats, MealCostQuery, MealCostResponse},
        users::CurrentUser,
    },
    db::{errors::DbError, handlers::Stats},
    errors::{Error, FieldIssue},
};

/// Dashboard summary
#[utoipa::path(
    get,
    path = "/stats/dashboard",
    tag = "stats",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardStats),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<DashboardStats>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let stats = Stats::new(&mut conn).dashboard().await?;

    Ok(Json(stats))
}

/// Monthly meal cost for a student
#[utoipa::path(
    get,
    path = "/stats/meal-costs",
    tag = "stats",
    params(MealCostQuery),
    responses(
        (status = 200, description = "Priced meal summary", body = MealCostResponse),
        (status = 400, description = "Invalid month"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn meal_costs(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<MealCostQuery>,
) -> Result<Json<MealCostResponse>, Error> {
    if !(1..=12).contains(&query.month) {
        return Err(Error::Validation {
            issues: vec![FieldIssue::new("month", "must be between 1 and 12")],
        });
    }

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let cost = Stats::new(&mut conn)
        .meal_cost(query.student_id, query.month, query.year)
        .await?;

    Ok(Json(cost))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{
        create_test_app, create_test_block, create_test_room, create_test_user, login_as,
    };
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_dashboard_counts(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        create_test_user(&pool, "cook@example.com", Role::Employee).await;
        let block = create_test_block(&pool, "A").await;
        let room = create_test_room(&pool, block.id, "101").await;
        let cookie = login_as(&state, &admin);

        server
            .post("/api/seat-allocations")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({
                "studentId": student.id,
                "roomId": room.id,
                "bedNumber": 1,
                "allocatedDate": "2024-06-01"
            }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = server
            .get("/api/stats/dashboard")
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        response.assert_status_ok();
        let stats: DashboardStats = response.json();
        assert_eq!(stats.total_students, 1);
        assert_eq!(stats.total_employees, 1);
        assert_eq!(stats.total_blocks, 1);
        assert_eq!(stats.total_rooms, 1);
        assert_eq!(stats.total_capacity, 4);
        assert_eq!(stats.occupied_seats, 1);
        assert_eq!(stats.available_seats, 3);
        assert_eq!(stats.occupancy_rate, 25);
    }

    #[sqlx::test]
    async fn test_meal_costs_price_recorded_meals(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &admin);

        for (meal_type, rate) in [("BREAKFAST", "20.00"), ("LUNCH", "45.00")] {
            server
                .post("/api/meal-rates")
                .add_header(axum::http::header::COOKIE, cookie.clone())
                .json(&serde_json::json!({
                    "mealType": meal_type,
                    "rate": rate,
                    "effectiveFrom": "2024-06-01"
                }))
                .await
                .assert_status(axum::http::StatusCode::CREATED);
        }

        server
            .post("/api/meal-records/bulk")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({
                "date": "2024-06-10",
                "meals": [{"studentId": student.id, "breakfast": true, "lunch": true}]
            }))
            .await
            .assert_status_ok();
        server
            .post("/api/meal-records/bulk")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({
                "date": "2024-06-11",
                "meals": [{"studentId": student.id, "breakfast": true}]
            }))
            .await
            .assert_status_ok();

        let response = server
            .get(&format!(
                "/api/stats/meal-costs?studentId={}&month=6&year=2024",
                student.id
            ))
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        response.assert_status_ok();
        let cost: MealCostResponse = response.json();
        assert_eq!(cost.days_recorded, 2);
        assert_eq!(cost.total_meals, 3);
        assert_eq!(cost.total_cost.to_string(), "85.00");
    }

    #[sqlx::test]
    async fn test_meal_costs_rejects_bad_month(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let cookie = login_as(&state, &admin);

        let response = server
            .get(&format!(
                "/api/stats/meal-costs?studentId={}&month=13&year=2024",
                uuid::Uuid::new_v4()
            ))
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    }
}
