//! Read-side aggregations for the dashboard and meal costing.

use crate::api::models::meals::MealType;
use crate::api::models::stats::{DashboardStats, MealCostResponse};
use crate::db::errors::{DbError, Result};
use crate::db::handlers::meals::{MealRates, MealRecords};
use crate::types::{UserId, abbrev_uuid};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

#[derive(Debug, FromRow)]
struct DashboardRow {
    total_students: i64,
    total_employees: i64,
    total_blocks: i64,
    total_rooms: i64,
    total_capacity: i64,
    occupied_seats: i64,
    open_complaints: i64,
    active_notices: i64,
}

pub struct Stats<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Stats<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Counts taken from current table state in a single round trip.
    #[instrument(skip(self), err)]
    pub async fn dashboard(&mut self) -> Result<DashboardStats> {
        let row = sqlx::query_as::<_, DashboardRow>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users WHERE role = 'STUDENT' AND is_active) AS total_students,
                (SELECT COUNT(*) FROM users WHERE role = 'EMPLOYEE' AND is_active) AS total_employees,
                (SELECT COUNT(*) FROM blocks) AS total_blocks,
                (SELECT COUNT(*) FROM rooms) AS total_rooms,
                (SELECT COALESCE(SUM(capacity), 0) FROM rooms) AS total_capacity,
                (SELECT COUNT(*) FROM seat_allocations WHERE is_active) AS occupied_seats,
                (SELECT COUNT(*) FROM complaints WHERE status IN ('OPEN', 'IN_PROGRESS')) AS open_complaints,
                (SELECT COUNT(*) FROM notices WHERE is_active) AS active_notices
            "#,
        )
        .fetch_one(&mut *self.db)
        .await?;

        let available_seats = (row.total_capacity - row.occupied_seats).max(0);
        // Round to the nearest percent rather than truncating.
        let occupancy_rate = if row.total_capacity > 0 {
            (row.occupied_seats * 100 + row.total_capacity / 2) / row.total_capacity
        } else {
            0
        };

        Ok(DashboardStats {
            total_students: row.total_students,
            total_employees: row.total_employees,
            total_blocks: row.total_blocks,
            total_rooms: row.total_rooms,
            total_capacity: row.total_capacity,
            occupied_seats: row.occupied_seats,
            available_seats,
            occupancy_rate,
            open_complaints: row.open_complaints,
            active_notices: row.active_notices,
        })
    }

    /// Prices a student's recorded meals for one calendar month against the
    /// active rates. Meal types with no active rate price at zero.
    #[instrument(skip(self), fields(student_id = %abbrev_uuid(&student_id)), err)]
    pub async fn meal_cost(
        &mut self,
        student_id: UserId,
        month: u32,
        year: i32,
    ) -> Result<MealCostResponse> {
        let from = NaiveDate::from_ymd_opt(year, month, 1).ok_or(DbError::NotFound)?;
        let to = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or(DbError::NotFound)?;

        let records = MealRecords::new(&mut *self.db)
            .list_for_month(student_id, from, to)
            .await?;

        let mut rates = MealRates::new(&mut *self.db);
        let breakfast_rate = rate_or_zero(rates.current_rate(MealType::Breakfast).await?);
        let lunch_rate = rate_or_zero(rates.current_rate(MealType::Lunch).await?);
        let dinner_rate = rate_or_zero(rates.current_rate(MealType::Dinner).await?);

        let mut total_meals = 0i64;
        let mut total_cost = Decimal::ZERO;
        for record in &records {
            if record.breakfast {
                total_meals += 1;
                total_cost += breakfast_rate;
            }
            if record.lunch {
                total_meals += 1;
                total_cost += lunch_rate;
            }
            if record.dinner {
                total_meals += 1;
                total_cost += dinner_rate;
            }
        }

        Ok(MealCostResponse {
            student_id,
            month,
            year,
            days_recorded: records.len() as i64,
            total_meals,
            total_cost,
        })
    }
}

fn rate_or_zero(rate: Option<crate::db::models::meals::MealRateDBResponse>) -> Decimal {
    rate.map(|r| r.rate).unwrap_or(Decimal::ZERO)
}
