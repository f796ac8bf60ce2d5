//! Database repositories for meal rates and daily meal records.
//!
//! Meal records are unique per (student, date). The bulk endpoint writes
//! through [`MealRecords::upsert_day`], which merges into an existing row
//! for that day instead of failing on the unique constraint.

use crate::api::models::meals::MealType;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::meals::{
        MealRateCreateDBRequest, MealRateDBResponse, MealRateUpdateDBRequest,
        MealRecordCreateDBRequest, MealRecordDBResponse, MealRecordUpdateDBRequest,
    },
};
use crate::types::{MealRateId, MealRecordId, UserId, abbrev_uuid};
use chrono::NaiveDate;
use sqlx::PgConnection;
use tracing::instrument;

pub struct MealRates<'c> {
    db: &'c mut PgConnection,
}

impl<'c> MealRates<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Active rates only, most recent effective date per meal type first.
    pub async fn list_active(&mut self) -> Result<Vec<MealRateDBResponse>> {
        let rates = sqlx::query_as::<_, MealRateDBResponse>(
            "SELECT * FROM meal_rates WHERE is_active ORDER BY meal_type, effective_from DESC",
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rates)
    }

    /// The newest active rate for a meal type, if one exists.
    pub async fn current_rate(&mut self, meal_type: MealType) -> Result<Option<MealRateDBResponse>> {
        let rate = sqlx::query_as::<_, MealRateDBResponse>(
            r#"
            SELECT * FROM meal_rates
            WHERE meal_type = $1 AND is_active
            ORDER BY effective_from DESC
            LIMIT 1
            "#,
        )
        .bind(meal_type)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(rate)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for MealRates<'c> {
    type CreateRequest = MealRateCreateDBRequest;
    type UpdateRequest = MealRateUpdateDBRequest;
    type Response = MealRateDBResponse;
    type Id = MealRateId;
    type Filter = ();

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let rate = sqlx::query_as::<_, MealRateDBResponse>(
            r#"
            INSERT INTO meal_rates (meal_type, rate, effective_from, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.meal_type)
        .bind(request.rate)
        .bind(request.effective_from)
        .bind(request.is_active)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(rate)
    }

    #[instrument(skip(self), fields(rate_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let rate = sqlx::query_as::<_, MealRateDBResponse>("SELECT * FROM meal_rates WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(rate)
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rates = sqlx::query_as::<_, MealRateDBResponse>(
            "SELECT * FROM meal_rates ORDER BY meal_type, effective_from DESC",
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rates)
    }

    #[instrument(skip(self), fields(rate_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meal_rates WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(rate_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let rate = sqlx::query_as::<_, MealRateDBResponse>(
            r#"
            UPDATE meal_rates SET
                rate = COALESCE($2, rate),
                effective_from = COALESCE($3, effective_from),
                is_active = COALESCE($4, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.rate)
        .bind(request.effective_from)
        .bind(request.is_active)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(rate)
    }
}

/// Filter for listing meal records
#[derive(Debug, Clone, Default)]
pub struct MealRecordFilter {
    pub student_id: Option<UserId>,
    pub date: Option<NaiveDate>,
}

pub struct MealRecords<'c> {
    db: &'c mut PgConnection,
}

impl<'c> MealRecords<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Writes a student's flags for one day, merging into the existing row
    /// when the day is already recorded. `None` flags keep their stored
    /// value; missing rows are created with unset flags defaulting to false.
    pub async fn upsert_day(
        &mut self,
        student_id: UserId,
        date: NaiveDate,
        flags: &MealRecordUpdateDBRequest,
    ) -> Result<MealRecordDBResponse> {
        let updated = sqlx::query_as::<_, MealRecordDBResponse>(
            r#"
            UPDATE meal_records SET
                breakfast = COALESCE($3, breakfast),
                lunch = COALESCE($4, lunch),
                dinner = COALESCE($5, dinner)
            WHERE student_id = $1 AND date = $2
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(date)
        .bind(flags.breakfast)
        .bind(flags.lunch)
        .bind(flags.dinner)
        .fetch_optional(&mut *self.db)
        .await?;

        if let Some(record) = updated {
            return Ok(record);
        }

        self.create(&MealRecordCreateDBRequest {
            student_id,
            date,
            breakfast: flags.breakfast.unwrap_or(false),
            lunch: flags.lunch.unwrap_or(false),
            dinner: flags.dinner.unwrap_or(false),
        })
        .await
    }

    /// All records for a student within a calendar month.
    pub async fn list_for_month(
        &mut self,
        student_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MealRecordDBResponse>> {
        let records = sqlx::query_as::<_, MealRecordDBResponse>(
            "SELECT * FROM meal_records WHERE student_id = $1 AND date >= $2 AND date < $3 ORDER BY date",
        )
        .bind(student_id)
        .bind(from)
        .bind(to)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(records)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for MealRecords<'c> {
    type CreateRequest = MealRecordCreateDBRequest;
    type UpdateRequest = MealRecordUpdateDBRequest;
    type Response = MealRecordDBResponse;
    type Id = MealRecordId;
    type Filter = MealRecordFilter;

    #[instrument(skip(self, request), fields(student_id = %abbrev_uuid(&request.student_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let record = sqlx::query_as::<_, MealRecordDBResponse>(
            r#"
            INSERT INTO meal_records (student_id, date, breakfast, lunch, dinner)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.student_id)
        .bind(request.date)
        .bind(request.breakfast)
        .bind(request.lunch)
        .bind(request.dinner)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(record)
    }

    #[instrument(skip(self), fields(record_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let record = sqlx::query_as::<_, MealRecordDBResponse>("SELECT * FROM meal_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(record)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let records = sqlx::query_as::<_, MealRecordDBResponse>(
            r#"
            SELECT * FROM meal_records
            WHERE ($1::uuid IS NULL OR student_id = $1)
              AND ($2::date IS NULL OR date = $2)
            ORDER BY date DESC
            "#,
        )
        .bind(filter.student_id)
        .bind(filter.date)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(records)
    }

    #[instrument(skip(self), fields(record_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meal_records WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(record_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let record = sqlx::query_as::<_, MealRecordDBResponse>(
            r#"
            UPDATE meal_records SET
                breakfast = COALESCE($2, breakfast),
                lunch = COALESCE($3, lunch),
                dinner = COALESCE($4, dinner)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.breakfast)
        .bind(request.lunch)
        .bind(request.dinner)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::create_test_user;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_current_rate_prefers_newest_active(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = MealRates::new(&mut conn);

        repo.create(&MealRateCreateDBRequest {
            meal_type: MealType::Lunch,
            rate: Decimal::new(4000, 2),
            effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            is_active: true,
        })
        .await
        .unwrap();
        repo.create(&MealRateCreateDBRequest {
            meal_type: MealType::Lunch,
            rate: Decimal::new(4500, 2),
            effective_from: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            is_active: true,
        })
        .await
        .unwrap();
        repo.create(&MealRateCreateDBRequest {
            meal_type: MealType::Lunch,
            rate: Decimal::new(5000, 2),
            effective_from: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            is_active: false,
        })
        .await
        .unwrap();

        let current = repo.current_rate(MealType::Lunch).await.unwrap().unwrap();
        assert_eq!(current.rate, Decimal::new(4500, 2));
        assert!(repo.current_rate(MealType::Dinner).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_upsert_day_merges_existing_row(pool: PgPool) {
        let student = create_test_user(&pool, "eater@example.com", Role::Student).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = MealRecords::new(&mut conn);
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();

        let first = repo
            .upsert_day(
                student.id,
                date,
                &MealRecordUpdateDBRequest {
                    breakfast: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(first.breakfast);
        assert!(!first.lunch);

        let second = repo
            .upsert_day(
                student.id,
                date,
                &MealRecordUpdateDBRequest {
                    lunch: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert!(second.breakfast);
        assert!(second.lunch);

        let day = repo
            .list(&MealRecordFilter {
                student_id: Some(student.id),
                date: Some(date),
            })
            .await
            .unwrap();
        assert_eq!(day.len(), 1);
    }

    #[sqlx::test]
    async fn test_list_for_month_bounds(pool: PgPool) {
        let student = create_test_user(&pool, "eater@example.com", Role::Student).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = MealRecords::new(&mut conn);

        for day in [
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        ] {
            repo.create(&MealRecordCreateDBRequest {
                student_id: student.id,
                date: day,
                breakfast: true,
                lunch: false,
                dinner: false,
            })
            .await
            .unwrap();
        }

        let june = repo
            .list_for_month(
                student.id,
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(june.len(), 2);
    }
}
