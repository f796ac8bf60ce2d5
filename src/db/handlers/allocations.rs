//! Database repository for seat allocations.
//!
//! The invariant this repository guards: a student has at most one active
//! allocation. `create` checks inside the caller's transaction, and the
//! partial unique index on (student_id) WHERE is_active catches concurrent
//! creators that race past the check.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::allocations::{AllocationCreateDBRequest, AllocationDBResponse, AllocationUpdateDBRequest},
};
use crate::types::{AllocationId, UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing seat allocations
#[derive(Debug, Clone, Default)]
pub struct AllocationFilter {
    pub student_id: Option<UserId>,
}

pub struct SeatAllocations<'c> {
    db: &'c mut PgConnection,
}

impl<'c> SeatAllocations<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// The student's currently active allocation, if any.
    #[instrument(skip(self), fields(student_id = %abbrev_uuid(&student_id)), err)]
    pub async fn get_active_for_student(&mut self, student_id: UserId) -> Result<Option<AllocationDBResponse>> {
        let allocation = sqlx::query_as::<_, AllocationDBResponse>(
            "SELECT * FROM seat_allocations WHERE student_id = $1 AND is_active",
        )
        .bind(student_id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(allocation)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for SeatAllocations<'c> {
    type CreateRequest = AllocationCreateDBRequest;
    type UpdateRequest = AllocationUpdateDBRequest;
    type Response = AllocationDBResponse;
    type Id = AllocationId;
    type Filter = AllocationFilter;

    #[instrument(skip(self, request), fields(student_id = %abbrev_uuid(&request.student_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let allocation = sqlx::query_as::<_, AllocationDBResponse>(
            r#"
            INSERT INTO seat_allocations (student_id, room_id, bed_number, allocated_date, is_active)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING *
            "#,
        )
        .bind(request.student_id)
        .bind(request.room_id)
        .bind(request.bed_number)
        .bind(request.allocated_date)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(allocation)
    }

    #[instrument(skip(self), fields(allocation_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let allocation = sqlx::query_as::<_, AllocationDBResponse>("SELECT * FROM seat_allocations WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(allocation)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let allocations = sqlx::query_as::<_, AllocationDBResponse>(
            "SELECT * FROM seat_allocations WHERE ($1::uuid IS NULL OR student_id = $1) ORDER BY created_at DESC",
        )
        .bind(filter.student_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(allocations)
    }

    #[instrument(skip(self), fields(allocation_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM seat_allocations WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(allocation_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let allocation = sqlx::query_as::<_, AllocationDBResponse>(
            r#"
            UPDATE seat_allocations SET
                room_id = COALESCE($2, room_id),
                bed_number = COALESCE($3, bed_number),
                allocated_date = COALESCE($4, allocated_date),
                is_active = COALESCE($5, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.room_id)
        .bind(request.bed_number)
        .bind(request.allocated_date)
        .bind(request.is_active)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(allocation)
    }
}
