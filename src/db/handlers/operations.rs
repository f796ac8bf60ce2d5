//! Database repositories for notices, complaints, and attendance.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::operations::{
        AttendanceCreateDBRequest, AttendanceDBResponse, AttendanceUpdateDBRequest,
        ComplaintCreateDBRequest, ComplaintDBResponse, ComplaintUpdateDBRequest,
        NoticeCreateDBRequest, NoticeDBResponse, NoticeUpdateDBRequest,
    },
};
use crate::types::{AttendanceId, ComplaintId, NoticeId, UserId, abbrev_uuid};
use chrono::NaiveDate;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Notices<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Notices<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Notices<'c> {
    type CreateRequest = NoticeCreateDBRequest;
    type UpdateRequest = NoticeUpdateDBRequest;
    type Response = NoticeDBResponse;
    type Id = NoticeId;
    type Filter = ();

    #[instrument(skip(self, request), fields(created_by = %abbrev_uuid(&request.created_by)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let notice = sqlx::query_as::<_, NoticeDBResponse>(
            r#"
            INSERT INTO notices (title, content, created_by, expires_at, visibility, priority)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.created_by)
        .bind(request.expires_at)
        .bind(request.visibility)
        .bind(&request.priority)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(notice)
    }

    #[instrument(skip(self), fields(notice_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let notice = sqlx::query_as::<_, NoticeDBResponse>("SELECT * FROM notices WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(notice)
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let notices =
            sqlx::query_as::<_, NoticeDBResponse>("SELECT * FROM notices ORDER BY created_at DESC")
                .fetch_all(&mut *self.db)
                .await?;

        Ok(notices)
    }

    #[instrument(skip(self), fields(notice_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notices WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(notice_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let notice = sqlx::query_as::<_, NoticeDBResponse>(
            r#"
            UPDATE notices SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                expires_at = COALESCE($4, expires_at),
                is_active = COALESCE($5, is_active),
                visibility = COALESCE($6, visibility),
                priority = COALESCE($7, priority)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.content)
        .bind(request.expires_at)
        .bind(request.is_active)
        .bind(request.visibility)
        .bind(&request.priority)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(notice)
    }
}

/// Filter for listing complaints
#[derive(Debug, Clone, Default)]
pub struct ComplaintFilter {
    pub student_id: Option<UserId>,
}

pub struct Complaints<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Complaints<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Complaints<'c> {
    type CreateRequest = ComplaintCreateDBRequest;
    type UpdateRequest = ComplaintUpdateDBRequest;
    type Response = ComplaintDBResponse;
    type Id = ComplaintId;
    type Filter = ComplaintFilter;

    #[instrument(skip(self, request), fields(student_id = %abbrev_uuid(&request.student_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let complaint = sqlx::query_as::<_, ComplaintDBResponse>(
            r#"
            INSERT INTO complaints (student_id, subject, description, priority)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.student_id)
        .bind(&request.subject)
        .bind(&request.description)
        .bind(&request.priority)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(complaint)
    }

    #[instrument(skip(self), fields(complaint_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let complaint = sqlx::query_as::<_, ComplaintDBResponse>("SELECT * FROM complaints WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(complaint)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let complaints = sqlx::query_as::<_, ComplaintDBResponse>(
            "SELECT * FROM complaints WHERE ($1::uuid IS NULL OR student_id = $1) ORDER BY created_at DESC",
        )
        .bind(filter.student_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(complaints)
    }

    #[instrument(skip(self), fields(complaint_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(complaint_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // clear_resolution wins over any resolution values supplied in the
        // same request, so a reopen always leaves the fields NULL. The
        // resolver stamp only lands when the stored fields are unset; a
        // second resolve keeps the first stamp.
        let complaint = sqlx::query_as::<_, ComplaintDBResponse>(
            r#"
            UPDATE complaints SET
                subject = COALESCE($2, subject),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                resolution = CASE WHEN $9 THEN NULL ELSE COALESCE($6, resolution) END,
                resolved_by = CASE WHEN $9 THEN NULL ELSE COALESCE(resolved_by, $7) END,
                resolved_at = CASE WHEN $9 THEN NULL ELSE COALESCE(resolved_at, $8) END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.subject)
        .bind(&request.description)
        .bind(request.status)
        .bind(&request.priority)
        .bind(&request.resolution)
        .bind(request.resolved_by)
        .bind(request.resolved_at)
        .bind(request.clear_resolution)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(complaint)
    }
}

/// Filter for listing attendance rows
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub user_id: Option<UserId>,
    pub date: Option<NaiveDate>,
}

pub struct Attendance<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Attendance<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Writes a user's attendance for one day, merging into the existing row
    /// when the day is already recorded.
    pub async fn upsert_day(
        &mut self,
        user_id: UserId,
        date: NaiveDate,
        entry: &AttendanceUpdateDBRequest,
    ) -> Result<AttendanceDBResponse> {
        let updated = sqlx::query_as::<_, AttendanceDBResponse>(
            r#"
            UPDATE attendance SET
                status = COALESCE($3, status),
                check_in_time = COALESCE($4, check_in_time),
                check_out_time = COALESCE($5, check_out_time),
                remarks = COALESCE($6, remarks)
            WHERE user_id = $1 AND date = $2
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(entry.status)
        .bind(&entry.check_in_time)
        .bind(&entry.check_out_time)
        .bind(&entry.remarks)
        .fetch_optional(&mut *self.db)
        .await?;

        if let Some(row) = updated {
            return Ok(row);
        }

        self.create(&AttendanceCreateDBRequest {
            user_id,
            date,
            status: entry
                .status
                .unwrap_or(crate::api::models::operations::AttendanceStatus::Present),
            check_in_time: entry.check_in_time.clone(),
            check_out_time: entry.check_out_time.clone(),
            remarks: entry.remarks.clone(),
        })
        .await
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Attendance<'c> {
    type CreateRequest = AttendanceCreateDBRequest;
    type UpdateRequest = AttendanceUpdateDBRequest;
    type Response = AttendanceDBResponse;
    type Id = AttendanceId;
    type Filter = AttendanceFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, AttendanceDBResponse>(
            r#"
            INSERT INTO attendance (user_id, date, status, check_in_time, check_out_time, remarks)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(request.date)
        .bind(request.status)
        .bind(&request.check_in_time)
        .bind(&request.check_out_time)
        .bind(&request.remarks)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self), fields(attendance_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let row = sqlx::query_as::<_, AttendanceDBResponse>("SELECT * FROM attendance WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let rows = sqlx::query_as::<_, AttendanceDBResponse>(
            r#"
            SELECT * FROM attendance
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::date IS NULL OR date = $2)
            ORDER BY date DESC
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.date)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(rows)
    }

    #[instrument(skip(self), fields(attendance_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM attendance WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(attendance_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let row = sqlx::query_as::<_, AttendanceDBResponse>(
            r#"
            UPDATE attendance SET
                status = COALESCE($2, status),
                check_in_time = COALESCE($3, check_in_time),
                check_out_time = COALESCE($4, check_out_time),
                remarks = COALESCE($5, remarks)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.status)
        .bind(&request.check_in_time)
        .bind(&request.check_out_time)
        .bind(&request.remarks)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(row)
    }
}
