//! Database repository for student payments.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::payments::{PaymentCreateDBRequest, PaymentDBResponse, PaymentUpdateDBRequest},
};
use crate::types::{PaymentId, UserId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

/// Filter for listing student payments
#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub student_id: Option<UserId>,
}

pub struct StudentPayments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> StudentPayments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for StudentPayments<'c> {
    type CreateRequest = PaymentCreateDBRequest;
    type UpdateRequest = PaymentUpdateDBRequest;
    type Response = PaymentDBResponse;
    type Id = PaymentId;
    type Filter = PaymentFilter;

    #[instrument(skip(self, request), fields(student_id = %abbrev_uuid(&request.student_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let payment = sqlx::query_as::<_, PaymentDBResponse>(
            r#"
            INSERT INTO student_payments
                (student_id, amount, payment_type, payment_method, month, year, transaction_id, remarks, paid_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.student_id)
        .bind(request.amount)
        .bind(&request.payment_type)
        .bind(&request.payment_method)
        .bind(request.month)
        .bind(request.year)
        .bind(&request.transaction_id)
        .bind(&request.remarks)
        .bind(request.paid_date)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(payment)
    }

    #[instrument(skip(self), fields(payment_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let payment = sqlx::query_as::<_, PaymentDBResponse>("SELECT * FROM student_payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(payment)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let payments = sqlx::query_as::<_, PaymentDBResponse>(
            "SELECT * FROM student_payments WHERE ($1::uuid IS NULL OR student_id = $1) ORDER BY created_at DESC",
        )
        .bind(filter.student_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(payments)
    }

    #[instrument(skip(self), fields(payment_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM student_payments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(payment_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let payment = sqlx::query_as::<_, PaymentDBResponse>(
            r#"
            UPDATE student_payments SET
                amount = COALESCE($2, amount),
                payment_type = COALESCE($3, payment_type),
                payment_method = COALESCE($4, payment_method),
                status = COALESCE($5, status),
                month = COALESCE($6, month),
                year = COALESCE($7, year),
                transaction_id = COALESCE($8, transaction_id),
                remarks = COALESCE($9, remarks),
                paid_date = COALESCE($10, paid_date),
                approved_by = COALESCE($11, approved_by),
                approved_date = COALESCE($12, approved_date)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.amount)
        .bind(&request.payment_type)
        .bind(&request.payment_method)
        .bind(request.status)
        .bind(request.month)
        .bind(request.year)
        .bind(&request.transaction_id)
        .bind(&request.remarks)
        .bind(request.paid_date)
        .bind(request.approved_by)
        .bind(request.approved_date)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::payments::PaymentStatus;
    use crate::api::models::users::Role;
    use crate::test_utils::create_test_user;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    fn payment_request(student_id: UserId) -> PaymentCreateDBRequest {
        PaymentCreateDBRequest {
            student_id,
            amount: Decimal::new(450000, 2),
            payment_type: "HOSTEL_FEE".into(),
            payment_method: "CASH".into(),
            month: 6,
            year: 2024,
            transaction_id: None,
            remarks: None,
            paid_date: None,
        }
    }

    #[sqlx::test]
    async fn test_payment_defaults_to_pending(pool: PgPool) {
        let student = create_test_user(&pool, "payer@example.com", Role::Student).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = StudentPayments::new(&mut conn);

        let created = repo.create(&payment_request(student.id)).await.unwrap();
        assert_eq!(created.status, PaymentStatus::Pending);
        assert!(created.approved_by.is_none());
    }

    #[sqlx::test]
    async fn test_approval_stamps_survive_merge(pool: PgPool) {
        let student = create_test_user(&pool, "payer@example.com", Role::Student).await;
        let admin = create_test_user(&pool, "admin@example.com", Role::Admin).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = StudentPayments::new(&mut conn);

        let created = repo.create(&payment_request(student.id)).await.unwrap();

        let approved = repo
            .update(
                created.id,
                &PaymentUpdateDBRequest {
                    status: Some(PaymentStatus::Approved),
                    approved_by: Some(admin.id),
                    approved_date: Some(chrono::Utc::now()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(approved.status, PaymentStatus::Approved);
        assert_eq!(approved.approved_by, Some(admin.id));

        // A later unrelated merge keeps the approval stamps
        let remarked = repo
            .update(
                created.id,
                &PaymentUpdateDBRequest {
                    remarks: Some("verified".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(remarked.approved_by, Some(admin.id));
        assert_eq!(remarked.remarks.as_deref(), Some("verified"));
    }

    #[sqlx::test]
    async fn test_list_filters_by_student(pool: PgPool) {
        let a = create_test_user(&pool, "a@example.com", Role::Student).await;
        let b = create_test_user(&pool, "b@example.com", Role::Student).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = StudentPayments::new(&mut conn);

        repo.create(&payment_request(a.id)).await.unwrap();
        repo.create(&payment_request(a.id)).await.unwrap();
        repo.create(&payment_request(b.id)).await.unwrap();

        let for_a = repo
            .list(&PaymentFilter {
                student_id: Some(a.id),
            })
            .await
            .unwrap();
        assert_eq!(for_a.len(), 2);
    }
}
