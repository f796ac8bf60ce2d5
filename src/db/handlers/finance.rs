//! Database repositories for vendor payments, expenses, and salaries.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::finance::{
        ExpenseCreateDBRequest, ExpenseDBResponse, ExpenseUpdateDBRequest,
        SalaryCreateDBRequest, SalaryDBResponse, SalaryUpdateDBRequest,
        VendorPaymentCreateDBRequest, VendorPaymentDBResponse, VendorPaymentUpdateDBRequest,
    },
};
use crate::types::{ExpenseId, SalaryId, UserId, VendorPaymentId, abbrev_uuid};
use sqlx::PgConnection;
use tracing::instrument;

pub struct VendorPayments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> VendorPayments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for VendorPayments<'c> {
    type CreateRequest = VendorPaymentCreateDBRequest;
    type UpdateRequest = VendorPaymentUpdateDBRequest;
    type Response = VendorPaymentDBResponse;
    type Id = VendorPaymentId;
    type Filter = ();

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let payment = sqlx::query_as::<_, VendorPaymentDBResponse>(
            r#"
            INSERT INTO vendor_payments
                (vendor_name, amount, purpose, payment_date, payment_method, invoice_number, remarks)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&request.vendor_name)
        .bind(request.amount)
        .bind(&request.purpose)
        .bind(request.payment_date)
        .bind(&request.payment_method)
        .bind(&request.invoice_number)
        .bind(&request.remarks)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(payment)
    }

    #[instrument(skip(self), fields(vendor_payment_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let payment = sqlx::query_as::<_, VendorPaymentDBResponse>("SELECT * FROM vendor_payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(payment)
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let payments = sqlx::query_as::<_, VendorPaymentDBResponse>(
            "SELECT * FROM vendor_payments ORDER BY payment_date DESC",
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(payments)
    }

    #[instrument(skip(self), fields(vendor_payment_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vendor_payments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(vendor_payment_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let payment = sqlx::query_as::<_, VendorPaymentDBResponse>(
            r#"
            UPDATE vendor_payments SET
                vendor_name = COALESCE($2, vendor_name),
                amount = COALESCE($3, amount),
                purpose = COALESCE($4, purpose),
                payment_date = COALESCE($5, payment_date),
                payment_method = COALESCE($6, payment_method),
                invoice_number = COALESCE($7, invoice_number),
                remarks = COALESCE($8, remarks)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.vendor_name)
        .bind(request.amount)
        .bind(&request.purpose)
        .bind(request.payment_date)
        .bind(&request.payment_method)
        .bind(&request.invoice_number)
        .bind(&request.remarks)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(payment)
    }
}

pub struct Expenses<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Expenses<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Expenses<'c> {
    type CreateRequest = ExpenseCreateDBRequest;
    type UpdateRequest = ExpenseUpdateDBRequest;
    type Response = ExpenseDBResponse;
    type Id = ExpenseId;
    type Filter = ();

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let expense = sqlx::query_as::<_, ExpenseDBResponse>(
            r#"
            INSERT INTO expenses
                (category, description, amount, expense_date, paid_by, receipt_number, remarks)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&request.category)
        .bind(&request.description)
        .bind(request.amount)
        .bind(request.expense_date)
        .bind(&request.paid_by)
        .bind(&request.receipt_number)
        .bind(&request.remarks)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(expense)
    }

    #[instrument(skip(self), fields(expense_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let expense = sqlx::query_as::<_, ExpenseDBResponse>("SELECT * FROM expenses WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(expense)
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let expenses =
            sqlx::query_as::<_, ExpenseDBResponse>("SELECT * FROM expenses ORDER BY expense_date DESC")
                .fetch_all(&mut *self.db)
                .await?;

        Ok(expenses)
    }

    #[instrument(skip(self), fields(expense_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(expense_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let expense = sqlx::query_as::<_, ExpenseDBResponse>(
            r#"
            UPDATE expenses SET
                category = COALESCE($2, category),
                description = COALESCE($3, description),
                amount = COALESCE($4, amount),
                expense_date = COALESCE($5, expense_date),
                paid_by = COALESCE($6, paid_by),
                receipt_number = COALESCE($7, receipt_number),
                remarks = COALESCE($8, remarks)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.category)
        .bind(&request.description)
        .bind(request.amount)
        .bind(request.expense_date)
        .bind(&request.paid_by)
        .bind(&request.receipt_number)
        .bind(&request.remarks)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(expense)
    }
}

/// Filter for listing salary payments
#[derive(Debug, Clone, Default)]
pub struct SalaryFilter {
    pub employee_id: Option<UserId>,
}

pub struct Salaries<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Salaries<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Salaries<'c> {
    type CreateRequest = SalaryCreateDBRequest;
    type UpdateRequest = SalaryUpdateDBRequest;
    type Response = SalaryDBResponse;
    type Id = SalaryId;
    type Filter = SalaryFilter;

    #[instrument(skip(self, request), fields(employee_id = %abbrev_uuid(&request.employee_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let salary = sqlx::query_as::<_, SalaryDBResponse>(
            r#"
            INSERT INTO salaries
                (employee_id, amount, month, year, payment_date, payment_method, bonus, deductions, remarks)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(request.employee_id)
        .bind(request.amount)
        .bind(request.month)
        .bind(request.year)
        .bind(request.payment_date)
        .bind(&request.payment_method)
        .bind(request.bonus)
        .bind(request.deductions)
        .bind(&request.remarks)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(salary)
    }

    #[instrument(skip(self), fields(salary_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let salary = sqlx::query_as::<_, SalaryDBResponse>("SELECT * FROM salaries WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(salary)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let salaries = sqlx::query_as::<_, SalaryDBResponse>(
            "SELECT * FROM salaries WHERE ($1::uuid IS NULL OR employee_id = $1) ORDER BY payment_date DESC",
        )
        .bind(filter.employee_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(salaries)
    }

    #[instrument(skip(self), fields(salary_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM salaries WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(salary_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let salary = sqlx::query_as::<_, SalaryDBResponse>(
            r#"
            UPDATE salaries SET
                amount = COALESCE($2, amount),
                month = COALESCE($3, month),
                year = COALESCE($4, year),
                payment_date = COALESCE($5, payment_date),
                payment_method = COALESCE($6, payment_method),
                bonus = COALESCE($7, bonus),
                deductions = COALESCE($8, deductions),
                remarks = COALESCE($9, remarks)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.amount)
        .bind(request.month)
        .bind(request.year)
        .bind(request.payment_date)
        .bind(&request.payment_method)
        .bind(request.bonus)
        .bind(request.deductions)
        .bind(&request.remarks)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(salary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::create_test_user;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_expense_crud(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Expenses::new(&mut conn);

        let created = repo
            .create(&ExpenseCreateDBRequest {
                category: "MAINTENANCE".into(),
                description: "Water pump repair".into(),
                amount: Decimal::new(120000, 2),
                expense_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                paid_by: Some("warden".into()),
                receipt_number: None,
                remarks: None,
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                &ExpenseUpdateDBRequest {
                    amount: Some(Decimal::new(135000, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.amount, Decimal::new(135000, 2));
        assert_eq!(updated.description, "Water pump repair");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn test_salary_list_filters_by_employee(pool: PgPool) {
        let cook = create_test_user(&pool, "cook@example.com", Role::Employee).await;
        let guard = create_test_user(&pool, "guard@example.com", Role::Employee).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Salaries::new(&mut conn);

        for employee_id in [cook.id, cook.id, guard.id] {
            repo.create(&SalaryCreateDBRequest {
                employee_id,
                amount: Decimal::new(1800000, 2),
                month: 6,
                year: 2024,
                payment_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                payment_method: "BANK_TRANSFER".into(),
                bonus: Decimal::ZERO,
                deductions: Decimal::ZERO,
                remarks: None,
            })
            .await
            .unwrap();
        }

        let for_cook = repo
            .list(&SalaryFilter {
                employee_id: Some(cook.id),
            })
            .await
            .unwrap();
        assert_eq!(for_cook.len(), 2);

        let all = repo.list(&SalaryFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[sqlx::test]
    async fn test_vendor_payment_update_missing_row(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = VendorPayments::new(&mut conn);

        let err = repo
            .update(
                uuid::Uuid::new_v4(),
                &VendorPaymentUpdateDBRequest {
                    amount: Some(Decimal::ONE),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::db::errors::DbError::NotFound));
    }
}
