//! API request/response models for student payments.

use crate::db::models::payments::PaymentDBResponse;
use crate::errors::{Error, FieldIssue};
use crate::types::{PaymentId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Approval state of a student payment. Stored as a Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreate {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub payment_type: String,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub month: i32,
    pub year: i32,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub paid_date: Option<NaiveDate>,
}

pub(crate) fn default_payment_method() -> String {
    "CASH".to_string()
}

impl PaymentCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.amount <= Decimal::ZERO {
            issues.push(FieldIssue::new("amount", "must be positive"));
        }
        if self.payment_type.trim().is_empty() {
            issues.push(FieldIssue::new("paymentType", "must not be empty"));
        }
        if !(1..=12).contains(&self.month) {
            issues.push(FieldIssue::new("month", "must be between 1 and 12"));
        }
        if self.year < 2000 {
            issues.push(FieldIssue::new("year", "must be a plausible year"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub payment_type: Option<String>,
    pub payment_method: Option<String>,
    pub status: Option<PaymentStatus>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub paid_date: Option<NaiveDate>,
}

impl PaymentUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if let Some(amount) = self.amount {
            if amount <= Decimal::ZERO {
                issues.push(FieldIssue::new("amount", "must be positive"));
            }
        }
        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                issues.push(FieldIssue::new("month", "must be between 1 and 12"));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PaymentId,
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub payment_type: String,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub month: i32,
    pub year: i32,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub paid_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub approved_by: Option<UserId>,
    pub approved_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<PaymentDBResponse> for PaymentResponse {
    fn from(db: PaymentDBResponse) -> Self {
        Self {
            id: db.id,
            student_id: db.student_id,
            amount: db.amount,
            payment_type: db.payment_type,
            payment_method: db.payment_method,
            status: db.status,
            month: db.month,
            year: db.year,
            transaction_id: db.transaction_id,
            remarks: db.remarks,
            paid_date: db.paid_date,
            approved_by: db.approved_by,
            approved_date: db.approved_date,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing student payments
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListPaymentsQuery {
    /// Filter by student
    #[param(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_wire_format() {
        assert_eq!(serde_json::to_string(&PaymentStatus::Pending).unwrap(), "\"PENDING\"");
        let parsed: PaymentStatus = serde_json::from_str("\"APPROVED\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Approved);
    }

    #[test]
    fn test_payment_create_validation() {
        let payment = PaymentCreate {
            student_id: uuid::Uuid::new_v4(),
            amount: Decimal::new(-100, 0),
            payment_type: "".into(),
            payment_method: default_payment_method(),
            month: 13,
            year: 2024,
            transaction_id: None,
            remarks: None,
            paid_date: None,
        };
        match payment.validate().unwrap_err() {
            Error::Validation { issues } => assert_eq!(issues.len(), 3),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
