//! Database models for student payments.

use crate::api::models::payments::PaymentStatus;
use crate::types::{PaymentId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct PaymentCreateDBRequest {
    pub student_id: UserId,
    pub amount: Decimal,
    pub payment_type: String,
    pub payment_method: String,
    pub month: i32,
    pub year: i32,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub paid_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentUpdateDBRequest {
    pub amount: Option<Decimal>,
    pub payment_type: Option<String>,
    pub payment_method: Option<String>,
    pub status: Option<PaymentStatus>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub paid_date: Option<NaiveDate>,
    /// Stamped by the handler when the status transitions to APPROVED
    pub approved_by: Option<UserId>,
    pub approved_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PaymentDBResponse {
    pub id: PaymentId,
    pub student_id: UserId,
    pub amount: Decimal,
    pub payment_type: String,
    pub payment_method: String,
    pub status: PaymentStatus,
    pub month: i32,
    pub year: i32,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub paid_date: Option<NaiveDate>,
    pub approved_by: Option<UserId>,
    pub approved_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
