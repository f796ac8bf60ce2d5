//! Database models for vendor payments, expenses, and salaries.

use crate::types::{ExpenseId, SalaryId, UserId, VendorPaymentId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct VendorPaymentCreateDBRequest {
    pub vendor_name: String,
    pub amount: Decimal,
    pub purpose: String,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub invoice_number: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VendorPaymentUpdateDBRequest {
    pub vendor_name: Option<String>,
    pub amount: Option<Decimal>,
    pub purpose: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub invoice_number: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct VendorPaymentDBResponse {
    pub id: VendorPaymentId,
    pub vendor_name: String,
    pub amount: Decimal,
    pub purpose: String,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub invoice_number: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ExpenseCreateDBRequest {
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub paid_by: Option<String>,
    pub receipt_number: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdateDBRequest {
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub expense_date: Option<NaiveDate>,
    pub paid_by: Option<String>,
    pub receipt_number: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ExpenseDBResponse {
    pub id: ExpenseId,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub paid_by: Option<String>,
    pub receipt_number: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SalaryCreateDBRequest {
    pub employee_id: UserId,
    pub amount: Decimal,
    pub month: i32,
    pub year: i32,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub bonus: Decimal,
    pub deductions: Decimal,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SalaryUpdateDBRequest {
    pub amount: Option<Decimal>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub bonus: Option<Decimal>,
    pub deductions: Option<Decimal>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SalaryDBResponse {
    pub id: SalaryId,
    pub employee_id: UserId,
    pub amount: Decimal,
    pub month: i32,
    pub year: i32,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub bonus: Decimal,
    pub deductions: Decimal,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}
