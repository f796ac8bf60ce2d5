//! API request/response models for vendor payments, expenses, and salaries.

use crate::db::models::finance::{ExpenseDBResponse, SalaryDBResponse, VendorPaymentDBResponse};
use crate::errors::{Error, FieldIssue};
use crate::types::{ExpenseId, SalaryId, UserId, VendorPaymentId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::payments::default_payment_method;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorPaymentCreate {
    pub vendor_name: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub purpose: String,
    pub payment_date: NaiveDate,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    pub invoice_number: Option<String>,
    pub remarks: Option<String>,
}

impl VendorPaymentCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.vendor_name.trim().is_empty() {
            issues.push(FieldIssue::new("vendorName", "must not be empty"));
        }
        if self.purpose.trim().is_empty() {
            issues.push(FieldIssue::new("purpose", "must not be empty"));
        }
        if self.amount <= Decimal::ZERO {
            issues.push(FieldIssue::new("amount", "must be positive"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorPaymentUpdate {
    pub vendor_name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub purpose: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    pub invoice_number: Option<String>,
    pub remarks: Option<String>,
}

impl VendorPaymentUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if let Some(amount) = self.amount {
            if amount <= Decimal::ZERO {
                issues.push(FieldIssue::new("amount", "must be positive"));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorPaymentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: VendorPaymentId,
    pub vendor_name: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub purpose: String,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    pub invoice_number: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<VendorPaymentDBResponse> for VendorPaymentResponse {
    fn from(db: VendorPaymentDBResponse) -> Self {
        Self {
            id: db.id,
            vendor_name: db.vendor_name,
            amount: db.amount,
            purpose: db.purpose,
            payment_date: db.payment_date,
            payment_method: db.payment_method,
            invoice_number: db.invoice_number,
            remarks: db.remarks,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseCreate {
    pub category: String,
    pub description: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub paid_by: Option<String>,
    pub receipt_number: Option<String>,
    pub remarks: Option<String>,
}

impl ExpenseCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.category.trim().is_empty() {
            issues.push(FieldIssue::new("category", "must not be empty"));
        }
        if self.description.trim().is_empty() {
            issues.push(FieldIssue::new("description", "must not be empty"));
        }
        if self.amount <= Decimal::ZERO {
            issues.push(FieldIssue::new("amount", "must be positive"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    pub category: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub expense_date: Option<NaiveDate>,
    pub paid_by: Option<String>,
    pub receipt_number: Option<String>,
    pub remarks: Option<String>,
}

impl ExpenseUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if let Some(amount) = self.amount {
            if amount <= Decimal::ZERO {
                issues.push(FieldIssue::new("amount", "must be positive"));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ExpenseId,
    pub category: String,
    pub description: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub paid_by: Option<String>,
    pub receipt_number: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ExpenseDBResponse> for ExpenseResponse {
    fn from(db: ExpenseDBResponse) -> Self {
        Self {
            id: db.id,
            category: db.category,
            description: db.description,
            amount: db.amount,
            expense_date: db.expense_date,
            paid_by: db.paid_by,
            receipt_number: db.receipt_number,
            remarks: db.remarks,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryCreate {
    #[schema(value_type = String, format = "uuid")]
    pub employee_id: UserId,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub month: i32,
    pub year: i32,
    pub payment_date: NaiveDate,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default)]
    #[schema(value_type = String)]
    pub bonus: Decimal,
    #[serde(default)]
    #[schema(value_type = String)]
    pub deductions: Decimal,
    pub remarks: Option<String>,
}

impl SalaryCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.amount <= Decimal::ZERO {
            issues.push(FieldIssue::new("amount", "must be positive"));
        }
        if !(1..=12).contains(&self.month) {
            issues.push(FieldIssue::new("month", "must be between 1 and 12"));
        }
        if self.bonus < Decimal::ZERO {
            issues.push(FieldIssue::new("bonus", "must not be negative"));
        }
        if self.deductions < Decimal::ZERO {
            issues.push(FieldIssue::new("deductions", "must not be negative"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalaryUpdate {
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub payment_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
    #[schema(value_type = Option<String>)]
    pub bonus: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub deductions: Option<Decimal>,
    pub remarks: Option<String>,
}

impl SalaryUpdate {
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
pub struct SalaryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: SalaryId,
    #[schema(value_type = String, format = "uuid")]
    pub employee_id: UserId,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub month: i32,
    pub year: i32,
    pub payment_date: NaiveDate,
    pub payment_method: String,
    #[schema(value_type = String)]
    pub bonus: Decimal,
    #[schema(value_type = String)]
    pub deductions: Decimal,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SalaryDBResponse> for SalaryResponse {
    fn from(db: SalaryDBResponse) -> Self {
        Self {
            id: db.id,
            employee_id: db.employee_id,
            amount: db.amount,
            month: db.month,
            year: db.year,
            payment_date: db.payment_date,
            payment_method: db.payment_method,
            bonus: db.bonus,
            deductions: db.deductions,
            remarks: db.remarks,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing salaries
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListSalariesQuery {
    /// Filter by employee
    #[param(value_type = Option<String>, format = "uuid")]
    pub employee_id: Option<UserId>,
}
