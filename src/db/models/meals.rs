//! Database models for meal rates and daily meal records.

use crate::api::models::meals::MealType;
use crate::types::{MealRateId, MealRecordId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct MealRateCreateDBRequest {
    pub meal_type: MealType,
    pub rate: Decimal,
    pub effective_from: NaiveDate,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MealRateUpdateDBRequest {
    pub rate: Option<Decimal>,
    pub effective_from: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MealRateDBResponse {
    pub id: MealRateId,
    pub meal_type: MealType,
    pub rate: Decimal,
    pub effective_from: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct MealRecordCreateDBRequest {
    pub student_id: UserId,
    pub date: NaiveDate,
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
}

/// Partial update for a meal record. `None` flags keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct MealRecordUpdateDBRequest {
    pub breakfast: Option<bool>,
    pub lunch: Option<bool>,
    pub dinner: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
pub struct MealRecordDBResponse {
    pub id: MealRecordId,
    pub student_id: UserId,
    pub date: NaiveDate,
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
    pub created_at: DateTime<Utc>,
}
