//! API request/response models for meal rates and daily meal records.

use crate::db::models::meals::{MealRateDBResponse, MealRecordDBResponse};
use crate::errors::{Error, FieldIssue};
use crate::types::{MealRateId, MealRecordId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Meal served by the mess. Stored as a Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "meal_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealRateCreate {
    pub meal_type: MealType,
    #[schema(value_type = String)]
    pub rate: Decimal,
    pub effective_from: NaiveDate,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl MealRateCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.rate <= Decimal::ZERO {
            issues.push(FieldIssue::new("rate", "must be positive"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealRateUpdate {
    #[schema(value_type = Option<String>)]
    pub rate: Option<Decimal>,
    pub effective_from: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl MealRateUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if let Some(rate) = self.rate {
            if rate <= Decimal::ZERO {
                issues.push(FieldIssue::new("rate", "must be positive"));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealRateResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: MealRateId,
    pub meal_type: MealType,
    #[schema(value_type = String)]
    pub rate: Decimal,
    pub effective_from: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MealRateDBResponse> for MealRateResponse {
    fn from(db: MealRateDBResponse) -> Self {
        Self {
            id: db.id,
            meal_type: db.meal_type,
            rate: db.rate,
            effective_from: db.effective_from,
            is_active: db.is_active,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealRecordCreate {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    pub date: NaiveDate,
    #[serde(default)]
    pub breakfast: bool,
    #[serde(default)]
    pub lunch: bool,
    #[serde(default)]
    pub dinner: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealRecordUpdate {
    pub breakfast: Option<bool>,
    pub lunch: Option<bool>,
    pub dinner: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealRecordResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: MealRecordId,
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    pub date: NaiveDate,
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
    pub created_at: DateTime<Utc>,
}

impl From<MealRecordDBResponse> for MealRecordResponse {
    fn from(db: MealRecordDBResponse) -> Self {
        Self {
            id: db.id,
            student_id: db.student_id,
            date: db.date,
            breakfast: db.breakfast,
            lunch: db.lunch,
            dinner: db.dinner,
            created_at: db.created_at,
        }
    }
}

/// One entry of a bulk meal submission. Flags left out keep whatever is
/// already stored for that student and date.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkMealEntry {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    pub breakfast: Option<bool>,
    pub lunch: Option<bool>,
    pub dinner: Option<bool>,
}

/// Body of `POST /api/meal-records/bulk`. Entries are raw JSON values so a
/// malformed entry is skipped instead of failing the whole batch.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkMealRequest {
    pub date: NaiveDate,
    #[schema(value_type = Vec<BulkMealEntry>)]
    pub meals: Vec<serde_json::Value>,
}

/// Query parameters for listing meal records
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListMealRecordsQuery {
    /// Filter by student
    #[param(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_wire_format() {
        assert_eq!(serde_json::to_string(&MealType::Breakfast).unwrap(), "\"BREAKFAST\"");
    }

    #[test]
    fn test_bulk_entry_partial_flags() {
        let entry: BulkMealEntry =
            serde_json::from_str(&format!("{{\"studentId\": \"{}\", \"lunch\": true}}", uuid::Uuid::new_v4())).unwrap();
        assert_eq!(entry.breakfast, None);
        assert_eq!(entry.lunch, Some(true));
        assert_eq!(entry.dinner, None);
    }

    #[test]
    fn test_bulk_request_tolerates_malformed_entries() {
        // The batch parses even when an entry is garbage; the handler decides what to skip
        let body = serde_json::json!({
            "date": "2024-06-10",
            "meals": [
                {"studentId": uuid::Uuid::new_v4(), "breakfast": true},
                {"studentId": "not-a-uuid"},
                42,
            ]
        });
        let request: BulkMealRequest = serde_json::from_value(body).unwrap();
        assert_eq!(request.meals.len(), 3);
        let parsed: Vec<_> = request
            .meals
            .iter()
            .filter_map(|v| serde_json::from_value::<BulkMealEntry>(v.clone()).ok())
            .collect();
        assert_eq!(parsed.len(), 1);
    }
}
