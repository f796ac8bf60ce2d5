//! API response models for read-side aggregations.

use crate::types::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Dashboard summary computed on demand from current table state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_employees: i64,
    pub total_blocks: i64,
    pub total_rooms: i64,
    pub total_capacity: i64,
    pub occupied_seats: i64,
    pub available_seats: i64,
    /// Integer percentage, 0 when there is no capacity
    pub occupancy_rate: i64,
    /// Complaints that are OPEN or IN_PROGRESS
    pub open_complaints: i64,
    pub active_notices: i64,
}

/// Query parameters for the monthly meal cost aggregation
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MealCostQuery {
    #[param(value_type = String, format = "uuid")]
    pub student_id: UserId,
    pub month: u32,
    pub year: i32,
}

/// Monthly meal cost for one student, priced by the active rate per meal type.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealCostResponse {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    pub month: u32,
    pub year: i32,
    pub days_recorded: i64,
    pub total_meals: i64,
    #[schema(value_type = String)]
    pub total_cost: Decimal,
}
