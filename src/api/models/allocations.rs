//! API request/response models for seat allocations.

use crate::db::models::allocations::AllocationDBResponse;
use crate::errors::{Error, FieldIssue};
use crate::types::{AllocationId, RoomId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationCreate {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub room_id: RoomId,
    pub bed_number: i32,
    pub allocated_date: NaiveDate,
}

impl AllocationCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.bed_number < 1 {
            issues.push(FieldIssue::new("bedNumber", "must be at least 1"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationUpdate {
    #[schema(value_type = Option<String>, format = "uuid")]
    pub room_id: Option<RoomId>,
    pub bed_number: Option<i32>,
    pub allocated_date: Option<NaiveDate>,
    /// Setting `false` deactivates the allocation while keeping its history
    pub is_active: Option<bool>,
}

impl AllocationUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if let Some(bed) = self.bed_number {
            if bed < 1 {
                issues.push(FieldIssue::new("bedNumber", "must be at least 1"));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AllocationId,
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    #[schema(value_type = String, format = "uuid")]
    pub room_id: RoomId,
    pub bed_number: i32,
    pub allocated_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AllocationDBResponse> for AllocationResponse {
    fn from(db: AllocationDBResponse) -> Self {
        Self {
            id: db.id,
            student_id: db.student_id,
            room_id: db.room_id,
            bed_number: db.bed_number,
            allocated_date: db.allocated_date,
            is_active: db.is_active,
            created_at: db.created_at,
        }
    }
}
