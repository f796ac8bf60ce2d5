//! Database models for seat allocations.

use crate::types::{AllocationId, RoomId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct AllocationCreateDBRequest {
    pub student_id: UserId,
    pub room_id: RoomId,
    pub bed_number: i32,
    pub allocated_date: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct AllocationUpdateDBRequest {
    pub room_id: Option<RoomId>,
    pub bed_number: Option<i32>,
    pub allocated_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AllocationDBResponse {
    pub id: AllocationId,
    pub student_id: UserId,
    pub room_id: RoomId,
    pub bed_number: i32,
    pub allocated_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
