//! Database models for blocks and rooms.

use crate::api::models::housing::RoomType;
use crate::types::{BlockId, RoomId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct BlockCreateDBRequest {
    pub name: String,
    pub description: Option<String>,
    pub floor_count: i32,
}

#[derive(Debug, Clone, Default)]
pub struct BlockUpdateDBRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub floor_count: Option<i32>,
}

#[derive(Debug, Clone, FromRow)]
pub struct BlockDBResponse {
    pub id: BlockId,
    pub name: String,
    pub description: Option<String>,
    pub floor_count: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RoomCreateDBRequest {
    pub block_id: BlockId,
    pub room_number: String,
    pub capacity: i32,
    pub room_type: RoomType,
    pub floor: i32,
    pub monthly_rent: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct RoomUpdateDBRequest {
    pub room_number: Option<String>,
    pub capacity: Option<i32>,
    pub room_type: Option<RoomType>,
    pub floor: Option<i32>,
    pub monthly_rent: Option<Decimal>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RoomDBResponse {
    pub id: RoomId,
    pub block_id: BlockId,
    pub room_number: String,
    pub capacity: i32,
    pub room_type: RoomType,
    pub floor: i32,
    pub monthly_rent: Decimal,
    pub created_at: DateTime<Utc>,
}
