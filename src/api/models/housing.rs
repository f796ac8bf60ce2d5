//! API request/response models for blocks and rooms.

use crate::db::models::housing::{BlockDBResponse, RoomDBResponse};
use crate::errors::{Error, FieldIssue};
use crate::types::{BlockId, RoomId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Room category. Stored as a Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "room_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    Ac,
    NonAc,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockCreate {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_floor_count")]
    pub floor_count: i32,
}

fn default_floor_count() -> i32 {
    1
}

impl BlockCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(FieldIssue::new("name", "must not be empty"));
        }
        if self.floor_count < 1 {
            issues.push(FieldIssue::new("floorCount", "must be at least 1"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub floor_count: Option<i32>,
}

impl BlockUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                issues.push(FieldIssue::new("name", "must not be empty"));
            }
        }
        if let Some(count) = self.floor_count {
            if count < 1 {
                issues.push(FieldIssue::new("floorCount", "must be at least 1"));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: BlockId,
    pub name: String,
    pub description: Option<String>,
    pub floor_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<BlockDBResponse> for BlockResponse {
    fn from(db: BlockDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            description: db.description,
            floor_count: db.floor_count,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreate {
    #[schema(value_type = String, format = "uuid")]
    pub block_id: BlockId,
    pub room_number: String,
    #[serde(default = "default_capacity")]
    pub capacity: i32,
    #[serde(default = "default_room_type", rename = "type")]
    pub room_type: RoomType,
    #[serde(default = "default_floor")]
    pub floor: i32,
    #[serde(default)]
    #[schema(value_type = String)]
    pub monthly_rent: Decimal,
}

fn default_capacity() -> i32 {
    4
}

fn default_room_type() -> RoomType {
    RoomType::NonAc
}

fn default_floor() -> i32 {
    1
}

impl RoomCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.room_number.trim().is_empty() {
            issues.push(FieldIssue::new("roomNumber", "must not be empty"));
        }
        if self.capacity < 1 {
            issues.push(FieldIssue::new("capacity", "must be at least 1"));
        }
        if self.monthly_rent < Decimal::ZERO {
            issues.push(FieldIssue::new("monthlyRent", "must not be negative"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdate {
    pub room_number: Option<String>,
    pub capacity: Option<i32>,
    #[serde(rename = "type")]
    pub room_type: Option<RoomType>,
    pub floor: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub monthly_rent: Option<Decimal>,
}

impl RoomUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if let Some(room_number) = &self.room_number {
            if room_number.trim().is_empty() {
                issues.push(FieldIssue::new("roomNumber", "must not be empty"));
            }
        }
        if let Some(capacity) = self.capacity {
            if capacity < 1 {
                issues.push(FieldIssue::new("capacity", "must be at least 1"));
            }
        }
        if let Some(rent) = self.monthly_rent {
            if rent < Decimal::ZERO {
                issues.push(FieldIssue::new("monthlyRent", "must not be negative"));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: RoomId,
    #[schema(value_type = String, format = "uuid")]
    pub block_id: BlockId,
    pub room_number: String,
    pub capacity: i32,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub floor: i32,
    #[schema(value_type = String)]
    pub monthly_rent: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<RoomDBResponse> for RoomResponse {
    fn from(db: RoomDBResponse) -> Self {
        Self {
            id: db.id,
            block_id: db.block_id,
            room_number: db.room_number,
            capacity: db.capacity,
            room_type: db.room_type,
            floor: db.floor,
            monthly_rent: db.monthly_rent,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for listing rooms
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListRoomsQuery {
    /// Filter by block
    #[param(value_type = Option<String>, format = "uuid")]
    pub block_id: Option<BlockId>,
}
