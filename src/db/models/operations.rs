//! Database models for notices, complaints, and attendance.

use crate::api::models::operations::{AttendanceStatus, ComplaintStatus, NoticeVisibility};
use crate::types::{AttendanceId, ComplaintId, NoticeId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone)]
pub struct NoticeCreateDBRequest {
    pub title: String,
    pub content: String,
    pub created_by: UserId,
    pub expires_at: Option<DateTime<Utc>>,
    pub visibility: NoticeVisibility,
    pub priority: String,
}

#[derive(Debug, Clone, Default)]
pub struct NoticeUpdateDBRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub visibility: Option<NoticeVisibility>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct NoticeDBResponse {
    pub id: NoticeId,
    pub title: String,
    pub content: String,
    pub created_by: UserId,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub visibility: NoticeVisibility,
    pub priority: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ComplaintCreateDBRequest {
    pub student_id: UserId,
    pub subject: String,
    pub description: String,
    pub priority: String,
}

#[derive(Debug, Clone, Default)]
pub struct ComplaintUpdateDBRequest {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub priority: Option<String>,
    pub resolution: Option<String>,
    /// Stamped by the handler on transitions into RESOLVED or CLOSED
    pub resolved_by: Option<UserId>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Set when a complaint is reopened, clearing the resolution fields
    pub clear_resolution: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct ComplaintDBResponse {
    pub id: ComplaintId,
    pub student_id: UserId,
    pub subject: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub priority: String,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<UserId>,
    pub resolution: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AttendanceCreateDBRequest {
    pub user_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub remarks: Option<String>,
}

/// Partial update for an attendance row. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct AttendanceUpdateDBRequest {
    pub status: Option<AttendanceStatus>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AttendanceDBResponse {
    pub id: AttendanceId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}
