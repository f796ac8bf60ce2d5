//! API request/response models for notices, complaints, and attendance.

use crate::db::models::operations::{AttendanceDBResponse, ComplaintDBResponse, NoticeDBResponse};
use crate::errors::{Error, FieldIssue};
use crate::types::{AttendanceId, ComplaintId, NoticeId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Lifecycle state of a complaint. Stored as a Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "complaint_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

/// Daily attendance state. Stored as a Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
}

/// Who a notice is shown to. Stored as a Postgres enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "notice_visibility", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeVisibility {
    All,
    Students,
    Staff,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeCreate {
    pub title: String,
    pub content: String,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default = "default_visibility")]
    pub visibility: NoticeVisibility,
    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_visibility() -> NoticeVisibility {
    NoticeVisibility::All
}

pub(crate) fn default_priority() -> String {
    "NORMAL".to_string()
}

impl NoticeCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.title.trim().is_empty() {
            issues.push(FieldIssue::new("title", "must not be empty"));
        }
        if self.content.trim().is_empty() {
            issues.push(FieldIssue::new("content", "must not be empty"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
    pub visibility: Option<NoticeVisibility>,
    pub priority: Option<String>,
}

impl NoticeUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                issues.push(FieldIssue::new("title", "must not be empty"));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoticeResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: NoticeId,
    pub title: String,
    pub content: String,
    #[schema(value_type = String, format = "uuid")]
    pub created_by: UserId,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub visibility: NoticeVisibility,
    pub priority: String,
    pub created_at: DateTime<Utc>,
}

impl From<NoticeDBResponse> for NoticeResponse {
    fn from(db: NoticeDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            content: db.content,
            created_by: db.created_by,
            expires_at: db.expires_at,
            is_active: db.is_active,
            visibility: db.visibility,
            priority: db.priority,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintCreate {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    pub subject: String,
    pub description: String,
    #[serde(default = "default_priority")]
    pub priority: String,
}

impl ComplaintCreate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if self.subject.trim().is_empty() {
            issues.push(FieldIssue::new("subject", "must not be empty"));
        }
        if self.description.trim().is_empty() {
            issues.push(FieldIssue::new("description", "must not be empty"));
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintUpdate {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub status: Option<ComplaintStatus>,
    pub priority: Option<String>,
    pub resolution: Option<String>,
}

impl ComplaintUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        let mut issues = Vec::new();
        if let Some(subject) = &self.subject {
            if subject.trim().is_empty() {
                issues.push(FieldIssue::new("subject", "must not be empty"));
            }
        }
        if issues.is_empty() { Ok(()) } else { Err(Error::Validation { issues }) }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ComplaintId,
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    pub subject: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub priority: String,
    pub resolved_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub resolved_by: Option<UserId>,
    pub resolution: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ComplaintDBResponse> for ComplaintResponse {
    fn from(db: ComplaintDBResponse) -> Self {
        Self {
            id: db.id,
            student_id: db.student_id,
            subject: db.subject,
            description: db.description,
            status: db.status,
            priority: db.priority,
            resolved_at: db.resolved_at,
            resolved_by: db.resolved_by,
            resolution: db.resolution,
            created_at: db.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceCreate {
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub date: NaiveDate,
    #[serde(default = "default_attendance_status")]
    pub status: AttendanceStatus,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub remarks: Option<String>,
}

fn default_attendance_status() -> AttendanceStatus {
    AttendanceStatus::Present
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUpdate {
    pub status: Option<AttendanceStatus>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AttendanceId,
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AttendanceDBResponse> for AttendanceResponse {
    fn from(db: AttendanceDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            date: db.date,
            status: db.status,
            check_in_time: db.check_in_time,
            check_out_time: db.check_out_time,
            remarks: db.remarks,
            created_at: db.created_at,
        }
    }
}

/// One entry of a bulk attendance submission.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAttendanceEntry {
    #[schema(value_type = String, format = "uuid")]
    pub user_id: UserId,
    pub status: Option<AttendanceStatus>,
    pub check_in_time: Option<String>,
    pub check_out_time: Option<String>,
    pub remarks: Option<String>,
}

/// Body of `POST /api/attendance/bulk`. Entries are raw JSON values so a
/// malformed entry is skipped instead of failing the whole batch.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkAttendanceRequest {
    pub date: NaiveDate,
    #[schema(value_type = Vec<BulkAttendanceEntry>)]
    pub entries: Vec<serde_json::Value>,
}

/// Query parameters for listing complaints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListComplaintsQuery {
    /// Filter by student
    #[param(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<UserId>,
}

/// Query parameters for listing attendance
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListAttendanceQuery {
    /// Filter by user
    #[param(value_type = Option<String>, format = "uuid")]
    pub user_id: Option<UserId>,
}
