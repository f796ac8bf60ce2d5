use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        operations::{
            AttendanceCreate, AttendanceResponse, AttendanceUpdate, BulkAttendanceEntry,
            BulkAttendanceRequest, ComplaintCreate, ComplaintResponse, ComplaintStatus,
            ComplaintUpdate, ListAttendanceQuery, ListComplaintsQuery, NoticeCreate,
            NoticeResponse, NoticeUpdate,
        },
        users::CurrentUser,
    },
    auth::RequireAdmin,
    db::{
        errors::DbError,
        handlers::{
            Attendance, Complaints, Notices, Repository,
            operations::{AttendanceFilter, ComplaintFilter},
        },
        models::operations::{
            AttendanceCreateDBRequest, AttendanceUpdateDBRequest, ComplaintCreateDBRequest,
            ComplaintUpdateDBRequest, NoticeCreateDBRequest, NoticeUpdateDBRequest,
        },
    },
    errors::Error,
    types::{AttendanceId, ComplaintId, NoticeId},
};

/// List notices
#[utoipa::path(
    get,
    path = "/notices",
    tag = "operations",
    responses(
        (status = 200, description = "List of notices", body = Vec<NoticeResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_notices(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> Result<Json<Vec<NoticeResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let notices = Notices::new(&mut conn).list(&()).await?;

    Ok(Json(notices.into_iter().map(NoticeResponse::from).collect()))
}

/// Get a notice by id
#[utoipa::path(
    get,
    path = "/notices/{id}",
    tag = "operations",
    responses(
        (status = 200, description = "Notice found", body = NoticeResponse),
        (status = 404, description = "Notice not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_notice(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<NoticeId>,
) -> Result<Json<NoticeResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let notice = Notices::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "notice".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(NoticeResponse::from(notice)))
}

/// Publish a notice
#[utoipa::path(
    post,
    path = "/notices",
    request_body = NoticeCreate,
    tag = "operations",
    responses(
        (status = 201, description = "Notice published", body = NoticeResponse),
        (status = 400, description = "Invalid input"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_notice(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(request): Json<NoticeCreate>,
) -> Result<(StatusCode, Json<NoticeResponse>), Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = Notices::new(&mut conn)
        .create(&NoticeCreateDBRequest {
            title: request.title,
            content: request.content,
            created_by: admin.id,
            expires_at: request.expires_at,
            visibility: request.visibility,
            priority: request.priority,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(NoticeResponse::from(created))))
}

/// Update a notice
#[utoipa::path(
    patch,
    path = "/notices/{id}",
    request_body = NoticeUpdate,
    tag = "operations",
    responses(
        (status = 200, description = "Notice updated", body = NoticeResponse),
        (status = 404, description = "Notice not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_notice(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<NoticeId>,
    Json(request): Json<NoticeUpdate>,
) -> Result<Json<NoticeResponse>, Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = Notices::new(&mut conn)
        .update(
            id,
            &NoticeUpdateDBRequest {
                title: request.title,
                content: request.content,
                expires_at: request.expires_at,
                is_active: request.is_active,
                visibility: request.visibility,
                priority: request.priority,
            },
        )
        .await?;

    Ok(Json(NoticeResponse::from(updated)))
}

/// Delete a notice
#[utoipa::path(
    delete,
    path = "/notices/{id}",
    tag = "operations",
    responses(
        (status = 204, description = "Notice deleted"),
        (status = 404, description = "Notice not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_notice(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<NoticeId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Notices::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "notice".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List complaints
#[utoipa::path(
    get,
    path = "/complaints",
    tag = "operations",
    params(ListComplaintsQuery),
    responses(
        (status = 200, description = "List of complaints", body = Vec<ComplaintResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_complaints(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListComplaintsQuery>,
) -> Result<Json<Vec<ComplaintResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let complaints = Complaints::new(&mut conn)
        .list(&ComplaintFilter {
            student_id: query.student_id,
        })
        .await?;

    Ok(Json(complaints.into_iter().map(ComplaintResponse::from).collect()))
}

/// Get a complaint by id
#[utoipa::path(
    get,
    path = "/complaints/{id}",
    tag = "operations",
    responses(
        (status = 200, description = "Complaint found", body = ComplaintResponse),
        (status = 404, description = "Complaint not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_complaint(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<ComplaintId>,
) -> Result<Json<ComplaintResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let complaint = Complaints::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "complaint".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(ComplaintResponse::from(complaint)))
}

/// File a complaint
#[utoipa::path(
    post,
    path = "/complaints",
    request_body = ComplaintCreate,
    tag = "operations",
    responses(
        (status = 201, description = "Complaint filed", body = ComplaintResponse),
        (status = 400, description = "Invalid input"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_complaint(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(request): Json<ComplaintCreate>,
) -> Result<(StatusCode, Json<ComplaintResponse>), Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = Complaints::new(&mut conn)
        .create(&ComplaintCreateDBRequest {
            student_id: request.student_id,
            subject: request.subject,
            description: request.description,
            priority: request.priority,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ComplaintResponse::from(created))))
}

/// Update a complaint
///
/// Moving the status to RESOLVED or CLOSED stamps the resolver and the
/// resolution time from the current session. Reopening clears them.
#[utoipa::path(
    patch,
    path = "/complaints/{id}",
    request_body = ComplaintUpdate,
    tag = "operations",
    responses(
        (status = 200, description = "Complaint updated", body = ComplaintResponse),
        (status = 404, description = "Complaint not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_complaint(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ComplaintId>,
    Json(request): Json<ComplaintUpdate>,
) -> Result<Json<ComplaintResponse>, Error> {
    request.validate()?;

    let (resolved_by, resolved_at, clear_resolution) = match request.status {
        Some(ComplaintStatus::Resolved) | Some(ComplaintStatus::Closed) => {
            (Some(current_user.id), Some(chrono::Utc::now()), false)
        }
        Some(ComplaintStatus::Open) => (None, None, true),
        _ => (None, None, false),
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = Complaints::new(&mut conn)
        .update(
            id,
            &ComplaintUpdateDBRequest {
                subject: request.subject,
                description: request.description,
                status: request.status,
                priority: request.priority,
                resolution: request.resolution,
                resolved_by,
                resolved_at,
                clear_resolution,
            },
        )
        .await?;

    Ok(Json(ComplaintResponse::from(updated)))
}

/// Delete a complaint
#[utoipa::path(
    delete,
    path = "/complaints/{id}",
    tag = "operations",
    responses(
        (status = 204, description = "Complaint deleted"),
        (status = 404, description = "Complaint not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_complaint(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ComplaintId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Complaints::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "complaint".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List attendance records
#[utoipa::path(
    get,
    path = "/attendance",
    tag = "operations",
    params(ListAttendanceQuery),
    responses(
        (status = 200, description = "List of attendance records", body = Vec<AttendanceResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_attendance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListAttendanceQuery>,
) -> Result<Json<Vec<AttendanceResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let records = Attendance::new(&mut conn)
        .list(&AttendanceFilter {
            user_id: query.user_id,
            date: None,
        })
        .await?;

    Ok(Json(records.into_iter().map(AttendanceResponse::from).collect()))
}

/// Get an attendance record by id
#[utoipa::path(
    get,
    path = "/attendance/{id}",
    tag = "operations",
    responses(
        (status = 200, description = "Attendance record found", body = AttendanceResponse),
        (status = 404, description = "Attendance record not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_attendance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<AttendanceId>,
) -> Result<Json<AttendanceResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let record = Attendance::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "attendance record".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(AttendanceResponse::from(record)))
}

/// Record attendance for a user
#[utoipa::path(
    post,
    path = "/attendance",
    request_body = AttendanceCreate,
    tag = "operations",
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceResponse),
        (status = 409, description = "Day already recorded for this user"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_attendance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(request): Json<AttendanceCreate>,
) -> Result<(StatusCode, Json<AttendanceResponse>), Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = Attendance::new(&mut conn)
        .create(&AttendanceCreateDBRequest {
            user_id: request.user_id,
            date: request.date,
            status: request.status,
            check_in_time: request.check_in_time,
            check_out_time: request.check_out_time,
            remarks: request.remarks,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(AttendanceResponse::from(created))))
}

/// Update an attendance record
#[utoipa::path(
    patch,
    path = "/attendance/{id}",
    request_body = AttendanceUpdate,
    tag = "operations",
    responses(
        (status = 200, description = "Attendance updated", body = AttendanceResponse),
        (status = 404, description = "Attendance record not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_attendance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<AttendanceId>,
    Json(request): Json<AttendanceUpdate>,
) -> Result<Json<AttendanceResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = Attendance::new(&mut conn)
        .update(
            id,
            &AttendanceUpdateDBRequest {
                status: request.status,
                check_in_time: request.check_in_time,
                check_out_time: request.check_out_time,
                remarks: request.remarks,
            },
        )
        .await?;

    Ok(Json(AttendanceResponse::from(updated)))
}

/// Delete an attendance record
#[utoipa::path(
    delete,
    path = "/attendance/{id}",
    tag = "operations",
    responses(
        (status = 204, description = "Attendance record deleted"),
        (status = 404, description = "Attendance record not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_attendance(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<AttendanceId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Attendance::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "attendance record".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Record attendance for many users on one date
///
/// Entries that fail to parse are skipped; every valid entry is written in a
/// single transaction, merging into any rows already stored for that date.
/// The response lists the written records in input order.
#[utoipa::path(
    post,
    path = "/attendance/bulk",
    request_body = BulkAttendanceRequest,
    tag = "operations",
    responses(
        (status = 200, description = "Records written", body = Vec<AttendanceResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn bulk_attendance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(request): Json<BulkAttendanceRequest>,
) -> Result<Json<Vec<AttendanceResponse>>, Error> {
    let mut tx = state.db.begin().await.map_err(DbError::from)?;

    let mut written = Vec::new();
    for raw in request.entries {
        let Ok(entry) = serde_json::from_value::<BulkAttendanceEntry>(raw) else {
            continue;
        };
        let record = Attendance::new(&mut tx)
            .upsert_day(
                entry.user_id,
                request.date,
                &AttendanceUpdateDBRequest {
                    status: entry.status,
                    check_in_time: entry.check_in_time,
                    check_out_time: entry.check_out_time,
                    remarks: entry.remarks,
                },
            )
            .await?;
        written.push(AttendanceResponse::from(record));
    }

    tx.commit().await.map_err(DbError::from)?;

    Ok(Json(written))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{operations::AttendanceStatus, users::Role};
    use crate::test_utils::{create_test_app, create_test_user, login_as};
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_resolving_complaint_stamps_resolver(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let admin_cookie = login_as(&state, &admin);
        let student_cookie = login_as(&state, &student);

        let created_response = server
            .post("/api/complaints")
            .add_header(axum::http::header::COOKIE, student_cookie)
            .json(&serde_json::json!({
                "studentId": student.id,
                "subject": "Leaking tap",
                "description": "Tap in room 204 has been leaking for two days"
            }))
            .await;
        created_response.assert_status(axum::http::StatusCode::CREATED);
        let created: ComplaintResponse = created_response.json();
        assert_eq!(created.status, ComplaintStatus::Open);

        let resolved_response = server
            .patch(&format!("/api/complaints/{}", created.id))
            .add_header(axum::http::header::COOKIE, admin_cookie.clone())
            .json(&serde_json::json!({
                "status": "RESOLVED",
                "resolution": "Washer replaced"
            }))
            .await;
        resolved_response.assert_status_ok();
        let resolved: ComplaintResponse = resolved_response.json();
        assert_eq!(resolved.status, ComplaintStatus::Resolved);
        assert_eq!(resolved.resolved_by, Some(admin.id));
        assert!(resolved.resolved_at.is_some());
        assert_eq!(resolved.resolution.as_deref(), Some("Washer replaced"));

        let reopened_response = server
            .patch(&format!("/api/complaints/{}", created.id))
            .add_header(axum::http::header::COOKIE, admin_cookie)
            .json(&serde_json::json!({"status": "OPEN"}))
            .await;
        reopened_response.assert_status_ok();
        let reopened: ComplaintResponse = reopened_response.json();
        assert_eq!(reopened.status, ComplaintStatus::Open);
        assert_eq!(reopened.resolved_by, None);
        assert_eq!(reopened.resolved_at, None);
        assert_eq!(reopened.resolution, None);
    }

    #[sqlx::test]
    async fn test_re_resolving_keeps_first_stamp(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let first_admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let second_admin = create_test_user(&pool, "deputy@example.com", Role::Admin).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let first_cookie = login_as(&state, &first_admin);
        let second_cookie = login_as(&state, &second_admin);
        let student_cookie = login_as(&state, &student);

        let created: ComplaintResponse = server
            .post("/api/complaints")
            .add_header(axum::http::header::COOKIE, student_cookie)
            .json(&serde_json::json!({
                "studentId": student.id,
                "subject": "Broken window latch",
                "description": "Window in room 310 does not close"
            }))
            .await
            .json();

        let resolved: ComplaintResponse = server
            .patch(&format!("/api/complaints/{}", created.id))
            .add_header(axum::http::header::COOKIE, first_cookie)
            .json(&serde_json::json!({"status": "RESOLVED", "resolution": "Latch replaced"}))
            .await
            .json();
        assert_eq!(resolved.resolved_by, Some(first_admin.id));
        let first_stamp = resolved.resolved_at;

        // Closing an already-resolved complaint keeps the original stamp
        let closed: ComplaintResponse = server
            .patch(&format!("/api/complaints/{}", created.id))
            .add_header(axum::http::header::COOKIE, second_cookie)
            .json(&serde_json::json!({"status": "CLOSED"}))
            .await
            .json();
        assert_eq!(closed.status, ComplaintStatus::Closed);
        assert_eq!(closed.resolved_by, Some(first_admin.id));
        assert_eq!(closed.resolved_at, first_stamp);
    }

    #[sqlx::test]
    async fn test_get_complaint_by_id(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &student);

        let created: ComplaintResponse = server
            .post("/api/complaints")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({
                "studentId": student.id,
                "subject": "Noisy corridor",
                "description": "Late night noise on the second floor"
            }))
            .await
            .json();

        let response = server
            .get(&format!("/api/complaints/{}", created.id))
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .await;
        response.assert_status_ok();
        let found: ComplaintResponse = response.json();
        assert_eq!(found.id, created.id);
        assert_eq!(found.subject, "Noisy corridor");

        let missing = server
            .get(&format!("/api/complaints/{}", uuid::Uuid::new_v4()))
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        missing.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    async fn test_bulk_attendance_defaults_to_present(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let first = create_test_user(&pool, "first@example.com", Role::Student).await;
        let second = create_test_user(&pool, "second@example.com", Role::Student).await;
        let cookie = login_as(&state, &admin);

        let response = server
            .post("/api/attendance/bulk")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&serde_json::json!({
                "date": "2024-06-10",
                "entries": [
                    {"userId": first.id},
                    {"userId": second.id, "status": "LEAVE", "remarks": "Home visit"},
                    "garbage",
                ]
            }))
            .await;
        response.assert_status_ok();
        let written: Vec<AttendanceResponse> = response.json();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].status, AttendanceStatus::Present);
        assert_eq!(written[1].status, AttendanceStatus::Leave);
        assert_eq!(written[1].remarks.as_deref(), Some("Home visit"));
    }

    #[sqlx::test]
    async fn test_notice_created_by_admin(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let cookie = login_as(&state, &admin);

        let response = server
            .post("/api/notices")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&serde_json::json!({
                "title": "Water outage",
                "content": "No water supply on Saturday morning"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let notice: NoticeResponse = response.json();
        assert_eq!(notice.created_by, admin.id);
        assert!(notice.is_active);
        assert_eq!(notice.priority, "NORMAL");
    }

    #[sqlx::test]
    async fn test_student_cannot_publish_notice(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &student);

        let response = server
            .post("/api/notices")
            .add_header(axum::http::header::COOKIE, cookie)
            .json(&serde_json::json!({
                "title": "Party",
                "content": "Common room, 9pm"
            }))
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }
}
