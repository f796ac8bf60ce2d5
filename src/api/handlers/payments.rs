use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        payments::{ListPaymentsQuery, PaymentCreate, PaymentResponse, PaymentStatus, PaymentUpdate},
        users::CurrentUser,
    },
    auth::RequireAdmin,
    db::{
        errors::DbError,
        handlers::{Repository, StudentPayments, payments::PaymentFilter},
        models::payments::{PaymentCreateDBRequest, PaymentUpdateDBRequest},
    },
    errors::Error,
    types::PaymentId,
};

/// List student payments
#[utoipa::path(
    get,
    path = "/student-payments",
    tag = "payments",
    params(ListPaymentsQuery),
    responses(
        (status = 200, description = "List of payments", body = Vec<PaymentResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_payments(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<Vec<PaymentResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let payments = StudentPayments::new(&mut conn)
        .list(&PaymentFilter {
            student_id: query.student_id,
        })
        .await?;

    Ok(Json(payments.into_iter().map(PaymentResponse::from).collect()))
}

/// Get a payment by id
#[utoipa::path(
    get,
    path = "/student-payments/{id}",
    tag = "payments",
    responses(
        (status = 200, description = "Payment found", body = PaymentResponse),
        (status = 404, description = "Payment not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_payment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<PaymentId>,
) -> Result<Json<PaymentResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let payment = StudentPayments::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "payment".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(PaymentResponse::from(payment)))
}

/// Record a student payment
#[utoipa::path(
    post,
    path = "/student-payments",
    request_body = PaymentCreate,
    tag = "payments",
    responses(
        (status = 201, description = "Payment recorded", body = PaymentResponse),
        (status = 400, description = "Invalid input"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_payment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(request): Json<PaymentCreate>,
) -> Result<(StatusCode, Json<PaymentResponse>), Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = StudentPayments::new(&mut conn)
        .create(&PaymentCreateDBRequest {
            student_id: request.student_id,
            amount: request.amount,
            payment_type: request.payment_type,
            payment_method: request.payment_method,
            month: request.month,
            year: request.year,
            transaction_id: request.transaction_id,
            remarks: request.remarks,
            paid_date: request.paid_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentResponse::from(created))))
}

/// Update a payment
///
/// Transitioning the status to APPROVED stamps the approver and the approval
/// time from the current session.
#[utoipa::path(
    patch,
    path = "/student-payments/{id}",
    request_body = PaymentUpdate,
    tag = "payments",
    responses(
        (status = 200, description = "Payment updated", body = PaymentResponse),
        (status = 404, description = "Payment not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<PaymentId>,
    Json(request): Json<PaymentUpdate>,
) -> Result<Json<PaymentResponse>, Error> {
    request.validate()?;

    let (approved_by, approved_date) = if request.status == Some(PaymentStatus::Approved) {
        (Some(current_user.id), Some(chrono::Utc::now()))
    } else {
        (None, None)
    };

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = StudentPayments::new(&mut conn)
        .update(
            id,
            &PaymentUpdateDBRequest {
                amount: request.amount,
                payment_type: request.payment_type,
                payment_method: request.payment_method,
                status: request.status,
                month: request.month,
                year: request.year,
                transaction_id: request.transaction_id,
                remarks: request.remarks,
                paid_date: request.paid_date,
                approved_by,
                approved_date,
            },
        )
        .await?;

    Ok(Json(PaymentResponse::from(updated)))
}

/// Delete a payment
#[utoipa::path(
    delete,
    path = "/student-payments/{id}",
    tag = "payments",
    responses(
        (status = 204, description = "Payment deleted"),
        (status = 404, description = "Payment not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_payment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<PaymentId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = StudentPayments::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "payment".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}
