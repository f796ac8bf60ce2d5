use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::finance::{
        ExpenseCreate, ExpenseResponse, ExpenseUpdate, ListSalariesQuery, SalaryCreate,
        SalaryResponse, SalaryUpdate, VendorPaymentCreate, VendorPaymentResponse,
        VendorPaymentUpdate,
    },
    auth::RequireAdmin,
    db::{
        errors::DbError,
        handlers::{Expenses, Repository, Salaries, VendorPayments, finance::SalaryFilter},
        models::finance::{
            ExpenseCreateDBRequest, ExpenseUpdateDBRequest, SalaryCreateDBRequest,
            SalaryUpdateDBRequest, VendorPaymentCreateDBRequest, VendorPaymentUpdateDBRequest,
        },
    },
    errors::Error,
    types::{ExpenseId, SalaryId, VendorPaymentId},
};

/// List vendor payments
#[utoipa::path(
    get,
    path = "/vendor-payments",
    tag = "finance",
    responses(
        (status = 200, description = "List of vendor payments", body = Vec<VendorPaymentResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_vendor_payments(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<VendorPaymentResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let payments = VendorPayments::new(&mut conn).list(&()).await?;

    Ok(Json(payments.into_iter().map(VendorPaymentResponse::from).collect()))
}

/// Get a vendor payment by id
#[utoipa::path(
    get,
    path = "/vendor-payments/{id}",
    tag = "finance",
    responses(
        (status = 200, description = "Vendor payment found", body = VendorPaymentResponse),
        (status = 404, description = "Vendor payment not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_vendor_payment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<VendorPaymentId>,
) -> Result<Json<VendorPaymentResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let payment = VendorPayments::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "vendor payment".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(VendorPaymentResponse::from(payment)))
}

/// Record a vendor payment
#[utoipa::path(
    post,
    path = "/vendor-payments",
    request_body = VendorPaymentCreate,
    tag = "finance",
    responses(
        (status = 201, description = "Vendor payment recorded", body = VendorPaymentResponse),
        (status = 400, description = "Invalid input"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_vendor_payment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<VendorPaymentCreate>,
) -> Result<(StatusCode, Json<VendorPaymentResponse>), Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = VendorPayments::new(&mut conn)
        .create(&VendorPaymentCreateDBRequest {
            vendor_name: request.vendor_name,
            amount: request.amount,
            purpose: request.purpose,
            payment_date: request.payment_date,
            payment_method: request.payment_method,
            invoice_number: request.invoice_number,
            remarks: request.remarks,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(VendorPaymentResponse::from(created))))
}

/// Update a vendor payment
#[utoipa::path(
    patch,
    path = "/vendor-payments/{id}",
    request_body = VendorPaymentUpdate,
    tag = "finance",
    responses(
        (status = 200, description = "Vendor payment updated", body = VendorPaymentResponse),
        (status = 404, description = "Vendor payment not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_vendor_payment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<VendorPaymentId>,
    Json(request): Json<VendorPaymentUpdate>,
) -> Result<Json<VendorPaymentResponse>, Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = VendorPayments::new(&mut conn)
        .update(
            id,
            &VendorPaymentUpdateDBRequest {
                vendor_name: request.vendor_name,
                amount: request.amount,
                purpose: request.purpose,
                payment_date: request.payment_date,
                payment_method: request.payment_method,
                invoice_number: request.invoice_number,
                remarks: request.remarks,
            },
        )
        .await?;

    Ok(Json(VendorPaymentResponse::from(updated)))
}

/// Delete a vendor payment
#[utoipa::path(
    delete,
    path = "/vendor-payments/{id}",
    tag = "finance",
    responses(
        (status = 204, description = "Vendor payment deleted"),
        (status = 404, description = "Vendor payment not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_vendor_payment(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<VendorPaymentId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = VendorPayments::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "vendor payment".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List expenses
#[utoipa::path(
    get,
    path = "/expenses",
    tag = "finance",
    responses(
        (status = 200, description = "List of expenses", body = Vec<ExpenseResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_expenses(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<ExpenseResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let expenses = Expenses::new(&mut conn).list(&()).await?;

    Ok(Json(expenses.into_iter().map(ExpenseResponse::from).collect()))
}

/// Get an expense by id
#[utoipa::path(
    get,
    path = "/expenses/{id}",
    tag = "finance",
    responses(
        (status = 200, description = "Expense found", body = ExpenseResponse),
        (status = 404, description = "Expense not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_expense(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ExpenseId>,
) -> Result<Json<ExpenseResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let expense = Expenses::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "expense".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(ExpenseResponse::from(expense)))
}

/// Record an expense
#[utoipa::path(
    post,
    path = "/expenses",
    request_body = ExpenseCreate,
    tag = "finance",
    responses(
        (status = 201, description = "Expense recorded", body = ExpenseResponse),
        (status = 400, description = "Invalid input"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_expense(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<ExpenseCreate>,
) -> Result<(StatusCode, Json<ExpenseResponse>), Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = Expenses::new(&mut conn)
        .create(&ExpenseCreateDBRequest {
            category: request.category,
            description: request.description,
            amount: request.amount,
            expense_date: request.expense_date,
            paid_by: request.paid_by,
            receipt_number: request.receipt_number,
            remarks: request.remarks,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ExpenseResponse::from(created))))
}

/// Update an expense
#[utoipa::path(
    patch,
    path = "/expenses/{id}",
    request_body = ExpenseUpdate,
    tag = "finance",
    responses(
        (status = 200, description = "Expense updated", body = ExpenseResponse),
        (status = 404, description = "Expense not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_expense(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ExpenseId>,
    Json(request): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseResponse>, Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = Expenses::new(&mut conn)
        .update(
            id,
            &ExpenseUpdateDBRequest {
                category: request.category,
                description: request.description,
                amount: request.amount,
                expense_date: request.expense_date,
                paid_by: request.paid_by,
                receipt_number: request.receipt_number,
                remarks: request.remarks,
            },
        )
        .await?;

    Ok(Json(ExpenseResponse::from(updated)))
}

/// Delete an expense
#[utoipa::path(
    delete,
    path = "/expenses/{id}",
    tag = "finance",
    responses(
        (status = 204, description = "Expense deleted"),
        (status = 404, description = "Expense not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_expense(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ExpenseId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Expenses::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "expense".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

/// List salary payments
#[utoipa::path(
    get,
    path = "/salaries",
    tag = "finance",
    params(ListSalariesQuery),
    responses(
        (status = 200, description = "List of salary payments", body = Vec<SalaryResponse>),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_salaries(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<ListSalariesQuery>,
) -> Result<Json<Vec<SalaryResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let salaries = Salaries::new(&mut conn)
        .list(&SalaryFilter {
            employee_id: query.employee_id,
        })
        .await?;

    Ok(Json(salaries.into_iter().map(SalaryResponse::from).collect()))
}

/// Get a salary payment by id
#[utoipa::path(
    get,
    path = "/salaries/{id}",
    tag = "finance",
    responses(
        (status = 200, description = "Salary payment found", body = SalaryResponse),
        (status = 404, description = "Salary payment not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_salary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<SalaryId>,
) -> Result<Json<SalaryResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let salary = Salaries::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "salary payment".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(SalaryResponse::from(salary)))
}

/// Record a salary payment
#[utoipa::path(
    post,
    path = "/salaries",
    request_body = SalaryCreate,
    tag = "finance",
    responses(
        (status = 201, description = "Salary payment recorded", body = SalaryResponse),
        (status = 400, description = "Invalid input"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_salary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(request): Json<SalaryCreate>,
) -> Result<(StatusCode, Json<SalaryResponse>), Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let created = Salaries::new(&mut conn)
        .create(&SalaryCreateDBRequest {
            employee_id: request.employee_id,
            amount: request.amount,
            month: request.month,
            year: request.year,
            payment_date: request.payment_date,
            payment_method: request.payment_method,
            bonus: request.bonus,
            deductions: request.deductions,
            remarks: request.remarks,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(SalaryResponse::from(created))))
}

/// Update a salary payment
#[utoipa::path(
    patch,
    path = "/salaries/{id}",
    request_body = SalaryUpdate,
    tag = "finance",
    responses(
        (status = 200, description = "Salary payment updated", body = SalaryResponse),
        (status = 404, description = "Salary payment not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_salary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<SalaryId>,
    Json(request): Json<SalaryUpdate>,
) -> Result<Json<SalaryResponse>, Error> {
    request.validate()?;

    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let updated = Salaries::new(&mut conn)
        .update(
            id,
            &SalaryUpdateDBRequest {
                amount: request.amount,
                month: request.month,
                year: request.year,
                payment_date: request.payment_date,
                payment_method: request.payment_method,
                bonus: request.bonus,
                deductions: request.deductions,
                remarks: request.remarks,
            },
        )
        .await?;

    Ok(Json(SalaryResponse::from(updated)))
}

/// Delete a salary payment
#[utoipa::path(
    delete,
    path = "/salaries/{id}",
    tag = "finance",
    responses(
        (status = 204, description = "Salary payment deleted"),
        (status = 404, description = "Salary payment not found"),
    ),
    security(("session_token" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_salary(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<SalaryId>,
) -> Result<StatusCode, Error> {
    let mut conn = state.db.acquire().await.map_err(DbError::from)?;
    let deleted = Salaries::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "salary".to_string(),
            id: id.to_string(),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_user, login_as};
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_expense_lifecycle(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let cookie = login_as(&state, &admin);

        let created_response = server
            .post("/api/expenses")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({
                "category": "MAINTENANCE",
                "description": "Water pump repair",
                "amount": "1250.00",
                "expenseDate": "2024-06-10"
            }))
            .await;
        created_response.assert_status(axum::http::StatusCode::CREATED);
        let created: ExpenseResponse = created_response.json();

        let updated_response = server
            .patch(&format!("/api/expenses/{}", created.id))
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .json(&serde_json::json!({"amount": "1400.00"}))
            .await;
        updated_response.assert_status_ok();
        let updated: ExpenseResponse = updated_response.json();
        assert_eq!(updated.amount.to_string(), "1400.00");
        assert_eq!(updated.description, "Water pump repair");

        let delete_response = server
            .delete(&format!("/api/expenses/{}", created.id))
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .await;
        delete_response.assert_status(axum::http::StatusCode::NO_CONTENT);

        let list_response = server
            .get("/api/expenses")
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        let remaining: Vec<ExpenseResponse> = list_response.json();
        assert!(remaining.is_empty());
    }

    #[sqlx::test]
    async fn test_get_expense_by_id_admin_only(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let admin_cookie = login_as(&state, &admin);
        let student_cookie = login_as(&state, &student);

        let created: ExpenseResponse = server
            .post("/api/expenses")
            .add_header(axum::http::header::COOKIE, admin_cookie.clone())
            .json(&serde_json::json!({
                "category": "UTILITIES",
                "description": "Electricity bill",
                "amount": "8200.00",
                "expenseDate": "2024-06-01"
            }))
            .await
            .json();

        let response = server
            .get(&format!("/api/expenses/{}", created.id))
            .add_header(axum::http::header::COOKIE, admin_cookie)
            .await;
        response.assert_status_ok();
        let found: ExpenseResponse = response.json();
        assert_eq!(found.id, created.id);
        assert_eq!(found.amount.to_string(), "8200.00");

        let forbidden = server
            .get(&format!("/api/expenses/{}", created.id))
            .add_header(axum::http::header::COOKIE, student_cookie)
            .await;
        forbidden.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    async fn test_salaries_filter_by_employee(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let cook = create_test_user(&pool, "cook@example.com", Role::Employee).await;
        let cleaner = create_test_user(&pool, "cleaner@example.com", Role::Employee).await;
        let cookie = login_as(&state, &admin);

        for employee in [&cook, &cleaner] {
            let response = server
                .post("/api/salaries")
                .add_header(axum::http::header::COOKIE, cookie.clone())
                .json(&serde_json::json!({
                    "employeeId": employee.id,
                    "amount": "15000.00",
                    "month": 6,
                    "year": 2024,
                    "paymentDate": "2024-06-30"
                }))
                .await;
            response.assert_status(axum::http::StatusCode::CREATED);
        }

        let filtered_response = server
            .get(&format!("/api/salaries?employeeId={}", cook.id))
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        filtered_response.assert_status_ok();
        let filtered: Vec<SalaryResponse> = filtered_response.json();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].employee_id, cook.id);
        assert_eq!(filtered[0].bonus.to_string(), "0.00");
    }

    #[sqlx::test]
    async fn test_finance_routes_require_admin(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let student = create_test_user(&pool, "resident@example.com", Role::Student).await;
        let cookie = login_as(&state, &student);

        let response = server
            .get("/api/vendor-payments")
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }
}
