//! Hostel management control service.
//!
//! hostelctl is the backend for a hostel: it tracks residents and staff,
//! blocks and rooms, seat allocations, fee and vendor payments, mess rates
//! and daily meal records, attendance, notices, and complaints. Everything
//! is exposed as a JSON REST API under `/api`, authenticated with session
//! cookies and gated by a two-role model (admins manage, students mostly
//! read and submit).
//!
//! # Architecture
//!
//! - **[`api`]**: Axum handlers and request/response models
//! - **[`db`]**: Repositories over PostgreSQL (sqlx) and their row models
//! - **[`auth`]**: Password hashing, the in-memory session store, and the
//!   request extractors that enforce authentication and the admin gate
//! - **[`config`]**: YAML + environment configuration via figment
//!
//! # Startup
//!
//! [`Application::new`] connects to PostgreSQL, runs migrations, seeds the
//! initial admin user, and builds the router. [`Application::serve`] binds
//! the listener and runs until the shutdown future resolves.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    api::models::users::Role,
    auth::{SessionStore, password},
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    openapi::ApiDoc,
};

pub use config::Config;
pub use types::UserId;

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool
/// - `config`: Application configuration loaded from environment/files
/// - `sessions`: In-memory session token store; tokens do not survive restarts
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub sessions: SessionStore,
}

/// Get the hostelctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// This function is idempotent - it will create a new admin user if one
/// doesn't exist, or update the password if the user already exists. It is
/// called during application startup so there is always an admin available.
///
/// When no password is configured and the user has to be created, a random
/// throwaway password is set and a warning is logged; set `admin_password`
/// (or `HOSTELCTL_ADMIN_PASSWORD`) to be able to log in.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> Result<UserId, sqlx::Error> {
    let password_hash = if let Some(pwd) = password {
        Some(
            password::hash_string(pwd)
                .map_err(|e| sqlx::Error::Encode(format!("Failed to hash admin password: {e}").into()))?,
        )
    } else {
        None
    };

    // Use a transaction to ensure atomicity
    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    // Check if user already exists
    if let Some(existing_user) = user_repo
        .get_by_email(email)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to check existing user: {e}")))?
    {
        // User exists - update password if provided
        if let Some(password_hash) = password_hash {
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE email = $2")
                .bind(password_hash)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let password_hash = match password_hash {
        Some(hash) => hash,
        None => {
            warn!("No admin_password configured; creating admin user '{email}' with an unusable password");
            password::hash_string(&password::generate_session_token())
                .map_err(|e| sqlx::Error::Encode(format!("Failed to hash placeholder password: {e}").into()))?
        }
    };

    let user_create = UserCreateDBRequest {
        name: "Administrator".to_string(),
        email: email.to_string(),
        password_hash,
        phone: None,
        address: None,
        guardian_name: None,
        guardian_phone: None,
        date_of_birth: None,
        joining_date: None,
        role: Role::SuperAdmin,
        is_active: true,
    };

    let created_user = user_repo
        .create(&user_create)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to create admin user: {e}")))?;

    tx.commit().await?;
    Ok(created_user.id)
}

/// Build the main application router with all endpoints and middleware.
///
/// Routes are nested under `/api`; the health check and the interactive API
/// documentation sit at the root. Authorization is enforced per handler via
/// the [`auth`] extractors, not per route group, so the matrix below is
/// descriptive:
///
/// - `POST /api/auth/login`, `POST /api/auth/logout`: open
/// - `GET /api/stats/*`, reads of housing/meals/notices: any session
/// - User management, finance, and all housing/meals/notice mutations: admin
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Authentication
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/logout", post(api::handlers::auth::logout))
        .route("/auth/me", get(api::handlers::auth::me))
        // User management
        .route("/users", get(api::handlers::users::list_users))
        .route("/users", post(api::handlers::users::create_user))
        .route("/users/{id}", get(api::handlers::users::get_user))
        .route("/users/{id}", patch(api::handlers::users::update_user))
        .route("/users/{id}", delete(api::handlers::users::delete_user))
        .route("/students", get(api::handlers::users::list_students))
        .route("/employees", get(api::handlers::users::list_employees))
        // Housing
        .route("/blocks", get(api::handlers::housing::list_blocks))
        .route("/blocks", post(api::handlers::housing::create_block))
        .route("/blocks/{id}", get(api::handlers::housing::get_block))
        .route("/blocks/{id}", patch(api::handlers::housing::update_block))
        .route("/blocks/{id}", delete(api::handlers::housing::delete_block))
        .route("/rooms", get(api::handlers::housing::list_rooms))
        .route("/rooms", post(api::handlers::housing::create_room))
        .route("/rooms/{id}", get(api::handlers::housing::get_room))
        .route("/rooms/{id}", patch(api::handlers::housing::update_room))
        .route("/rooms/{id}", delete(api::handlers::housing::delete_room))
        // Seat allocations
        .route("/seat-allocations", get(api::handlers::allocations::list_allocations))
        .route("/seat-allocations", post(api::handlers::allocations::create_allocation))
        .route(
            "/seat-allocations/student/{student_id}",
            get(api::handlers::allocations::list_allocations_for_student),
        )
        .route("/seat-allocations/{id}", patch(api::handlers::allocations::update_allocation))
        .route("/seat-allocations/{id}", delete(api::handlers::allocations::delete_allocation))
        // Student payments
        .route("/student-payments", get(api::handlers::payments::list_payments))
        .route("/student-payments", post(api::handlers::payments::create_payment))
        .route("/student-payments/{id}", get(api::handlers::payments::get_payment))
        .route("/student-payments/{id}", patch(api::handlers::payments::update_payment))
        .route("/student-payments/{id}", delete(api::handlers::payments::delete_payment))
        // Finance
        .route("/vendor-payments", get(api::handlers::finance::list_vendor_payments))
        .route("/vendor-payments", post(api::handlers::finance::create_vendor_payment))
        .route("/vendor-payments/{id}", get(api::handlers::finance::get_vendor_payment))
        .route("/vendor-payments/{id}", patch(api::handlers::finance::update_vendor_payment))
        .route("/vendor-payments/{id}", delete(api::handlers::finance::delete_vendor_payment))
        .route("/expenses", get(api::handlers::finance::list_expenses))
        .route("/expenses", post(api::handlers::finance::create_expense))
        .route("/expenses/{id}", get(api::handlers::finance::get_expense))
        .route("/expenses/{id}", patch(api::handlers::finance::update_expense))
        .route("/expenses/{id}", delete(api::handlers::finance::delete_expense))
        .route("/salaries", get(api::handlers::finance::list_salaries))
        .route("/salaries", post(api::handlers::finance::create_salary))
        .route("/salaries/{id}", get(api::handlers::finance::get_salary))
        .route("/salaries/{id}", patch(api::handlers::finance::update_salary))
        .route("/salaries/{id}", delete(api::handlers::finance::delete_salary))
        // Mess
        .route("/meal-rates", get(api::handlers::meals::list_meal_rates))
        .route("/meal-rates", post(api::handlers::meals::create_meal_rate))
        .route("/meal-rates/{id}", get(api::handlers::meals::get_meal_rate))
        .route("/meal-rates/{id}", patch(api::handlers::meals::update_meal_rate))
        .route("/meal-rates/{id}", delete(api::handlers::meals::delete_meal_rate))
        .route("/meal-records", get(api::handlers::meals::list_meal_records))
        .route("/meal-records", post(api::handlers::meals::create_meal_record))
        .route("/meal-records/bulk", post(api::handlers::meals::bulk_meal_records))
        .route("/meal-records/{id}", get(api::handlers::meals::get_meal_record))
        .route("/meal-records/{id}", patch(api::handlers::meals::update_meal_record))
        .route("/meal-records/{id}", delete(api::handlers::meals::delete_meal_record))
        // Operations
        .route("/notices", get(api::handlers::operations::list_notices))
        .route("/notices", post(api::handlers::operations::create_notice))
        .route("/notices/{id}", get(api::handlers::operations::get_notice))
        .route("/notices/{id}", patch(api::handlers::operations::update_notice))
        .route("/notices/{id}", delete(api::handlers::operations::delete_notice))
        .route("/complaints", get(api::handlers::operations::list_complaints))
        .route("/complaints", post(api::handlers::operations::create_complaint))
        .route("/complaints/{id}", get(api::handlers::operations::get_complaint))
        .route("/complaints/{id}", patch(api::handlers::operations::update_complaint))
        .route("/complaints/{id}", delete(api::handlers::operations::delete_complaint))
        .route("/attendance", get(api::handlers::operations::list_attendance))
        .route("/attendance", post(api::handlers::operations::create_attendance))
        .route("/attendance/bulk", post(api::handlers::operations::bulk_attendance))
        .route("/attendance/{id}", get(api::handlers::operations::get_attendance))
        .route("/attendance/{id}", patch(api::handlers::operations::update_attendance))
        .route("/attendance/{id}", delete(api::handlers::operations::delete_attendance))
        // System configuration
        .route("/system-config", get(api::handlers::system_config::list_config))
        .route("/system-config", post(api::handlers::system_config::create_config))
        .route("/system-config/{key}", get(api::handlers::system_config::get_config))
        .route("/system-config/{key}", patch(api::handlers::system_config::update_config))
        .route("/system-config/{key}", delete(api::handlers::system_config::delete_config))
        // Read side
        .route("/stats/dashboard", get(api::handlers::stats::dashboard))
        .route("/stats/meal-costs", get(api::handlers::stats::meal_costs))
        .with_state(state);

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    router
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// The assembled application.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, seeds the admin user, and builds the router
/// 2. **Serve**: [`Application::serve`] binds a TCP listener and handles
///    requests until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting hostelctl with configuration: {:#?}", config);

        config.validate().map_err(|e| anyhow::anyhow!("{e}"))?;

        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(config.database_url().map_err(|e| anyhow::anyhow!("{e}"))?)
            .await?;

        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {}", e))?;

        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
            sessions: SessionStore::new(),
        };
        let router = build_router(state);

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "hostelctl listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{TEST_PASSWORD, create_test_app, create_test_user, login_as};
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_healthz(pool: PgPool) {
        let (server, _state) = create_test_app(pool).await;

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    #[sqlx::test]
    async fn test_unauthenticated_requests_rejected(pool: PgPool) {
        let (server, _state) = create_test_app(pool).await;

        let response = server.get("/api/users").await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test]
    async fn test_create_initial_admin_user_new_user(pool: PgPool) {
        let user_id = create_initial_admin_user("warden@example.com", Some("hunter2hunter2"), &pool)
            .await
            .expect("Failed to create admin user");

        let mut conn = pool.acquire().await.unwrap();
        let user = Users::new(&mut conn)
            .get_by_email("warden@example.com")
            .await
            .unwrap()
            .expect("admin user should exist");
        assert_eq!(user.id, user_id);
        assert_eq!(user.role, Role::SuperAdmin);
        assert!(user.is_active);
    }

    #[sqlx::test]
    async fn test_create_initial_admin_user_idempotent(pool: PgPool) {
        let first = create_initial_admin_user("warden@example.com", Some("hunter2hunter2"), &pool)
            .await
            .unwrap();
        let second = create_initial_admin_user("warden@example.com", Some("different-password"), &pool)
            .await
            .unwrap();
        assert_eq!(first, second);

        // Second call updated the password
        let mut conn = pool.acquire().await.unwrap();
        let user = Users::new(&mut conn).get_by_email("warden@example.com").await.unwrap().unwrap();
        assert!(password::verify_string("different-password", &user.password_hash).unwrap());
    }

    #[sqlx::test]
    async fn test_login_then_call_protected_route(pool: PgPool) {
        let (server, _state) = create_test_app(pool.clone()).await;
        create_test_user(&pool, "warden@example.com", Role::Admin).await;

        let login_response = server
            .post("/api/auth/login")
            .json(&serde_json::json!({
                "email": "warden@example.com",
                "password": TEST_PASSWORD
            }))
            .await;
        login_response.assert_status_ok();
        let cookie_header = login_response
            .headers()
            .get(axum::http::header::SET_COOKIE)
            .expect("login should set a session cookie")
            .to_str()
            .unwrap()
            .to_string();
        let cookie = cookie_header.split(';').next().unwrap().to_string();

        let users_response = server
            .get("/api/users")
            .add_header(axum::http::header::COOKIE, cookie)
            .await;
        users_response.assert_status_ok();
    }

    #[sqlx::test]
    async fn test_docs_served(pool: PgPool) {
        let (server, _state) = create_test_app(pool).await;

        let response = server.get("/docs").await;
        response.assert_status_ok();
    }

    #[sqlx::test]
    async fn test_logout_revokes_session(pool: PgPool) {
        let (server, state) = create_test_app(pool.clone()).await;
        let admin = create_test_user(&pool, "warden@example.com", Role::Admin).await;
        let cookie = login_as(&state, &admin);

        server
            .post("/api/auth/logout")
            .add_header(axum::http::header::COOKIE, cookie.clone())
            .await
            .assert_status_ok();

        server
            .get("/api/users")
            .add_header(axum::http::header::COOKIE, cookie)
            .await
            .assert_status(axum::http::StatusCode::UNAUTHORIZED);
    }
}
