//! Test utilities for integration testing.

use std::sync::OnceLock;

use axum_test::TestServer;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    AppState,
    api::models::users::Role,
    auth::{SessionStore, password},
    config::Config,
    db::{
        handlers::{Blocks, Repository, Rooms, Users},
        models::{
            housing::{BlockCreateDBRequest, BlockDBResponse, RoomCreateDBRequest, RoomDBResponse},
            users::{UserCreateDBRequest, UserDBResponse},
        },
    },
    types::BlockId,
};

/// Password shared by every test user, so login tests can authenticate.
pub const TEST_PASSWORD: &str = "password123";

/// Argon2 is deliberately slow; hash the shared test password once.
fn test_password_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| password::hash_string(TEST_PASSWORD).expect("Failed to hash test password"))
        .clone()
}

pub fn create_test_config() -> Config {
    Config {
        admin_email: "warden@example.com".to_string(),
        ..Config::default()
    }
}

pub fn create_test_app_state(pool: PgPool) -> AppState {
    AppState {
        db: pool,
        config: create_test_config(),
        sessions: SessionStore::new(),
    }
}

/// Build a test server over the full router with the given pool.
pub async fn create_test_app(pool: PgPool) -> (TestServer, AppState) {
    let state = create_test_app_state(pool);
    let server = TestServer::new(crate::build_router(state.clone()).into_make_service()).expect("Failed to create test server");
    (server, state)
}

/// Session cookie header value for the given user, minting a fresh token.
pub fn login_as(state: &AppState, user: &UserDBResponse) -> String {
    let token = state.sessions.create(user.id);
    format!("{}={}", state.config.auth.cookie_name, token)
}

pub fn create_user_request(email: &str, role: Role) -> UserCreateDBRequest {
    UserCreateDBRequest {
        name: email.split('@').next().unwrap_or("test user").to_string(),
        email: email.to_string(),
        password_hash: test_password_hash(),
        phone: None,
        address: None,
        guardian_name: None,
        guardian_phone: None,
        date_of_birth: None,
        joining_date: None,
        role,
        is_active: true,
    }
}

pub async fn create_test_user(pool: &PgPool, email: &str, role: Role) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Users::new(&mut conn)
        .create(&create_user_request(email, role))
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_block(pool: &PgPool, name: &str) -> BlockDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Blocks::new(&mut conn)
        .create(&BlockCreateDBRequest {
            name: name.to_string(),
            description: None,
            floor_count: 2,
        })
        .await
        .expect("Failed to create test block")
}

pub async fn create_test_room(pool: &PgPool, block_id: BlockId, room_number: &str) -> RoomDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Rooms::new(&mut conn)
        .create(&RoomCreateDBRequest {
            block_id,
            room_number: room_number.to_string(),
            capacity: 4,
            room_type: crate::api::models::housing::RoomType::NonAc,
            floor: 1,
            monthly_rent: Decimal::new(450000, 2),
        })
        .await
        .expect("Failed to create test room")
}
