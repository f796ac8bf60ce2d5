//! OpenAPI documentation configuration.
//!
//! Defines the OpenAPI document for the `/api/*` surface. Interactive documentation is
//! served at `/docs` via Scalar.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};

use crate::api;

/// Session cookie security scheme.
struct SessionSecurityAddon;

impl Modify for SessionSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "session_token".to_string(),
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    "hostelctl_session",
                    "Session cookie set by POST /api/auth/login.",
                ))),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/api", description = "Hostel management API")
    ),
    modifiers(&SessionSecurityAddon),
    paths(
        // Authentication
        api::handlers::auth::login,
        api::handlers::auth::logout,
        api::handlers::auth::me,
        // Users
        api::handlers::users::list_users,
        api::handlers::users::create_user,
        api::handlers::users::get_user,
        api::handlers::users::update_user,
        api::handlers::users::delete_user,
        api::handlers::users::list_students,
        api::handlers::users::list_employees,
        // Housing
        api::handlers::housing::list_blocks,
        api::handlers::housing::get_block,
        api::handlers::housing::create_block,
        api::handlers::housing::update_block,
        api::handlers::housing::delete_block,
        api::handlers::housing::list_rooms,
        api::handlers::housing::get_room,
        api::handlers::housing::create_room,
        api::handlers::housing::update_room,
        api::handlers::housing::delete_room,
        // Seat allocations
        api::handlers::allocations::list_allocations,
        api::handlers::allocations::list_allocations_for_student,
        api::handlers::allocations::create_allocation,
        api::handlers::allocations::update_allocation,
        api::handlers::allocations::delete_allocation,
        // Student payments
        api::handlers::payments::list_payments,
        api::handlers::payments::get_payment,
        api::handlers::payments::create_payment,
        api::handlers::payments::update_payment,
        api::handlers::payments::delete_payment,
        // Finance
        api::handlers::finance::list_vendor_payments,
        api::handlers::finance::get_vendor_payment,
        api::handlers::finance::create_vendor_payment,
        api::handlers::finance::update_vendor_payment,
        api::handlers::finance::delete_vendor_payment,
        api::handlers::finance::list_expenses,
        api::handlers::finance::get_expense,
        api::handlers::finance::create_expense,
        api::handlers::finance::update_expense,
        api::handlers::finance::delete_expense,
        api::handlers::finance::list_salaries,
        api::handlers::finance::get_salary,
        api::handlers::finance::create_salary,
        api::handlers::finance::update_salary,
        api::handlers::finance::delete_salary,
        // Mess
        api::handlers::meals::list_meal_rates,
        api::handlers::meals::get_meal_rate,
        api::handlers::meals::create_meal_rate,
        api::handlers::meals::update_meal_rate,
        api::handlers::meals::delete_meal_rate,
        api::handlers::meals::list_meal_records,
        api::handlers::meals::get_meal_record,
        api::handlers::meals::create_meal_record,
        api::handlers::meals::update_meal_record,
        api::handlers::meals::delete_meal_record,
        api::handlers::meals::bulk_meal_records,
        // Operations
        api::handlers::operations::list_notices,
        api::handlers::operations::get_notice,
        api::handlers::operations::create_notice,
        api::handlers::operations::update_notice,
        api::handlers::operations::delete_notice,
        api::handlers::operations::list_complaints,
        api::handlers::operations::get_complaint,
        api::handlers::operations::create_complaint,
        api::handlers::operations::update_complaint,
        api::handlers::operations::delete_complaint,
        api::handlers::operations::list_attendance,
        api::handlers::operations::get_attendance,
        api::handlers::operations::create_attendance,
        api::handlers::operations::update_attendance,
        api::handlers::operations::delete_attendance,
        api::handlers::operations::bulk_attendance,
        // System configuration
        api::handlers::system_config::list_config,
        api::handlers::system_config::get_config,
        api::handlers::system_config::create_config,
        api::handlers::system_config::update_config,
        api::handlers::system_config::delete_config,
        // Read side
        api::handlers::stats::dashboard,
        api::handlers::stats::meal_costs,
    ),
    components(schemas(
        api::models::auth::LoginRequest,
        api::models::auth::AuthResponse,
        api::models::auth::AuthSuccessResponse,
        api::models::auth::MeResponse,
        api::models::users::Role,
        api::models::users::UserCreate,
        api::models::users::UserUpdate,
        api::models::users::UserResponse,
        api::models::users::CurrentUser,
        api::models::housing::RoomType,
        api::models::housing::BlockCreate,
        api::models::housing::BlockUpdate,
        api::models::housing::BlockResponse,
        api::models::housing::RoomCreate,
        api::models::housing::RoomUpdate,
        api::models::housing::RoomResponse,
        api::models::allocations::AllocationCreate,
        api::models::allocations::AllocationUpdate,
        api::models::allocations::AllocationResponse,
        api::models::payments::PaymentStatus,
        api::models::payments::PaymentCreate,
        api::models::payments::PaymentUpdate,
        api::models::payments::PaymentResponse,
        api::models::finance::VendorPaymentCreate,
        api::models::finance::VendorPaymentUpdate,
        api::models::finance::VendorPaymentResponse,
        api::models::finance::ExpenseCreate,
        api::models::finance::ExpenseUpdate,
        api::models::finance::ExpenseResponse,
        api::models::finance::SalaryCreate,
        api::models::finance::SalaryUpdate,
        api::models::finance::SalaryResponse,
        api::models::meals::MealType,
        api::models::meals::MealRateCreate,
        api::models::meals::MealRateUpdate,
        api::models::meals::MealRateResponse,
        api::models::meals::MealRecordCreate,
        api::models::meals::MealRecordUpdate,
        api::models::meals::MealRecordResponse,
        api::models::meals::BulkMealEntry,
        api::models::meals::BulkMealRequest,
        api::models::operations::ComplaintStatus,
        api::models::operations::AttendanceStatus,
        api::models::operations::NoticeVisibility,
        api::models::operations::NoticeCreate,
        api::models::operations::NoticeUpdate,
        api::models::operations::NoticeResponse,
        api::models::operations::ComplaintCreate,
        api::models::operations::ComplaintUpdate,
        api::models::operations::ComplaintResponse,
        api::models::operations::AttendanceCreate,
        api::models::operations::AttendanceUpdate,
        api::models::operations::AttendanceResponse,
        api::models::operations::BulkAttendanceEntry,
        api::models::operations::BulkAttendanceRequest,
        api::models::system_config::ConfigCreate,
        api::models::system_config::ConfigUpdate,
        api::models::system_config::ConfigResponse,
        api::models::stats::DashboardStats,
        api::models::stats::MealCostResponse,
    )),
    tags(
        (name = "auth", description = "Session authentication"),
        (name = "users", description = "User accounts and role-scoped listings"),
        (name = "housing", description = "Blocks and rooms"),
        (name = "allocations", description = "Seat allocations"),
        (name = "payments", description = "Student fee payments"),
        (name = "finance", description = "Vendor payments, expenses, salaries"),
        (name = "meals", description = "Meal rates and daily records"),
        (name = "operations", description = "Notices, complaints, attendance"),
        (name = "system-config", description = "Keyed configuration entries"),
        (name = "stats", description = "Read-side aggregations"),
    )
)]
pub struct ApiDoc;
