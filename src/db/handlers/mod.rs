//! Repositories over the Postgres tables.
//!
//! Each repository borrows a connection for its lifetime, so a handler can
//! run several repositories inside one transaction.

pub mod allocations;
pub mod finance;
pub mod housing;
pub mod meals;
pub mod operations;
pub mod payments;
pub mod repository;
pub mod stats;
pub mod system_config;
pub mod users;

pub use allocations::SeatAllocations;
pub use finance::{Expenses, Salaries, VendorPayments};
pub use housing::{Blocks, Rooms};
pub use meals::{MealRates, MealRecords};
pub use operations::{Attendance, Complaints, Notices};
pub use payments::StudentPayments;
pub use repository::Repository;
pub use stats::Stats;
pub use system_config::SystemConfig;
pub use users::Users;
