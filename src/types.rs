//! Shared identifier types and small helpers.
//!
//! All entity IDs are UUIDs behind type aliases so signatures say what they
//! take without the cost of newtype plumbing through sqlx.

use uuid::Uuid;

pub type UserId = Uuid;
pub type BlockId = Uuid;
pub type RoomId = Uuid;
pub type AllocationId = Uuid;
pub type PaymentId = Uuid;
pub type VendorPaymentId = Uuid;
pub type ExpenseId = Uuid;
pub type SalaryId = Uuid;
pub type MealRateId = Uuid;
pub type MealRecordId = Uuid;
pub type NoticeId = Uuid;
pub type ComplaintId = Uuid;
pub type AttendanceId = Uuid;
pub type ConfigId = Uuid;

/// Short form of a UUID for log fields.
pub fn abbrev_uuid(id: &Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let id = Uuid::new_v4();
        let short = abbrev_uuid(&id);
        assert_eq!(short.len(), 8);
        assert!(id.to_string().starts_with(&short));
    }
}
