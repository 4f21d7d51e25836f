//! Traits for storage abstraction and extensibility

use async_trait::async_trait;

use crate::types::*;

/// Storage abstraction for trip snapshots
///
/// This trait allows the ledger core to work with any storage backend
/// (file store, document database, in-memory, etc.) by implementing these
/// methods. Implementations must serialize mutations per trip code: the
/// read-modify-recompute-write cycle assumes at most one in-flight mutation
/// per trip, or concurrent writers will silently lose updates.
#[async_trait]
pub trait TripStorage: Send + Sync {
    /// Save a new trip snapshot
    async fn save_trip(&mut self, trip: &Trip) -> TripResult<()>;

    /// Load a trip snapshot by its join code
    async fn get_trip(&self, code: &str) -> TripResult<Option<Trip>>;

    /// List all stored trips
    async fn list_trips(&self) -> TripResult<Vec<Trip>>;

    /// Replace an existing trip snapshot
    async fn update_trip(&mut self, trip: &Trip) -> TripResult<()>;

    /// Delete a trip by its join code
    async fn delete_trip(&mut self, code: &str) -> TripResult<()>;
}

/// Trait for implementing custom member validation rules
pub trait MemberValidator: Send + Sync {
    /// Validate a member name before creating or approving a member
    fn validate_member_name(&self, name: &str) -> TripResult<()>;

    /// Validate member deletion; the administrator (first member) must never
    /// pass this check
    fn validate_member_deletion(&self, trip: &Trip, member_id: &str) -> TripResult<()>;
}

/// Trait for implementing custom expense validation rules
pub trait ExpenseValidator: Send + Sync {
    /// Validate an expense before logging it or queueing it for approval
    fn validate_expense(&self, expense: &NewExpense) -> TripResult<()>;
}

/// Default member validator with the core safety rules
pub struct DefaultMemberValidator;

impl MemberValidator for DefaultMemberValidator {
    fn validate_member_name(&self, name: &str) -> TripResult<()> {
        if name.trim().is_empty() {
            return Err(TripError::InvalidInput(
                "Member name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_member_deletion(&self, trip: &Trip, member_id: &str) -> TripResult<()> {
        if trip.is_admin(member_id) {
            return Err(TripError::Forbidden(
                "The trip administrator cannot be deleted".to_string(),
            ));
        }
        if trip.member(member_id).is_none() {
            return Err(TripError::MemberNotFound(member_id.to_string()));
        }
        Ok(())
    }
}

/// Default expense validator with basic rules
pub struct DefaultExpenseValidator;

impl ExpenseValidator for DefaultExpenseValidator {
    fn validate_expense(&self, expense: &NewExpense) -> TripResult<()> {
        if expense.title.trim().is_empty() {
            return Err(TripError::InvalidInput(
                "Expense title cannot be empty".to_string(),
            ));
        }
        if expense.amount <= bigdecimal::BigDecimal::from(0) {
            return Err(TripError::InvalidInput(
                "Expense amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
