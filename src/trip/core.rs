//! Main trip service that coordinates members, expenses, and the budget

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::reconciliation::recompute;
use crate::traits::*;
use crate::trip::{ExpenseManager, MemberManager};
use crate::types::*;
use crate::utils::validation::{validate_budget, validate_display_name, validate_positive_amount};

/// Parameters for creating a new trip
pub struct NewTrip {
    pub name: String,
    pub budget: BigDecimal,
    pub target_member_count: u32,
    pub date: NaiveDate,
    pub admin_pin: String,
    pub admin_name: String,
}

/// Main trip service that orchestrates all ledger operations.
///
/// Every mutation loads the trip snapshot, applies one change, runs the
/// reconciliation engine, and persists the result. The storage backend is
/// responsible for serializing mutations per trip code.
pub struct TripService<S: TripStorage> {
    storage: S,
    member_manager: MemberManager<S>,
    expense_manager: ExpenseManager<S>,
}

impl<S: TripStorage + Clone> TripService<S> {
    /// Create a new trip service with the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            storage: storage.clone(),
            member_manager: MemberManager::new(storage.clone()),
            expense_manager: ExpenseManager::new(storage),
        }
    }

    /// Create a new trip service with custom validators
    pub fn with_validators(
        storage: S,
        member_validator: Box<dyn MemberValidator>,
        expense_validator: Box<dyn ExpenseValidator>,
    ) -> Self {
        Self {
            storage: storage.clone(),
            member_manager: MemberManager::with_validator(storage.clone(), member_validator),
            expense_manager: ExpenseManager::with_validator(storage, expense_validator),
        }
    }

    async fn get_trip_required(&self, code: &str) -> TripResult<Trip> {
        self.storage
            .get_trip(code)
            .await?
            .ok_or_else(|| TripError::TripNotFound(code.to_string()))
    }

    // Trip operations
    /// Create a new trip with the creator installed as administrator and
    /// first member
    pub async fn create_trip(&mut self, input: NewTrip) -> TripResult<Trip> {
        validate_display_name(&input.name)?;
        validate_display_name(&input.admin_name)?;
        validate_budget(&input.budget)?;

        let mut trip = Trip::new(
            input.name,
            input.budget,
            input.target_member_count,
            input.date,
            input.admin_pin,
            input.admin_name,
        );

        // Regenerate on the rare code collision with an existing trip.
        while self.storage.get_trip(&trip.code).await?.is_some() {
            trip.code = crate::utils::ids::new_trip_code();
        }

        recompute(&mut trip);
        self.storage.save_trip(&trip).await?;
        Ok(trip)
    }

    /// Load a trip by its join code
    pub async fn get_trip(&self, code: &str) -> TripResult<Trip> {
        self.get_trip_required(code).await
    }

    /// List all stored trips
    pub async fn list_trips(&self) -> TripResult<Vec<Trip>> {
        self.storage.list_trips().await
    }

    /// Delete a trip entirely (admin path)
    pub async fn delete_trip(&mut self, code: &str, pin: &str) -> TripResult<()> {
        let trip = self.get_trip_required(code).await?;
        trip.verify_pin(pin)?;
        self.storage.delete_trip(code).await
    }

    /// True if the given PIN matches the trip's admin secret
    pub async fn verify_pin(&self, code: &str, pin: &str) -> TripResult<bool> {
        let trip = self.get_trip_required(code).await?;
        Ok(trip.verify_pin(pin).is_ok())
    }

    // Budget operations
    /// Edit the budget and optionally the planned head count (admin path)
    pub async fn update_budget(
        &mut self,
        code: &str,
        pin: &str,
        budget: BigDecimal,
        target_member_count: Option<u32>,
    ) -> TripResult<()> {
        validate_budget(&budget)?;

        let mut trip = self.get_trip_required(code).await?;
        trip.verify_pin(pin)?;
        trip.budget = budget;
        if let Some(count) = target_member_count {
            trip.target_member_count = count;
        }
        recompute(&mut trip);
        self.storage.update_trip(&trip).await
    }

    /// File a budget-increase request; the budget is untouched until approval
    pub async fn request_budget_increase(
        &mut self,
        code: &str,
        member_id: &str,
        amount: BigDecimal,
        reason: Option<String>,
    ) -> TripResult<BudgetRequest> {
        validate_positive_amount(&amount)?;

        let mut trip = self.get_trip_required(code).await?;
        if trip.member(member_id).is_none() {
            return Err(TripError::MemberNotFound(member_id.to_string()));
        }

        let request = BudgetRequest::new(member_id.to_string(), amount, reason);
        trip.budget_requests.push(request.clone());
        self.storage.update_trip(&trip).await?;

        Ok(request)
    }

    /// Resolve a budget-increase request. Approval adds the requested amount
    /// to the budget and recomputes everyone's expected contribution.
    pub async fn approve_budget_increase(
        &mut self,
        code: &str,
        request_id: &str,
        action: RequestAction,
    ) -> TripResult<()> {
        let mut trip = self.get_trip_required(code).await?;
        let index = trip
            .budget_requests
            .iter()
            .position(|r| r.id == request_id)
            .ok_or_else(|| TripError::RequestNotFound(request_id.to_string()))?;
        let request = trip.budget_requests.remove(index);

        if action == RequestAction::Approve {
            trip.budget += &request.amount;
            recompute(&mut trip);
        }

        self.storage.update_trip(&trip).await
    }

    // Member operations
    /// Add a member directly (admin path)
    pub async fn add_member(&mut self, code: &str, pin: &str, name: String) -> TripResult<Member> {
        self.member_manager.add_member(code, pin, name).await
    }

    /// File a join request
    pub async fn request_join(&mut self, code: &str, name: String) -> TripResult<JoinRequest> {
        self.member_manager.request_join(code, name).await
    }

    /// Resolve a join request
    pub async fn approve_join(
        &mut self,
        code: &str,
        request_id: &str,
        action: RequestAction,
    ) -> TripResult<Option<Member>> {
        self.member_manager
            .approve_join(code, request_id, action)
            .await
    }

    /// Delete a member (admin path; never the administrator)
    pub async fn delete_member(&mut self, code: &str, pin: &str, member_id: &str) -> TripResult<()> {
        self.member_manager.delete_member(code, pin, member_id).await
    }

    /// File a member-deletion request
    pub async fn request_member_deletion(
        &mut self,
        code: &str,
        member_id: &str,
    ) -> TripResult<DeletionRequest> {
        self.member_manager
            .request_member_deletion(code, member_id)
            .await
    }

    /// Resolve a member-deletion request
    pub async fn approve_member_deletion(
        &mut self,
        code: &str,
        request_id: &str,
        action: RequestAction,
    ) -> TripResult<()> {
        self.member_manager
            .approve_member_deletion(code, request_id, action)
            .await
    }

    /// Record a contribution payment
    pub async fn record_contribution(
        &mut self,
        code: &str,
        member_id: &str,
        amount: BigDecimal,
    ) -> TripResult<()> {
        self.member_manager
            .record_contribution(code, member_id, amount)
            .await
    }

    /// File a contribution request
    pub async fn request_contribution(
        &mut self,
        code: &str,
        member_id: &str,
        amount: BigDecimal,
    ) -> TripResult<ContributionRequest> {
        self.member_manager
            .request_contribution(code, member_id, amount)
            .await
    }

    /// Resolve a contribution request
    pub async fn approve_contribution(
        &mut self,
        code: &str,
        request_id: &str,
        action: RequestAction,
    ) -> TripResult<()> {
        self.member_manager
            .approve_contribution(code, request_id, action)
            .await
    }

    /// Pay a member back for personal spending
    pub async fn reimburse(
        &mut self,
        code: &str,
        member_id: &str,
        amount: BigDecimal,
    ) -> TripResult<()> {
        self.member_manager.reimburse(code, member_id, amount).await
    }

    /// Return contributed money to a member
    pub async fn refund(
        &mut self,
        code: &str,
        member_id: &str,
        amount: BigDecimal,
    ) -> TripResult<()> {
        self.member_manager.refund(code, member_id, amount).await
    }

    // Expense operations
    /// Log an expense directly (admin path)
    pub async fn add_expense(&mut self, code: &str, input: NewExpense) -> TripResult<Expense> {
        self.expense_manager.add_expense(code, input).await
    }

    /// File an expense request
    pub async fn request_expense(
        &mut self,
        code: &str,
        requested_by: Option<String>,
        input: NewExpense,
    ) -> TripResult<ExpenseRequest> {
        self.expense_manager
            .request_expense(code, requested_by, input)
            .await
    }

    /// Resolve an expense request
    pub async fn approve_expense(
        &mut self,
        code: &str,
        request_id: &str,
        action: RequestAction,
    ) -> TripResult<Option<Expense>> {
        self.expense_manager
            .approve_expense(code, request_id, action)
            .await
    }

    /// Delete a logged expense (admin path)
    pub async fn delete_expense(
        &mut self,
        code: &str,
        pin: &str,
        expense_id: &str,
    ) -> TripResult<()> {
        self.expense_manager
            .delete_expense(code, pin, expense_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryTripStore;

    fn new_trip_input() -> NewTrip {
        NewTrip {
            name: "Goa trip".to_string(),
            budget: BigDecimal::from(30000),
            target_member_count: 6,
            date: NaiveDate::from_ymd_opt(2025, 12, 20).unwrap(),
            admin_pin: "4321".to_string(),
            admin_name: "Asha".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_trip_installs_admin_as_first_member() {
        let storage = MemoryTripStore::new();
        let mut service = TripService::new(storage);

        let trip = service.create_trip(new_trip_input()).await.unwrap();

        assert_eq!(trip.members.len(), 1);
        assert_eq!(trip.members[0].name, "Asha");
        assert_eq!(trip.code.len(), 6);
        assert_eq!(
            trip.members[0].expected_contribution,
            BigDecimal::from(30000)
        );
    }

    #[tokio::test]
    async fn test_admin_pin_guards_budget_edit() {
        let storage = MemoryTripStore::new();
        let mut service = TripService::new(storage);
        let trip = service.create_trip(new_trip_input()).await.unwrap();

        let denied = service
            .update_budget(&trip.code, "wrong", BigDecimal::from(40000), None)
            .await;
        assert!(matches!(denied, Err(TripError::Forbidden(_))));

        service
            .update_budget(&trip.code, "4321", BigDecimal::from(40000), Some(8))
            .await
            .unwrap();
        let updated = service.get_trip(&trip.code).await.unwrap();
        assert_eq!(updated.budget, BigDecimal::from(40000));
        assert_eq!(updated.target_member_count, 8);
    }

    #[tokio::test]
    async fn test_budget_increase_request_is_inert_until_approved() {
        let storage = MemoryTripStore::new();
        let mut service = TripService::new(storage);
        let trip = service.create_trip(new_trip_input()).await.unwrap();
        let admin_id = trip.members[0].id.clone();

        let request = service
            .request_budget_increase(&trip.code, &admin_id, BigDecimal::from(5000), None)
            .await
            .unwrap();

        let pending = service.get_trip(&trip.code).await.unwrap();
        assert_eq!(pending.budget, BigDecimal::from(30000));
        assert_eq!(pending.budget_requests.len(), 1);

        service
            .approve_budget_increase(&trip.code, &request.id, RequestAction::Approve)
            .await
            .unwrap();

        let resolved = service.get_trip(&trip.code).await.unwrap();
        assert_eq!(resolved.budget, BigDecimal::from(35000));
        assert!(resolved.budget_requests.is_empty());
    }

    #[tokio::test]
    async fn test_missing_trip_is_not_found() {
        let storage = MemoryTripStore::new();
        let service = TripService::new(storage);
        let result = service.get_trip("NOPE42").await;
        assert!(matches!(result, Err(TripError::TripNotFound(_))));
    }
}
