//! Expense processing: logging, approval queues, deletion

use crate::reconciliation::recompute;
use crate::traits::*;
use crate::types::*;

/// Expense manager for logging and resolving trip expenses
pub struct ExpenseManager<S: TripStorage> {
    pub(crate) storage: S,
    validator: Box<dyn ExpenseValidator>,
}

impl<S: TripStorage> ExpenseManager<S> {
    /// Create a new expense manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultExpenseValidator),
        }
    }

    /// Create a new expense manager with a custom validator
    pub fn with_validator(storage: S, validator: Box<dyn ExpenseValidator>) -> Self {
        Self { storage, validator }
    }

    async fn get_trip_required(&self, code: &str) -> TripResult<Trip> {
        self.storage
            .get_trip(code)
            .await?
            .ok_or_else(|| TripError::TripNotFound(code.to_string()))
    }

    /// A member-paid expense must name a current member; split ids are not
    /// checked here because the engine tolerates stale ones.
    fn validate_against_trip(&self, trip: &Trip, expense: &NewExpense) -> TripResult<()> {
        self.validator.validate_expense(expense)?;
        if let Some(payer_id) = expense.payer.member_id() {
            if trip.member(payer_id).is_none() {
                return Err(TripError::MemberNotFound(payer_id.to_string()));
            }
        }
        Ok(())
    }

    /// Log an expense directly (admin path)
    pub async fn add_expense(&mut self, code: &str, input: NewExpense) -> TripResult<Expense> {
        let mut trip = self.get_trip_required(code).await?;
        self.validate_against_trip(&trip, &input)?;

        let expense = Expense::new(input);
        trip.expenses.push(expense.clone());
        recompute(&mut trip);
        self.storage.update_trip(&trip).await?;

        Ok(expense)
    }

    /// File an expense request; the cost is not allocated until approval
    pub async fn request_expense(
        &mut self,
        code: &str,
        requested_by: Option<String>,
        input: NewExpense,
    ) -> TripResult<ExpenseRequest> {
        let mut trip = self.get_trip_required(code).await?;
        self.validator.validate_expense(&input)?;

        let request = ExpenseRequest::new(requested_by, input);
        trip.expense_requests.push(request.clone());
        self.storage.update_trip(&trip).await?;

        Ok(request)
    }

    /// Resolve an expense request. Approval promotes it to a logged expense
    /// and recomputes; rejection just consumes it.
    pub async fn approve_expense(
        &mut self,
        code: &str,
        request_id: &str,
        action: RequestAction,
    ) -> TripResult<Option<Expense>> {
        let mut trip = self.get_trip_required(code).await?;
        let index = trip
            .expense_requests
            .iter()
            .position(|r| r.id == request_id)
            .ok_or_else(|| TripError::RequestNotFound(request_id.to_string()))?;

        let expense = match action {
            RequestAction::Approve => {
                let input = trip.expense_requests[index].expense.clone();
                // The payer may have left since the request was filed; keep
                // the request pending so the admin can reject it instead.
                self.validate_against_trip(&trip, &input)?;
                trip.expense_requests.remove(index);
                let expense = Expense::new(input);
                trip.expenses.push(expense.clone());
                recompute(&mut trip);
                Some(expense)
            }
            RequestAction::Reject => {
                trip.expense_requests.remove(index);
                None
            }
        };

        self.storage.update_trip(&trip).await?;
        Ok(expense)
    }

    /// Delete a logged expense (admin path)
    pub async fn delete_expense(
        &mut self,
        code: &str,
        pin: &str,
        expense_id: &str,
    ) -> TripResult<()> {
        let mut trip = self.get_trip_required(code).await?;
        trip.verify_pin(pin)?;
        if trip.expense(expense_id).is_none() {
            return Err(TripError::ExpenseNotFound(expense_id.to_string()));
        }

        trip.expenses.retain(|e| e.id != expense_id);
        recompute(&mut trip);
        self.storage.update_trip(&trip).await
    }
}
