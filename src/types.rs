//! Core types and data structures for the trip ledger

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::utils::ids;

/// Expense categories used for grouping and display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    /// Meals, groceries, snacks
    Food,
    /// Fuel, tickets, taxis
    Transport,
    /// Hotels, rentals, camp sites
    Accommodation,
    /// Entry fees, tours, rentals
    Activity,
    /// Souvenirs and other purchases
    Shopping,
    /// Anything that does not fit the above
    Other,
}

/// Who fronted the money for an expense
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Payer {
    /// Paid from collectively contributed funds, not one member's pocket
    Pool,
    /// Paid out-of-pocket by the member with this id
    Member(String),
}

impl Payer {
    /// Returns the paying member's id, if any
    pub fn member_id(&self) -> Option<&str> {
        match self {
            Payer::Pool => None,
            Payer::Member(id) => Some(id),
        }
    }
}

/// How an expense's cost is divided among members.
///
/// The interpretation of the legacy `paidBy`/`splitBetween` combination is
/// resolved once, when the expense is created, so the reconciliation engine
/// never has to re-derive it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseSplit {
    /// Explicit set of member ids sharing the cost. An empty set allocates
    /// the cost to no one (accepted permissive behavior, not repaired).
    Among(Vec<String>),
    /// Split evenly across every member present at recompute time
    AllMembers,
    /// The paying member absorbs the full cost
    PayerOnly,
}

/// One member of a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Unique identifier within the trip
    pub id: String,
    /// Display name
    pub name: String,
    /// Target share of the trip budget; derived unless `custom_expected`
    pub expected_contribution: BigDecimal,
    /// Cumulative money paid toward the budget
    pub actual_contribution: BigDecimal,
    /// Out-of-pocket spend on shared expenses, pending reimbursement;
    /// rebuilt by the engine unless `custom_personal`
    pub personal: BigDecimal,
    /// Cumulative money paid back for personal spending
    pub reimbursed: BigDecimal,
    /// Derived: what is still owed toward the expected contribution
    pub remaining_contribution: BigDecimal,
    /// Derived: owed portion of split expenses, regardless of who fronted
    pub expense_share: BigDecimal,
    /// Derived net position; frozen when `custom_balance`
    pub balance: BigDecimal,
    /// Freezes `expected_contribution` against recomputation
    pub custom_expected: bool,
    /// Freezes `personal` against recomputation
    pub custom_personal: bool,
    /// Freezes `balance` against recomputation
    pub custom_balance: bool,
    /// Last time this member's ledger facts were touched
    pub last_active: Option<NaiveDateTime>,
}

impl Member {
    /// Create a new member with zeroed ledger fields
    pub fn new(name: String) -> Self {
        Self {
            id: ids::new_id(),
            name,
            expected_contribution: BigDecimal::from(0),
            actual_contribution: BigDecimal::from(0),
            personal: BigDecimal::from(0),
            reimbursed: BigDecimal::from(0),
            remaining_contribution: BigDecimal::from(0),
            expense_share: BigDecimal::from(0),
            balance: BigDecimal::from(0),
            custom_expected: false,
            custom_personal: false,
            custom_balance: false,
            last_active: None,
        }
    }

    /// Stamp the member as active now
    pub fn touch(&mut self) {
        self.last_active = Some(chrono::Utc::now().naive_utc());
    }
}

/// Input model for creating an expense, directly or via a pending request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub amount: BigDecimal,
    pub category: ExpenseCategory,
    pub payer: Payer,
    /// Explicit share set; `None` falls back to the legacy interpretation
    pub split_between: Option<Vec<String>>,
    pub description: Option<String>,
}

/// One logged expense belonging to a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier within the trip
    pub id: String,
    pub title: String,
    /// Positive currency amount
    pub amount: BigDecimal,
    pub category: ExpenseCategory,
    pub payer: Payer,
    pub split: ExpenseSplit,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Expense {
    /// Create an expense, resolving the split interpretation at write time:
    /// an explicit share set is used verbatim (even when empty, which charges
    /// no one); otherwise a pool-paid expense splits across all members and a
    /// member-paid one is absorbed by the payer.
    pub fn new(input: NewExpense) -> Self {
        let split = match input.split_between {
            Some(ids) => ExpenseSplit::Among(ids),
            None => match input.payer {
                Payer::Pool => ExpenseSplit::AllMembers,
                Payer::Member(_) => ExpenseSplit::PayerOnly,
            },
        };
        Self {
            id: ids::new_id(),
            title: input.title,
            amount: input.amount,
            category: input.category,
            payer: input.payer,
            split,
            description: input.description,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Whether to accept or discard a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestAction {
    Approve,
    Reject,
}

/// Pending request to join a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

impl JoinRequest {
    pub fn new(name: String) -> Self {
        Self {
            id: ids::new_id(),
            name,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Pending request to log an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRequest {
    pub id: String,
    /// Member who filed the request, when known
    pub requested_by: Option<String>,
    pub expense: NewExpense,
    pub created_at: NaiveDateTime,
}

impl ExpenseRequest {
    pub fn new(requested_by: Option<String>, expense: NewExpense) -> Self {
        Self {
            id: ids::new_id(),
            requested_by,
            expense,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Pending request to record a contribution payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionRequest {
    pub id: String,
    pub member_id: String,
    pub amount: BigDecimal,
    pub created_at: NaiveDateTime,
}

impl ContributionRequest {
    pub fn new(member_id: String, amount: BigDecimal) -> Self {
        Self {
            id: ids::new_id(),
            member_id,
            amount,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Pending request to raise the trip budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRequest {
    pub id: String,
    pub member_id: String,
    pub amount: BigDecimal,
    pub reason: Option<String>,
    pub created_at: NaiveDateTime,
}

impl BudgetRequest {
    pub fn new(member_id: String, amount: BigDecimal, reason: Option<String>) -> Self {
        Self {
            id: ids::new_id(),
            member_id,
            amount,
            reason,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Pending request to remove a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionRequest {
    pub id: String,
    pub member_id: String,
    pub created_at: NaiveDateTime,
}

impl DeletionRequest {
    pub fn new(member_id: String) -> Self {
        Self {
            id: ids::new_id(),
            member_id,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Aggregate root: one shared-budget trip with its members, expenses, and
/// pending approval queues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Unique 6-character alphanumeric join code
    pub code: String,
    /// Display name
    pub name: String,
    /// Total collective budget, non-negative
    pub budget: BigDecimal,
    /// Planned head count; informational, the budget is shared across the
    /// actual member list
    pub target_member_count: u32,
    /// Date of the trip
    pub date: NaiveDate,
    /// Admin secret checked by admin-only mutations
    pub admin_pin: String,
    /// Members; index 0 is always the administrator
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub join_requests: Vec<JoinRequest>,
    pub expense_requests: Vec<ExpenseRequest>,
    pub contribution_requests: Vec<ContributionRequest>,
    pub budget_requests: Vec<BudgetRequest>,
    pub deletion_requests: Vec<DeletionRequest>,
    pub created_at: NaiveDateTime,
}

impl Trip {
    /// Create a new trip with a generated join code and the administrator
    /// installed as the first member
    pub fn new(
        name: String,
        budget: BigDecimal,
        target_member_count: u32,
        date: NaiveDate,
        admin_pin: String,
        admin_name: String,
    ) -> Self {
        Self {
            code: ids::new_trip_code(),
            name,
            budget,
            target_member_count,
            date,
            admin_pin,
            members: vec![Member::new(admin_name)],
            expenses: Vec::new(),
            join_requests: Vec::new(),
            expense_requests: Vec::new(),
            contribution_requests: Vec::new(),
            budget_requests: Vec::new(),
            deletion_requests: Vec::new(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// The administrator is always the first member
    pub fn admin(&self) -> Option<&Member> {
        self.members.first()
    }

    /// Find a member by id
    pub fn member(&self, member_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Find a member by id, mutably
    pub fn member_mut(&mut self, member_id: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == member_id)
    }

    /// Find an expense by id
    pub fn expense(&self, expense_id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == expense_id)
    }

    /// True if the member id names the administrator (first member)
    pub fn is_admin(&self, member_id: &str) -> bool {
        self.members.first().is_some_and(|m| m.id == member_id)
    }

    /// Check the admin secret before an admin-only mutation
    pub fn verify_pin(&self, pin: &str) -> TripResult<()> {
        if self.admin_pin == pin {
            Ok(())
        } else {
            Err(TripError::Forbidden(
                "Admin PIN does not match".to_string(),
            ))
        }
    }
}

/// Errors that can occur in the trip ledger system
#[derive(Debug, thiserror::Error)]
pub enum TripError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Trip not found: {0}")]
    TripNotFound(String),
    #[error("Member not found: {0}")]
    MemberNotFound(String),
    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),
    #[error("Request not found: {0}")]
    RequestNotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for trip ledger operations
pub type TripResult<T> = Result<T, TripError>;
