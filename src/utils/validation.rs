//! Validation utilities

use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> TripResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(TripError::InvalidInput(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a budget is non-negative
pub fn validate_budget(budget: &BigDecimal) -> TripResult<()> {
    if *budget < BigDecimal::from(0) {
        Err(TripError::InvalidInput(
            "Budget cannot be negative".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a trip join code is well formed
pub fn validate_trip_code(code: &str) -> TripResult<()> {
    if code.len() != crate::utils::ids::TRIP_CODE_LEN {
        return Err(TripError::InvalidInput(format!(
            "Trip code must be {} characters",
            crate::utils::ids::TRIP_CODE_LEN
        )));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(TripError::InvalidInput(
            "Trip code can only contain alphanumeric characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that a trip or member display name is valid
pub fn validate_display_name(name: &str) -> TripResult<()> {
    if name.trim().is_empty() {
        return Err(TripError::InvalidInput("Name cannot be empty".to_string()));
    }

    if name.len() > 100 {
        return Err(TripError::InvalidInput(
            "Name cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Enhanced expense validator with detailed checks
pub struct EnhancedExpenseValidator;

impl ExpenseValidator for EnhancedExpenseValidator {
    fn validate_expense(&self, expense: &NewExpense) -> TripResult<()> {
        // Basic validation
        DefaultExpenseValidator.validate_expense(expense)?;

        if expense.title.len() > 100 {
            return Err(TripError::InvalidInput(
                "Expense title cannot exceed 100 characters".to_string(),
            ));
        }

        if let Some(description) = &expense.description {
            if description.len() > 500 {
                return Err(TripError::InvalidInput(
                    "Expense description cannot exceed 500 characters".to_string(),
                ));
            }
        }

        // Duplicate ids in an explicit split would double-charge a member
        if let Some(split) = &expense.split_between {
            let mut seen = std::collections::HashSet::new();
            for member_id in split {
                if !seen.insert(member_id) {
                    return Err(TripError::InvalidInput(format!(
                        "Member '{}' appears multiple times in the split",
                        member_id
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Enhanced member validator with detailed checks
pub struct EnhancedMemberValidator;

impl MemberValidator for EnhancedMemberValidator {
    fn validate_member_name(&self, name: &str) -> TripResult<()> {
        validate_display_name(name)
    }

    fn validate_member_deletion(&self, trip: &Trip, member_id: &str) -> TripResult<()> {
        DefaultMemberValidator.validate_member_deletion(trip, member_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExpenseCategory, Payer};

    #[test]
    fn test_positive_amount() {
        assert!(validate_positive_amount(&BigDecimal::from(1)).is_ok());
        assert!(validate_positive_amount(&BigDecimal::from(0)).is_err());
        assert!(validate_positive_amount(&BigDecimal::from(-5)).is_err());
    }

    #[test]
    fn test_trip_code_shape() {
        assert!(validate_trip_code("AB12CD").is_ok());
        assert!(validate_trip_code("AB12C").is_err());
        assert!(validate_trip_code("AB-2CD").is_err());
    }

    #[test]
    fn test_duplicate_split_member_rejected() {
        let expense = NewExpense {
            title: "Dinner".to_string(),
            amount: BigDecimal::from(100),
            category: ExpenseCategory::Food,
            payer: Payer::Pool,
            split_between: Some(vec!["a".to_string(), "a".to_string()]),
            description: None,
        };
        assert!(EnhancedExpenseValidator.validate_expense(&expense).is_err());
    }
}
