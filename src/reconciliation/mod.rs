//! Balance reconciliation engine
//!
//! The engine is a single pure transformation over a [`Trip`] snapshot: it
//! replaces every member's derived fields (expected contribution, remaining
//! contribution, personal credit, expense share, balance) from the raw ledger
//! facts. It performs no I/O, retains no state between calls, and is
//! idempotent: recomputing an already-recomputed snapshot changes nothing.
//!
//! Callers mutate one ledger fact (add a member, log an expense, record a
//! contribution), invoke [`recompute`], and persist the result. The engine
//! never errors; it degrades by clamping out-of-range numbers to zero.

use bigdecimal::{BigDecimal, RoundingMode};

use crate::types::{ExpenseSplit, Payer, Trip};
use crate::utils::ids;

/// Recompute every member's derived fields in place.
///
/// Three passes: initialization (reset derived accumulators and distribute
/// the budget), expense allocation (rebuild `personal` and `expense_share`
/// from the expense list), finalization (remaining contribution, net
/// personal credit, rounded balance). Fields frozen by a `custom_*` flag are
/// left untouched.
pub fn recompute(trip: &mut Trip) {
    initialize_members(trip);
    allocate_expenses(trip);
    finalize_balances(trip);
}

/// Each member's even share of the budget, zero for an empty trip.
/// A negative budget is treated as zero.
pub fn expected_share(trip: &Trip) -> BigDecimal {
    let zero = BigDecimal::from(0);
    if trip.members.is_empty() {
        return zero;
    }
    let budget = if trip.budget < zero {
        zero
    } else {
        trip.budget.clone()
    };
    budget / BigDecimal::from(trip.members.len() as u64)
}

/// Round to two decimal places, half away from zero, to match currency
/// display at the cent boundary
pub fn round2(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(2, RoundingMode::HalfUp)
}

/// Pass 1: assign missing ids, distribute the budget into
/// `expected_contribution`, reset the accumulators rebuilt by pass 2, and
/// clamp negative paid-in figures
fn initialize_members(trip: &mut Trip) {
    let share = expected_share(trip);
    let zero = BigDecimal::from(0);
    for member in &mut trip.members {
        // Ids normally come from the identity collaborator before the engine
        // runs; the fallback is not collision-proof under high concurrency.
        if member.id.is_empty() {
            member.id = ids::fallback_id();
        }
        if !member.custom_expected {
            member.expected_contribution = share.clone();
        }
        if !member.custom_personal {
            member.personal = zero.clone();
        }
        if member.actual_contribution < zero {
            member.actual_contribution = zero.clone();
        }
        if member.reimbursed < zero {
            member.reimbursed = zero.clone();
        }
        member.expense_share = zero.clone();
    }
}

/// Pass 2: walk the expense list in order and rebuild each member's
/// `personal` (money fronted from pocket) and `expense_share` (owed portion
/// of split costs). Allocation is additive, so list order does not change
/// the sums, but iteration stays deterministic for testability.
fn allocate_expenses(trip: &mut Trip) {
    let zero = BigDecimal::from(0);
    let expenses = trip.expenses.clone();
    for expense in &expenses {
        if expense.amount <= zero {
            continue;
        }

        // A member who fronted the money is owed it back via `personal`,
        // unless they froze that field.
        if let Payer::Member(payer_id) = &expense.payer {
            if let Some(payer) = trip.member_mut(payer_id) {
                if !payer.custom_personal {
                    payer.personal += &expense.amount;
                }
            }
        }

        let share_set: Vec<String> = match &expense.split {
            ExpenseSplit::Among(ids) => ids.clone(),
            ExpenseSplit::AllMembers => trip.members.iter().map(|m| m.id.clone()).collect(),
            ExpenseSplit::PayerOnly => expense
                .payer
                .member_id()
                .map(|id| vec![id.to_string()])
                .unwrap_or_default(),
        };

        // An empty share set charges no one; the amount is absorbed without
        // allocation (accepted behavior, not silently repaired).
        if share_set.is_empty() {
            continue;
        }

        let per_head = &expense.amount / BigDecimal::from(share_set.len() as u64);
        for member_id in &share_set {
            // Ids that match no current member (e.g. a deleted member still
            // named in a split) are skipped.
            if let Some(member) = trip.member_mut(member_id) {
                member.expense_share += &per_head;
            }
        }
    }
}

/// Pass 3: derive `remaining_contribution`, clamp the residual personal
/// credit at zero, and set the rounded net balance unless frozen
fn finalize_balances(trip: &mut Trip) {
    let zero = BigDecimal::from(0);
    for member in &mut trip.members {
        member.remaining_contribution =
            if member.expected_contribution > member.actual_contribution {
                &member.expected_contribution - &member.actual_contribution
            } else {
                zero.clone()
            };

        // Over-reimbursement clamps to zero rather than producing a negative
        // credit.
        let net_personal = if member.personal > member.reimbursed {
            &member.personal - &member.reimbursed
        } else {
            zero.clone()
        };

        if !member.custom_balance {
            let raw = &member.actual_contribution + &net_personal - &member.expense_share;
            member.balance = round2(&raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Expense, ExpenseCategory, Member, NewExpense};
    use chrono::NaiveDate;

    fn member(id: &str, name: &str) -> Member {
        let mut m = Member::new(name.to_string());
        m.id = id.to_string();
        m
    }

    fn trip_with(budget: i64, members: Vec<Member>) -> Trip {
        let mut trip = Trip::new(
            "Test trip".to_string(),
            BigDecimal::from(budget),
            members.len() as u32,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            "1234".to_string(),
            "unused".to_string(),
        );
        trip.members = members;
        trip
    }

    fn expense(title: &str, amount: i64, payer: Payer, split: Option<Vec<&str>>) -> Expense {
        Expense::new(NewExpense {
            title: title.to_string(),
            amount: BigDecimal::from(amount),
            category: ExpenseCategory::Other,
            payer,
            split_between: split.map(|ids| ids.into_iter().map(str::to_string).collect()),
            description: None,
        })
    }

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(
            round2(&"2.005".parse().unwrap()),
            "2.01".parse::<BigDecimal>().unwrap()
        );
        assert_eq!(
            round2(&"-2.005".parse().unwrap()),
            "-2.01".parse::<BigDecimal>().unwrap()
        );
        assert_eq!(
            round2(&"2.004".parse().unwrap()),
            "2.00".parse::<BigDecimal>().unwrap()
        );
    }

    #[test]
    fn test_expected_share_empty_trip() {
        let trip = trip_with(30000, vec![]);
        assert_eq!(expected_share(&trip), BigDecimal::from(0));
    }

    #[test]
    fn test_expected_share_negative_budget_clamped() {
        let mut trip = trip_with(0, vec![member("a", "A"), member("b", "B")]);
        trip.budget = BigDecimal::from(-500);
        assert_eq!(expected_share(&trip), BigDecimal::from(0));
    }

    #[test]
    fn test_budget_distributed_evenly() {
        let mut trip = trip_with(30000, vec![member("a", "A"), member("b", "B"), member("c", "C")]);
        recompute(&mut trip);
        for m in &trip.members {
            assert_eq!(m.expected_contribution, BigDecimal::from(10000));
            assert_eq!(m.remaining_contribution, BigDecimal::from(10000));
        }
    }

    #[test]
    fn test_custom_expected_frozen() {
        let mut trip = trip_with(30000, vec![member("a", "A"), member("b", "B")]);
        trip.members[0].custom_expected = true;
        trip.members[0].expected_contribution = BigDecimal::from(20000);
        recompute(&mut trip);
        assert_eq!(trip.members[0].expected_contribution, BigDecimal::from(20000));
        assert_eq!(trip.members[1].expected_contribution, BigDecimal::from(15000));
    }

    #[test]
    fn test_pool_expense_splits_across_all_members() {
        let mut trip = trip_with(3000, vec![member("a", "A"), member("b", "B"), member("c", "C")]);
        trip.expenses.push(expense("Fuel", 300, Payer::Pool, None));
        recompute(&mut trip);
        for m in &trip.members {
            assert_eq!(m.expense_share, BigDecimal::from(100));
            // Pool-paid: no one's personal bucket grows.
            assert_eq!(m.personal, BigDecimal::from(0));
        }
    }

    #[test]
    fn test_member_paid_expense_without_split_absorbed_by_payer() {
        let mut trip = trip_with(0, vec![member("a", "A"), member("b", "B")]);
        trip.expenses
            .push(expense("Dinner", 80, Payer::Member("a".to_string()), None));
        recompute(&mut trip);
        assert_eq!(trip.members[0].personal, BigDecimal::from(80));
        assert_eq!(trip.members[0].expense_share, BigDecimal::from(80));
        assert_eq!(trip.members[1].expense_share, BigDecimal::from(0));
        assert_eq!(trip.members[1].personal, BigDecimal::from(0));
    }

    #[test]
    fn test_explicit_split_charges_only_named_members() {
        let mut trip = trip_with(0, vec![member("a", "A"), member("b", "B"), member("c", "C")]);
        trip.expenses.push(expense(
            "Tickets",
            90,
            Payer::Member("a".to_string()),
            Some(vec!["a", "b"]),
        ));
        recompute(&mut trip);
        assert_eq!(trip.members[0].expense_share, BigDecimal::from(45));
        assert_eq!(trip.members[1].expense_share, BigDecimal::from(45));
        assert_eq!(trip.members[2].expense_share, BigDecimal::from(0));
        assert_eq!(trip.members[0].personal, BigDecimal::from(90));
    }

    #[test]
    fn test_empty_split_set_charges_no_one() {
        let mut trip = trip_with(0, vec![member("a", "A"), member("b", "B")]);
        trip.expenses
            .push(expense("Orphaned", 500, Payer::Pool, Some(vec![])));
        recompute(&mut trip);
        for m in &trip.members {
            assert_eq!(m.expense_share, BigDecimal::from(0));
            assert_eq!(m.balance, round2(&BigDecimal::from(0)));
        }
    }

    #[test]
    fn test_unknown_split_member_skipped() {
        let mut trip = trip_with(0, vec![member("a", "A")]);
        trip.expenses.push(expense(
            "Stale split",
            60,
            Payer::Pool,
            Some(vec!["a", "gone"]),
        ));
        recompute(&mut trip);
        assert_eq!(trip.members[0].expense_share, BigDecimal::from(30));
    }

    #[test]
    fn test_custom_personal_suppresses_accrual_but_not_share() {
        let mut trip = trip_with(0, vec![member("a", "A"), member("b", "B")]);
        trip.members[0].custom_personal = true;
        trip.members[0].personal = BigDecimal::from(250);
        trip.expenses.push(expense(
            "Dinner",
            100,
            Payer::Member("a".to_string()),
            Some(vec!["a", "b"]),
        ));
        recompute(&mut trip);
        // Frozen personal keeps its manual value, but the share still accrues.
        assert_eq!(trip.members[0].personal, BigDecimal::from(250));
        assert_eq!(trip.members[0].expense_share, BigDecimal::from(50));
        assert_eq!(trip.members[1].expense_share, BigDecimal::from(50));
    }

    #[test]
    fn test_custom_balance_left_bit_for_bit() {
        let mut trip = trip_with(6000, vec![member("a", "A"), member("b", "B")]);
        trip.members[0].custom_balance = true;
        trip.members[0].balance = "123.456".parse().unwrap();
        trip.expenses.push(expense("Fuel", 90, Payer::Pool, None));
        recompute(&mut trip);
        assert_eq!(
            trip.members[0].balance,
            "123.456".parse::<BigDecimal>().unwrap()
        );
        // The unfrozen member still gets a recomputed balance.
        assert_eq!(trip.members[1].balance, round2(&BigDecimal::from(-45)));
    }

    #[test]
    fn test_over_reimbursement_clamps_net_personal() {
        let mut trip = trip_with(0, vec![member("a", "A")]);
        trip.expenses
            .push(expense("Dinner", 100, Payer::Member("a".to_string()), None));
        trip.members[0].reimbursed = BigDecimal::from(150);
        recompute(&mut trip);
        // balance = 0 paid-in + max(100 - 150, 0) - 100 share
        assert_eq!(trip.members[0].balance, round2(&BigDecimal::from(-100)));
    }

    #[test]
    fn test_negative_paid_in_clamped_to_zero() {
        let mut trip = trip_with(1000, vec![member("a", "A")]);
        trip.members[0].actual_contribution = BigDecimal::from(-50);
        trip.members[0].reimbursed = BigDecimal::from(-10);
        recompute(&mut trip);
        assert_eq!(trip.members[0].actual_contribution, BigDecimal::from(0));
        assert_eq!(trip.members[0].reimbursed, BigDecimal::from(0));
    }

    #[test]
    fn test_missing_member_id_synthesized() {
        let mut trip = trip_with(100, vec![member("", "Anon")]);
        recompute(&mut trip);
        assert!(!trip.members[0].id.is_empty());
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut trip = trip_with(
            30000,
            vec![member("a", "A"), member("b", "B"), member("c", "C")],
        );
        trip.members[0].actual_contribution = BigDecimal::from(5000);
        trip.members[1].actual_contribution = BigDecimal::from(3000);
        trip.expenses
            .push(expense("Hotel", 1200, Payer::Member("a".to_string()), Some(vec!["a", "b", "c"])));
        trip.expenses.push(expense("Fuel", 450, Payer::Pool, None));

        recompute(&mut trip);
        let once = trip.clone();
        recompute(&mut trip);
        assert_eq!(trip, once);
    }

    #[test]
    fn test_sum_of_expected_contributions_equals_budget() {
        let mut trip = trip_with(
            1000,
            vec![member("a", "A"), member("b", "B"), member("c", "C")],
        );
        recompute(&mut trip);
        let total: BigDecimal = trip
            .members
            .iter()
            .map(|m| m.expected_contribution.clone())
            .sum();
        let diff = (total - BigDecimal::from(1000)).abs();
        // Tolerance: 0.01 per member.
        assert!(diff <= "0.03".parse::<BigDecimal>().unwrap());
    }

    #[test]
    fn test_split_shares_sum_to_expense_amount() {
        let mut trip = trip_with(
            0,
            vec![
                member("a", "A"),
                member("b", "B"),
                member("c", "C"),
                member("d", "D"),
                member("e", "E"),
                member("f", "F"),
                member("g", "G"),
            ],
        );
        trip.expenses.push(expense("Boat", 1000, Payer::Pool, None));
        recompute(&mut trip);
        let total: BigDecimal = trip.members.iter().map(|m| m.expense_share.clone()).sum();
        let diff = (total - BigDecimal::from(1000)).abs();
        assert!(diff <= "0.07".parse::<BigDecimal>().unwrap());
    }
}
