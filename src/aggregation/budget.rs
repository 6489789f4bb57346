//! Monthly budget usage and the over-budget alert.

use serde::Serialize;
use time::Date;

use crate::{Error, Transaction, aggregation::current_month_expense};

/// How much of the monthly budget has been spent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BudgetUsage {
    /// No budget is set (the stored budget is zero).
    Unset,
    /// A budget is set.
    Set(BudgetStatus),
}

/// Spending measured against a monthly budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetStatus {
    /// The monthly budget, always greater than zero.
    pub budget: f64,
    /// The expenses recorded this month.
    pub spent: f64,
    /// The share of the budget spent, capped at 100.
    pub percent: f64,
    /// The budget minus the amount spent. Negative once the budget is exceeded.
    pub remaining: f64,
    /// Whether more than the budget has been spent.
    pub exceeded: bool,
}

impl BudgetUsage {
    /// Measure `spent` against `budget`.
    ///
    /// A `budget` of zero or less means no budget is set.
    pub fn from_spent(budget: f64, spent: f64) -> Self {
        if budget <= 0.0 {
            return BudgetUsage::Unset;
        }

        BudgetUsage::Set(BudgetStatus {
            budget,
            spent,
            percent: (100.0 * spent / budget).min(100.0),
            remaining: budget - spent,
            exceeded: spent > budget,
        })
    }

    /// Whether a budget is set and has been exceeded.
    pub fn is_exceeded(&self) -> bool {
        matches!(self, BudgetUsage::Set(status) if status.exceeded)
    }
}

/// Measure this month's expenses against `budget`.
///
/// # Errors
/// Returns an [Error::CorruptRecord] if any timestamp cannot be read.
pub fn budget_usage(
    transactions: &[Transaction],
    budget: f64,
    today: Date,
) -> Result<BudgetUsage, Error> {
    if budget <= 0.0 {
        return Ok(BudgetUsage::Unset);
    }

    let spent = current_month_expense(transactions, today)?;

    Ok(BudgetUsage::from_spent(budget, spent))
}

/// Raised when a change pushes spending over the monthly budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetAlert {
    /// The monthly budget.
    pub budget: f64,
    /// The expenses recorded this month after the change.
    pub spent: f64,
    /// How far spending is over the budget.
    pub over_by: f64,
}

/// Compare budget usage before and after a change to the records.
///
/// Returns an alert only when the change moved spending from within the
/// budget to over it, so an already exceeded budget is reported once.
pub fn budget_alert(before: &BudgetUsage, after: &BudgetUsage) -> Option<BudgetAlert> {
    match after {
        BudgetUsage::Set(status) if status.exceeded && !before.is_exceeded() => {
            Some(BudgetAlert {
                budget: status.budget,
                spent: status.spent,
                over_by: status.spent - status.budget,
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use crate::{
        Category, Kind,
        aggregation::{
            BudgetAlert, BudgetUsage, budget_alert, budget_usage,
            test_utils::{corrupt_transaction, create_test_transaction},
        },
    };

    #[test]
    fn zero_budget_is_unset() {
        assert_eq!(BudgetUsage::from_spent(0.0, 50.0), BudgetUsage::Unset);
        assert_eq!(BudgetUsage::from_spent(-10.0, 50.0), BudgetUsage::Unset);
    }

    #[test]
    fn overspent_budget_is_clamped_and_flagged() {
        let transactions = vec![create_test_transaction(
            1,
            1200.0,
            Kind::Expense,
            Category::Shopping,
            datetime!(2025-05-10 15:00),
        )];

        let usage = budget_usage(&transactions, 1000.0, date!(2025-05-20)).unwrap();

        let BudgetUsage::Set(status) = usage else {
            panic!("expected a set budget, got {usage:?}");
        };
        assert_eq!(status.percent, 100.0);
        assert_eq!(status.remaining, -200.0);
        assert!(status.exceeded);
    }

    #[test]
    fn partially_spent_budget() {
        let usage = BudgetUsage::from_spent(400.0, 100.0);

        let BudgetUsage::Set(status) = usage else {
            panic!("expected a set budget, got {usage:?}");
        };
        assert_eq!(status.percent, 25.0);
        assert_eq!(status.remaining, 300.0);
        assert!(!status.exceeded);
    }

    #[test]
    fn spending_exactly_the_budget_is_not_exceeded() {
        assert!(!BudgetUsage::from_spent(100.0, 100.0).is_exceeded());
    }

    #[test]
    fn unset_budget_skips_timestamps() {
        let transactions = vec![corrupt_transaction(1)];

        assert_eq!(
            budget_usage(&transactions, 0.0, date!(2025-05-20)),
            Ok(BudgetUsage::Unset)
        );
    }

    #[test]
    fn set_budget_fails_on_corrupt_timestamp() {
        let transactions = vec![corrupt_transaction(1)];

        assert!(budget_usage(&transactions, 100.0, date!(2025-05-20)).is_err());
    }

    #[test]
    fn alert_on_crossing_budget() {
        let before = BudgetUsage::from_spent(1000.0, 900.0);
        let after = BudgetUsage::from_spent(1000.0, 1200.0);

        assert_eq!(
            budget_alert(&before, &after),
            Some(BudgetAlert {
                budget: 1000.0,
                spent: 1200.0,
                over_by: 200.0
            })
        );
    }

    #[test]
    fn no_alert_when_already_exceeded() {
        let before = BudgetUsage::from_spent(1000.0, 1100.0);
        let after = BudgetUsage::from_spent(1000.0, 1200.0);

        assert_eq!(budget_alert(&before, &after), None);
    }

    #[test]
    fn no_alert_within_budget_or_unset() {
        let before = BudgetUsage::from_spent(1000.0, 100.0);
        let after = BudgetUsage::from_spent(1000.0, 200.0);

        assert_eq!(budget_alert(&before, &after), None);
        assert_eq!(budget_alert(&BudgetUsage::Unset, &BudgetUsage::Unset), None);
    }
}
