//! Income and expense totals and the per-category expense breakdown.

use serde::Serialize;
use time::Date;

use crate::{Category, Error, Kind, Transaction, aggregation::parse_timestamps};

/// The summary totals over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Totals {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all expenses.
    pub expense: f64,
    /// Income minus expenses.
    pub balance: f64,
}

/// Income and expense sums for one bucket of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IncomeExpense {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all expenses.
    pub expense: f64,
}

impl IncomeExpense {
    pub(super) fn include(&mut self, transaction: &Transaction) {
        match transaction.kind {
            Kind::Income => self.income += transaction.amount,
            Kind::Expense => self.expense += transaction.amount,
        }
    }
}

impl From<IncomeExpense> for Totals {
    fn from(sums: IncomeExpense) -> Self {
        Self {
            income: sums.income,
            expense: sums.expense,
            balance: sums.income - sums.expense,
        }
    }
}

/// Sum income and expenses.
///
/// An empty slice gives all zeros.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut sums = IncomeExpense::default();

    for transaction in transactions {
        sums.include(transaction);
    }

    sums.into()
}

/// Sum the expenses recorded in the same calendar month and year as `today`.
///
/// # Errors
/// Returns an [Error::CorruptRecord] if any timestamp cannot be read.
pub fn current_month_expense(transactions: &[Transaction], today: Date) -> Result<f64, Error> {
    let total: f64 = parse_timestamps(transactions)?
        .into_iter()
        .filter(|(transaction, created_at)| {
            transaction.is_expense()
                && created_at.month() == today.month()
                && created_at.year() == today.year()
        })
        .map(|(transaction, _)| transaction.amount)
        .sum();

    Ok(total)
}

/// Group expenses by category and sum them.
///
/// The result is sorted by total, largest first. Categories with equal totals
/// keep the order they were first seen in. Categories without expenses are
/// left out.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<(Category, f64)> {
    let mut breakdown: Vec<(Category, f64)> = Vec::new();

    for transaction in transactions.iter().filter(|t| t.is_expense()) {
        match breakdown
            .iter_mut()
            .find(|(category, _)| *category == transaction.category)
        {
            Some((_, total)) => *total += transaction.amount,
            None => breakdown.push((transaction.category, transaction.amount)),
        }
    }

    breakdown.sort_by(|(_, a), (_, b)| b.total_cmp(a));

    breakdown
}
