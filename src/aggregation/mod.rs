//! Transaction aggregation over a snapshot of every stored record.
//!
//! Every function here is pure: it takes the slice returned by
//! [RecordStore::list_all](crate::RecordStore::list_all) and recomputes its
//! result from scratch. Functions that bucket records by time parse the
//! timestamp of every record and fail with [Error::CorruptRecord](crate::Error::CorruptRecord)
//! on the first one that cannot be read, rather than returning a partial result.

mod budget;
mod filter;
mod series;
mod totals;

pub use budget::{BudgetAlert, BudgetStatus, BudgetUsage, budget_alert, budget_usage};
pub use filter::{KindFilter, SortKey, filter_sort};
pub use series::{
    MonthSelection, Period, month_name, monthly_series, parse_month, rolling_3_month_series,
    transactions_in_period, yearly_series,
};
pub use totals::{IncomeExpense, Totals, category_breakdown, current_month_expense, totals};

use time::PrimitiveDateTime;

use crate::{Error, Transaction};

/// Parse the timestamp of every transaction, keeping input order.
///
/// # Errors
/// Returns an [Error::CorruptRecord] for the first unreadable timestamp.
fn parse_timestamps(
    transactions: &[Transaction],
) -> Result<Vec<(&Transaction, PrimitiveDateTime)>, Error> {
    transactions
        .iter()
        .map(|transaction| Ok((transaction, transaction.created_at()?)))
        .collect()
}
