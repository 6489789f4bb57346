//! Chart-ready series and the tabular transaction listing.

use serde::Serialize;

use crate::{
    Category, Currency, Kind, Transaction, TransactionId,
    aggregation::Totals,
    report::format::{MAX_TITLE_GRAPHEMES, format_money, truncate},
};

/// The two bars of the income versus expense chart.
pub fn bar_series(totals: &Totals) -> [(&'static str, f64); 2] {
    [("Income", totals.income), ("Expense", totals.expense)]
}

/// The share of total expenses of each category in a breakdown, keeping
/// the breakdown's order.
///
/// Shares are fractions that sum to one. An empty breakdown, or one whose
/// total is zero, gives an empty series.
pub fn pie_series(breakdown: &[(Category, f64)]) -> Vec<(Category, f64)> {
    let total: f64 = breakdown.iter().map(|(_, amount)| amount).sum();

    if total <= 0.0 {
        return Vec::new();
    }

    breakdown
        .iter()
        .map(|(category, amount)| (*category, amount / total))
        .collect()
}

/// One line of the transaction listing, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRow {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The title, truncated to [MAX_TITLE_GRAPHEMES].
    pub title: String,
    /// The amount with its currency code.
    pub amount: String,
    /// Whether the money was earned or spent.
    pub kind: Kind,
    /// The category of the transaction.
    pub category: Category,
    /// The stored timestamp text.
    pub date: String,
}

/// Format transactions for a listing, keeping their order.
pub fn transaction_rows<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    currency: Currency,
) -> Vec<TransactionRow> {
    transactions
        .into_iter()
        .map(|transaction| TransactionRow {
            id: transaction.id,
            title: truncate(&transaction.title, MAX_TITLE_GRAPHEMES),
            amount: format_money(currency, transaction.amount),
            kind: transaction.kind,
            category: transaction.category,
            date: transaction.timestamp.to_string(),
        })
        .collect()
}
