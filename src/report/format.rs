//! Text formatting helpers shared by the report views.

use unicode_segmentation::UnicodeSegmentation;

use crate::Currency;

/// The max number of graphemes of a title shown in a transaction listing.
pub const MAX_TITLE_GRAPHEMES: usize = 20;

/// Format an amount with the currency code and two decimal places,
/// e.g. "INR 1234.50".
pub fn format_money(currency: Currency, amount: f64) -> String {
    format!("{} {amount:.2}", currency.code())
}

/// Keep at most `max_graphemes` user-perceived characters of `text`.
pub fn truncate(text: &str, max_graphemes: usize) -> String {
    text.graphemes(true).take(max_graphemes).collect()
}
