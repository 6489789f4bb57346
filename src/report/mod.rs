//! Turns aggregation results into chart series, chart documents and
//! printable reports.
//!
//! Nothing here recomputes totals: every value comes from the
//! [aggregation](crate::aggregation) functions. Sinks only consume reports.

mod charts;
mod document;
mod format;
mod series;
mod sink;

pub use charts::{
    ChartDocument, category_pie_chart, comparison_chart, income_expense_chart,
    yearly_expense_chart,
};
pub use document::{MonthlyReport, Report, YearlyReport};
pub use format::{MAX_TITLE_GRAPHEMES, format_money, truncate};
pub use series::{TransactionRow, bar_series, pie_series, transaction_rows};
pub use sink::{CsvSink, JsonSink, ReportSink, TextSink};
