//! ECharts documents for the report series.
//!
//! Each chart is generated as a JSON configuration for the ECharts library:
//! - **Income vs Expense**: the two totals as bars
//! - **Expense Categories**: the category breakdown as a pie
//! - **Yearly Expense**: expenses for each month of a year
//! - **Last 3 Months**: expenses for the rolling three month window

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Bar, Pie},
};
use serde::Serialize;
use time::Month;

use crate::{
    Category, Currency,
    aggregation::{Totals, month_name},
    report::bar_series,
};

/// A chart with an element ID and its ECharts configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDocument {
    /// The element ID to use for the chart (kebab-case).
    pub id: &'static str,
    /// The ECharts configuration as a JSON string.
    pub options: String,
}

impl ChartDocument {
    fn new(id: &'static str, chart: Chart) -> Self {
        Self {
            id,
            options: chart.to_string(),
        }
    }
}

/// Bar chart of total income against total expenses.
pub fn income_expense_chart(totals: &Totals, currency: Currency) -> ChartDocument {
    let (labels, values): (Vec<&str>, Vec<f64>) = bar_series(totals).into_iter().unzip();

    let chart = Chart::new()
        .title(Title::new().text("Income vs Expense"))
        .tooltip(currency_tooltip(currency))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis(currency))
        .series(Bar::new().name("Amount").data(values));

    ChartDocument::new("income-expense", chart)
}

/// Pie chart of expenses per category.
pub fn category_pie_chart(breakdown: &[(Category, f64)]) -> ChartDocument {
    let data: Vec<(f64, &str)> = breakdown
        .iter()
        .map(|(category, total)| (*total, category.as_str()))
        .collect();

    let chart = Chart::new()
        .title(Title::new().text("Expense Categories"))
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(Pie::new().name("Expenses").radius("55%").data(data));

    ChartDocument::new("expense-categories", chart)
}

/// Bar chart of expenses for each month of a year.
pub fn yearly_expense_chart(
    year: i32,
    series: &[(Month, f64)],
    currency: Currency,
) -> ChartDocument {
    monthly_expense_chart(
        "yearly-expense",
        "Yearly Expense Report",
        &year.to_string(),
        series,
        currency,
    )
}

/// Bar chart comparing expenses over the last three months.
pub fn comparison_chart(series: &[(Month, f64)], currency: Currency) -> ChartDocument {
    monthly_expense_chart(
        "three-month-comparison",
        "Last 3 Months Expense Comparison",
        "Matched by month name",
        series,
        currency,
    )
}

fn monthly_expense_chart(
    id: &'static str,
    title: &str,
    subtitle: &str,
    series: &[(Month, f64)],
    currency: Currency,
) -> ChartDocument {
    let labels: Vec<&str> = series.iter().map(|(month, _)| month_name(*month)).collect();
    let values: Vec<f64> = series.iter().map(|(_, total)| *total).collect();

    let chart = Chart::new()
        .title(Title::new().text(title).subtext(subtitle))
        .tooltip(currency_tooltip(currency))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis(currency))
        .series(Bar::new().name("Expense").data(values));

    ChartDocument::new(id, chart)
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

fn currency_axis(currency: Currency) -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .axis_label(AxisLabel::new().formatter(currency_formatter(currency)))
}

#[inline]
fn currency_formatter(currency: Currency) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat('en-US', {{
              style: 'currency',
              currency: '{}'
            }});
            return (number) ? currencyFormatter.format(number) : \"-\";",
            currency.code()
        ),
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip(currency: Currency) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(currency))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
