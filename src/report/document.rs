//! Monthly and yearly report documents built from aggregation results.

use serde::Serialize;
use time::{Month, PrimitiveDateTime};

use crate::{
    Category, Currency, Error, Settings, Timestamp, Transaction,
    aggregation::{
        BudgetUsage, Period, Totals, category_breakdown, month_name, totals,
        transactions_in_period, yearly_series,
    },
    report::{
        ChartDocument, TransactionRow, bar_series, category_pie_chart, income_expense_chart,
        pie_series, transaction_rows, yearly_expense_chart,
    },
};

/// The summary of a single calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    /// The month the report covers.
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    /// The year the report covers.
    pub year: i32,
    /// When the report was generated, in the storage timestamp format.
    pub generated_at: String,
    /// The currency amounts are shown in.
    pub currency: Currency,
    /// Income and expense totals for the month.
    pub totals: Totals,
    /// The monthly budget, zero when unset.
    pub budget: f64,
    /// The month's expenses measured against the budget.
    pub budget_usage: BudgetUsage,
    /// The income versus expense bars.
    pub income_expense: [(&'static str, f64); 2],
    /// Expenses per category, largest first.
    pub category_breakdown: Vec<(Category, f64)>,
    /// The share of expenses per category.
    pub category_shares: Vec<(Category, f64)>,
    /// The month's transactions in the order they were added.
    pub transactions: Vec<TransactionRow>,
}

impl MonthlyReport {
    /// Summarise the transactions recorded in `month` of `year`.
    ///
    /// # Errors
    /// Returns an [Error::CorruptRecord] if any timestamp cannot be read.
    pub fn build(
        transactions: &[Transaction],
        settings: &Settings,
        year: i32,
        month: Month,
        generated_at: PrimitiveDateTime,
    ) -> Result<Self, Error> {
        let in_month = transactions_in_period(transactions, Period::Month { year, month })?;
        let totals = totals(&in_month);
        let category_breakdown = category_breakdown(&in_month);

        Ok(Self {
            month,
            year,
            generated_at: Timestamp::from_datetime(generated_at).to_string(),
            currency: settings.currency,
            totals,
            budget: settings.monthly_budget,
            budget_usage: BudgetUsage::from_spent(settings.monthly_budget, totals.expense),
            income_expense: bar_series(&totals),
            category_shares: pie_series(&category_breakdown),
            category_breakdown,
            transactions: transaction_rows(&in_month, settings.currency),
        })
    }

    /// The file name for the report, without an extension.
    pub fn file_name(&self) -> String {
        format!(
            "PocketPlanner_Monthly_Report_{}_{}",
            month_name(self.month),
            self.year
        )
    }

    /// The charts shown in the report.
    pub fn charts(&self) -> Vec<ChartDocument> {
        vec![
            income_expense_chart(&self.totals, self.currency),
            category_pie_chart(&self.category_breakdown),
        ]
    }
}

/// The summary of a calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyReport {
    /// The year the report covers.
    pub year: i32,
    /// When the report was generated, in the storage timestamp format.
    pub generated_at: String,
    /// The currency amounts are shown in.
    pub currency: Currency,
    /// Income and expense totals for the year.
    pub totals: Totals,
    /// Expenses for each month of the year, in calendar order.
    #[serde(serialize_with = "serialize_month_series")]
    pub month_wise_expense: [(Month, f64); 12],
}

impl YearlyReport {
    /// Summarise the transactions recorded in `year`.
    ///
    /// # Errors
    /// Returns an [Error::CorruptRecord] if any timestamp cannot be read.
    pub fn build(
        transactions: &[Transaction],
        settings: &Settings,
        year: i32,
        generated_at: PrimitiveDateTime,
    ) -> Result<Self, Error> {
        let in_year = transactions_in_period(transactions, Period::Year(year))?;

        Ok(Self {
            year,
            generated_at: Timestamp::from_datetime(generated_at).to_string(),
            currency: settings.currency,
            totals: totals(&in_year),
            month_wise_expense: yearly_series(&in_year, year)?,
        })
    }

    /// The file name for the report, without an extension.
    pub fn file_name(&self) -> String {
        format!("PocketPlanner_Yearly_Report_{}", self.year)
    }

    /// The charts shown in the report.
    pub fn charts(&self) -> Vec<ChartDocument> {
        vec![yearly_expense_chart(
            self.year,
            &self.month_wise_expense,
            self.currency,
        )]
    }
}

/// A report of either period.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "period", rename_all = "lowercase")]
pub enum Report {
    /// A single month.
    Monthly(MonthlyReport),
    /// A whole year.
    Yearly(YearlyReport),
}

impl Report {
    /// The file name for the report, without an extension.
    pub fn file_name(&self) -> String {
        match self {
            Report::Monthly(report) => report.file_name(),
            Report::Yearly(report) => report.file_name(),
        }
    }

    /// The charts shown in the report.
    pub fn charts(&self) -> Vec<ChartDocument> {
        match self {
            Report::Monthly(report) => report.charts(),
            Report::Yearly(report) => report.charts(),
        }
    }
}

fn serialize_month<S: serde::Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(month_name(*month))
}

fn serialize_month_series<S: serde::Serializer>(
    series: &[(Month, f64); 12],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(
        series
            .iter()
            .map(|(month, total)| (month_name(*month), *total)),
    )
}

#[cfg(test)]
mod tests {
    use time::{Month, macros::datetime};

    use crate::{
        Category, Currency, Kind, SecretHash, SecurityQuestion, Settings,
        aggregation::{BudgetUsage, test_utils::create_test_transaction},
        report::{MonthlyReport, Report, YearlyReport},
    };

    fn settings(budget: f64) -> Settings {
        Settings {
            currency: Currency::Usd,
            monthly_budget: budget,
            pin_hash: SecretHash::new_unchecked("hash"),
            security_question: SecurityQuestion {
                question: "Question?".to_owned(),
                answer_hash: SecretHash::new_unchecked("hash"),
            },
        }
    }

    #[test]
    fn monthly_report_only_covers_its_month() {
        let transactions = vec![
            create_test_transaction(
                1,
                100.0,
                Kind::Expense,
                Category::Food,
                datetime!(2025-10-02 12:00),
            ),
            create_test_transaction(
                2,
                50.0,
                Kind::Expense,
                Category::Food,
                datetime!(2025-10-09 12:00),
            ),
            create_test_transaction(
                3,
                500.0,
                Kind::Income,
                Category::Salary,
                datetime!(2025-10-01 09:00),
            ),
            create_test_transaction(
                4,
                70.0,
                Kind::Expense,
                Category::Bills,
                datetime!(2024-10-01 09:00),
            ),
            create_test_transaction(
                5,
                30.0,
                Kind::Expense,
                Category::Bills,
                datetime!(2025-09-30 23:59),
            ),
        ];

        let report = MonthlyReport::build(
            &transactions,
            &settings(1000.0),
            2025,
            Month::October,
            datetime!(2025-10-16 10:00),
        )
        .unwrap();

        assert_eq!(report.totals.income, 500.0);
        assert_eq!(report.totals.expense, 150.0);
        assert_eq!(report.category_breakdown, vec![(Category::Food, 150.0)]);
        assert_eq!(report.transactions.len(), 3);
        assert_eq!(report.generated_at, "16-10-2025 10:00");
        assert_eq!(report.budget_usage, BudgetUsage::from_spent(1000.0, 150.0));
        assert_eq!(report.file_name(), "PocketPlanner_Monthly_Report_October_2025");
        assert_eq!(report.charts().len(), 2);
    }

    #[test]
    fn yearly_report_sums_months() {
        let transactions = vec![
            create_test_transaction(
                1,
                10.0,
                Kind::Expense,
                Category::Food,
                datetime!(2025-01-02 12:00),
            ),
            create_test_transaction(
                2,
                20.0,
                Kind::Expense,
                Category::Food,
                datetime!(2025-03-09 12:00),
            ),
            create_test_transaction(
                3,
                400.0,
                Kind::Income,
                Category::Salary,
                datetime!(2025-03-01 09:00),
            ),
            create_test_transaction(
                4,
                99.0,
                Kind::Expense,
                Category::Food,
                datetime!(2024-03-09 12:00),
            ),
        ];

        let report =
            YearlyReport::build(&transactions, &settings(0.0), 2025, datetime!(2025-12-31 18:00))
                .unwrap();

        assert_eq!(report.totals.income, 400.0);
        assert_eq!(report.totals.expense, 30.0);
        assert_eq!(report.month_wise_expense[0], (Month::January, 10.0));
        assert_eq!(report.month_wise_expense[2], (Month::March, 20.0));
        assert_eq!(report.file_name(), "PocketPlanner_Yearly_Report_2025");
    }

    #[test]
    fn report_serializes_with_month_names() {
        let report = Report::Yearly(
            YearlyReport::build(&[], &settings(0.0), 2025, datetime!(2025-12-31 18:00)).unwrap(),
        );

        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("\"period\":\"yearly\""));
        assert!(json.contains("\"December\""));
        assert!(json.contains("\"USD\""));
    }
}
