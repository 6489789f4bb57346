//! Writers that export a [Report] as text, JSON or CSV.

use std::io::Write;

use serde::Serialize;

use crate::{
    Currency, Error,
    aggregation::{BudgetUsage, Totals, month_name},
    report::{ChartDocument, MonthlyReport, Report, YearlyReport, format_money},
};

/// Somewhere a finished report can be written.
pub trait ReportSink {
    /// The file extension for this kind of output, without the dot.
    fn extension(&self) -> &'static str;

    /// Write `report` in full.
    fn write_report(&mut self, report: &Report) -> Result<(), Error>;
}

/// Writes a printable plain text document.
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    /// Create a sink that writes to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_summary(&mut self, totals: &Totals, currency: Currency) -> Result<(), Error> {
        writeln!(self.writer, "Summary")?;
        writeln!(
            self.writer,
            "  Total Income: {}",
            format_money(currency, totals.income)
        )?;
        writeln!(
            self.writer,
            "  Total Expense: {}",
            format_money(currency, totals.expense)
        )?;
        writeln!(
            self.writer,
            "  Balance: {}",
            format_money(currency, totals.balance)
        )?;

        Ok(())
    }

    fn write_monthly(&mut self, report: &MonthlyReport) -> Result<(), Error> {
        let currency = report.currency;

        writeln!(self.writer, "PocketPlanner Monthly Report")?;
        writeln!(
            self.writer,
            "Month: {} {}",
            month_name(report.month),
            report.year
        )?;
        writeln!(self.writer, "Generated: {}", report.generated_at)?;
        writeln!(self.writer)?;

        self.write_summary(&report.totals, currency)?;
        writeln!(
            self.writer,
            "  Monthly Budget Set: {}",
            format_money(currency, report.budget)
        )?;

        if let BudgetUsage::Set(status) = report.budget_usage {
            let spent_percent = 100.0 * status.spent / status.budget;

            if status.exceeded {
                writeln!(self.writer, "  Budget Exceeded ({spent_percent:.1}%)")?;
            } else {
                writeln!(self.writer, "  Budget Safe ({spent_percent:.1}%)")?;
            }
        }
        writeln!(self.writer)?;

        writeln!(self.writer, "Charts")?;
        writeln!(self.writer, "  Income vs Expense")?;
        for (label, amount) in report.income_expense {
            writeln!(
                self.writer,
                "    {label:<15}{}",
                format_money(currency, amount)
            )?;
        }
        if !report.category_shares.is_empty() {
            writeln!(self.writer, "  Expense Categories")?;
            for (category, share) in &report.category_shares {
                writeln!(self.writer, "    {:<15}{:.1}%", category.as_str(), share * 100.0)?;
            }
        }
        writeln!(self.writer)?;

        writeln!(self.writer, "Transactions List")?;
        if report.transactions.is_empty() {
            writeln!(self.writer, "  No transactions found for this month.")?;
        } else {
            writeln!(
                self.writer,
                "  {:<22}{:<16}{:<9}{:<15}Date",
                "Title", "Amount", "Type", "Category"
            )?;
            for row in &report.transactions {
                writeln!(
                    self.writer,
                    "  {:<22}{:<16}{:<9}{:<15}{}",
                    row.title,
                    row.amount,
                    row.kind.as_str(),
                    row.category.as_str(),
                    row.date
                )?;
            }
        }
        writeln!(self.writer)?;

        writeln!(self.writer, "Generated by PocketPlanner")?;

        Ok(())
    }

    fn write_yearly(&mut self, report: &YearlyReport) -> Result<(), Error> {
        let currency = report.currency;

        writeln!(self.writer, "PocketPlanner Yearly Report")?;
        writeln!(self.writer, "Year: {}", report.year)?;
        writeln!(self.writer, "Generated: {}", report.generated_at)?;
        writeln!(self.writer)?;

        self.write_summary(&report.totals, currency)?;
        writeln!(self.writer)?;

        writeln!(self.writer, "Month Wise Expense")?;
        for (month, total) in &report.month_wise_expense {
            writeln!(
                self.writer,
                "  {}: {}",
                month_name(*month),
                format_money(currency, *total)
            )?;
        }
        writeln!(self.writer)?;

        writeln!(self.writer, "Generated by PocketPlanner")?;

        Ok(())
    }
}

impl<W: Write> ReportSink for TextSink<W> {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn write_report(&mut self, report: &Report) -> Result<(), Error> {
        match report {
            Report::Monthly(report) => self.write_monthly(report)?,
            Report::Yearly(report) => self.write_yearly(report)?,
        }

        self.writer.flush()?;

        Ok(())
    }
}

/// Writes the report and its chart configurations as a JSON document.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    /// Create a sink that writes to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    report: &'a Report,
    charts: Vec<ChartDocument>,
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write_report(&mut self, report: &Report) -> Result<(), Error> {
        let document = JsonDocument {
            report,
            charts: report.charts(),
        };

        serde_json::to_writer_pretty(&mut self.writer, &document)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?;
        writeln!(self.writer)?;
        self.writer.flush()?;

        Ok(())
    }
}

/// Writes the report's table as CSV: the transaction listing of a monthly
/// report, or the month-wise expenses of a yearly report.
pub struct CsvSink<W: Write> {
    writer: W,
}

impl<W: Write> CsvSink<W> {
    /// Create a sink that writes to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[derive(Serialize)]
struct MonthExpenseRecord {
    month: &'static str,
    expense: f64,
    currency: Currency,
}

fn write_csv<T: Serialize>(
    writer: impl Write,
    records: impl Iterator<Item = T>,
) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;

    Ok(())
}

impl<W: Write> ReportSink for CsvSink<W> {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write_report(&mut self, report: &Report) -> Result<(), Error> {
        let result = match report {
            Report::Monthly(report) => write_csv(&mut self.writer, report.transactions.iter()),
            Report::Yearly(report) => write_csv(
                &mut self.writer,
                report
                    .month_wise_expense
                    .iter()
                    .map(|(month, expense)| MonthExpenseRecord {
                        month: month_name(*month),
                        expense: *expense,
                        currency: report.currency,
                    }),
            ),
        };

        result.map_err(|error| Error::CsvError(error.to_string()))
    }
}
