use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand, ValueEnum};
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use pocket_planner::{
    Currency, Error, NewTransaction, PocketPlanner, RecordStore, SettingsStore, TransactionId,
    ValidationError,
    aggregation::{
        BudgetUsage, KindFilter, MonthSelection, SortKey, budget_alert, budget_usage,
        category_breakdown, filter_sort, month_name, monthly_series, parse_month,
        rolling_3_month_series, totals, yearly_series,
    },
    backup::{auto_backup, backup_database, restore_database},
    get_local_offset, local_now,
    report::{
        ChartDocument, CsvSink, JsonSink, MonthlyReport, Report, ReportSink, TextSink,
        TransactionRow, YearlyReport, category_pie_chart, comparison_chart, format_money,
        income_expense_chart, pie_series, transaction_rows, yearly_expense_chart,
    },
    setup_logging,
};

/// A PIN protected personal finance tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long, env = "POCKET_PLANNER_DB", default_value = "pocket_planner.db", global = true)]
    db_path: PathBuf,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    #[arg(long, env = "POCKET_PLANNER_TIMEZONE", default_value = "Etc/UTC", global = true)]
    timezone: String,

    /// Copy the database into this directory after every command.
    #[arg(long, env = "POCKET_PLANNER_BACKUP_DIR", global = true)]
    backup_dir: Option<PathBuf>,

    /// Append debug logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// The app PIN. Prompted for if not given.
    #[arg(long, env = "POCKET_PLANNER_PIN", hide_env_values = true, global = true)]
    pin: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new income or expense.
    Add {
        /// A short description, e.g. "Groceries".
        title: String,
        /// The amount, zero or greater.
        amount: String,
        /// Income or Expense.
        #[arg(long, short, default_value = "Expense")]
        kind: String,
        /// One of Food, Travel, Shopping, Bills, Health, Salary, Education,
        /// Entertainment, Gifts or Other.
        #[arg(long, short, default_value = "Other")]
        category: String,
    },
    /// Replace the details of a transaction. The date is kept.
    Edit {
        /// The ID of the transaction.
        id: TransactionId,
        /// The new title.
        title: String,
        /// The new amount.
        amount: String,
        /// The new kind.
        #[arg(long, short)]
        kind: String,
        /// The new category.
        #[arg(long, short)]
        category: String,
    },
    /// Delete a transaction.
    Delete {
        /// The ID of the transaction.
        id: TransactionId,
    },
    /// Show a single transaction.
    Show {
        /// The ID of the transaction.
        id: TransactionId,
    },
    /// List transactions.
    List {
        /// Only show transactions containing this text.
        #[arg(long, short, default_value = "")]
        search: String,
        /// All, Income or Expense.
        #[arg(long, short, default_value = "all")]
        kind: KindFilter,
        /// latest, oldest, highest or lowest.
        #[arg(long, default_value = "latest")]
        sort: SortKey,
    },
    /// Show the totals, budget usage and expenses per category.
    Summary {
        /// How many of the largest spending categories to list.
        #[arg(long, default_value_t = 5)]
        top: usize,
        /// Write the income versus expense and category charts (ECharts JSON) here.
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Show income and expenses for a month name, across all years.
    Monthly {
        /// A month name or "all".
        #[arg(default_value = "all")]
        month: MonthSelection,
    },
    /// Show the expenses for each month of a year.
    Yearly {
        /// Defaults to the current year.
        year: Option<i32>,
        /// Write the yearly expense chart (ECharts JSON) here.
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Compare the expenses of the last three months.
    Trend {
        /// Write the comparison chart (ECharts JSON) here.
        #[arg(long)]
        chart: Option<PathBuf>,
    },
    /// Export a monthly or yearly report.
    Report {
        #[command(subcommand)]
        period: ReportPeriod,
    },
    /// View or change the settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Copy the database to a file.
    Backup {
        /// Where to write the copy.
        destination: PathBuf,
    },
    /// Replace the database with a backup copy. Does not ask for the PIN.
    Restore {
        /// The backup file to restore.
        source: PathBuf,
    },
    /// Delete every transaction.
    Clear {
        /// Confirm that every transaction should be deleted.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ReportPeriod {
    /// Report on a single month.
    Monthly {
        /// Defaults to the current month.
        #[arg(long, short)]
        month: Option<String>,
        /// Defaults to the current year.
        #[arg(long, short)]
        year: Option<i32>,
        #[command(flatten)]
        output: ReportOutput,
    },
    /// Report on a whole year.
    Yearly {
        /// Defaults to the current year.
        #[arg(long, short)]
        year: Option<i32>,
        #[command(flatten)]
        output: ReportOutput,
    },
}

#[derive(clap::Args, Debug)]
struct ReportOutput {
    /// The output format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
    /// The directory to write the report to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReportFormat {
    Text,
    Json,
    Csv,
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Show the current settings.
    Show,
    /// Change the display currency.
    Currency {
        /// One of INR, USD, EUR, GBP or JPY.
        code: Currency,
    },
    /// Change the monthly budget. Zero removes it.
    Budget {
        /// The new budget.
        amount: String,
    },
    /// Change the PIN.
    Pin,
    /// Change the security question used to reset a forgotten PIN.
    SecurityQuestion {
        /// The new question. The answer is prompted for.
        question: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging(args.log_file.as_deref()) {
        print_error(error);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!("Command failed: {error:?}");
            print_error(error);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let offset = get_local_offset(&args.timezone)?;

    if let Command::Restore { source } = &args.command {
        restore_database(source, &args.db_path)?;
        println!("Restored {} from {}", args.db_path.display(), source.display());
        return Ok(());
    }

    {
        let mut planner = PocketPlanner::open(&args.db_path, offset)?;
        let pin = unlock(&planner, args.pin)?;
        execute(&mut planner, args.command, &args.db_path, offset, &pin)?;
    }

    if let Some(backup_dir) = &args.backup_dir
        && let Some(path) = auto_backup(&args.db_path, backup_dir, now_with_seconds(offset))?
    {
        println!("Backup saved to {}", path.display());
    }

    Ok(())
}

/// Check the PIN, prompting for it if it was not given, and return it.
fn unlock(planner: &PocketPlanner, pin: Option<String>) -> Result<String, Error> {
    let pin = match pin {
        Some(pin) => pin,
        None => prompt_secret("Enter PIN: ")?,
    };

    if planner.settings().verify_pin(&pin)? {
        Ok(pin)
    } else {
        Err(Error::InvalidPin)
    }
}

fn execute(
    planner: &mut PocketPlanner,
    command: Command,
    db_path: &Path,
    offset: UtcOffset,
    pin: &str,
) -> Result<(), Error> {
    let today = local_now(offset).date();

    match command {
        Command::Add {
            title,
            amount,
            kind,
            category,
        } => {
            let new = NewTransaction::parse(&title, &amount, &kind, &category)?;
            let before = planner.try_budget_usage(today);
            let id = planner.records_mut().add(new)?;
            println!("Added transaction {id}");
            report_budget_alert(planner, before, today);
        }
        Command::Edit {
            id,
            title,
            amount,
            kind,
            category,
        } => {
            let new = NewTransaction::parse(&title, &amount, &kind, &category)?;
            let before = planner.try_budget_usage(today);
            planner.records_mut().update(id, new)?;
            println!("Updated transaction {id}");
            report_budget_alert(planner, before, today);
        }
        Command::Delete { id } => {
            planner.records_mut().delete(id)?;
            println!("Deleted transaction {id}");
        }
        Command::Show { id } => {
            let transaction = planner.records().get(id)?;
            let currency = planner.settings().get_currency()?;
            println!("ID:       {}", transaction.id);
            println!("Title:    {}", transaction.title);
            println!("Amount:   {}", format_money(currency, transaction.amount));
            println!("Type:     {}", transaction.kind);
            println!("Category: {}", transaction.category);
            println!("Date:     {}", transaction.timestamp);
        }
        Command::List { search, kind, sort } => {
            let (transactions, settings) = planner.snapshot()?;
            let selected = filter_sort(&transactions, &search, kind, sort);

            if selected.is_empty() {
                println!("No matching transactions found.");
            } else {
                print_rows(&transaction_rows(selected, settings.currency));
            }
        }
        Command::Summary { top, chart } => {
            let (transactions, settings) = planner.snapshot()?;
            let currency = settings.currency;
            let totals = totals(&transactions);
            let breakdown = category_breakdown(&transactions);

            println!("Total Income:  {}", format_money(currency, totals.income));
            println!("Total Expense: {}", format_money(currency, totals.expense));
            println!("Balance:       {}", format_money(currency, totals.balance));

            match budget_usage(&transactions, settings.monthly_budget, today)? {
                BudgetUsage::Unset => println!("Monthly Budget: not set"),
                BudgetUsage::Set(status) => {
                    println!(
                        "Spent {} / Budget {} ({:.1}%) | Remaining {}",
                        format_money(currency, status.spent),
                        format_money(currency, status.budget),
                        status.percent,
                        format_money(currency, status.remaining)
                    );
                    if status.exceeded {
                        print_warning("Budget exceeded!");
                    }
                }
            }

            if !breakdown.is_empty() {
                println!();
                println!("Top Spending Categories");
                for ((category, total), (_, share)) in breakdown
                    .iter()
                    .zip(pie_series(&breakdown))
                    .take(top)
                {
                    println!(
                        "  {:<15}{:<16}{:.1}%",
                        category.as_str(),
                        format_money(currency, *total),
                        share * 100.0
                    );
                }
            }

            if let Some(path) = chart {
                write_charts(
                    &path,
                    &[
                        income_expense_chart(&totals, currency),
                        category_pie_chart(&breakdown),
                    ],
                )?;
            }
        }
        Command::Monthly { month } => {
            let (transactions, settings) = planner.snapshot()?;
            let sums = monthly_series(&transactions, month)?;

            println!("{month} Report");
            println!("  Income:  {}", format_money(settings.currency, sums.income));
            println!("  Expense: {}", format_money(settings.currency, sums.expense));
        }
        Command::Yearly { year, chart } => {
            let (transactions, settings) = planner.snapshot()?;
            let year = year.unwrap_or(today.year());
            let series = yearly_series(&transactions, year)?;

            println!("Expenses in {year}");
            for (month, total) in &series {
                println!(
                    "  {:<11}{}",
                    month_name(*month),
                    format_money(settings.currency, *total)
                );
            }

            if let Some(path) = chart {
                write_charts(
                    &path,
                    &[yearly_expense_chart(year, &series, settings.currency)],
                )?;
            }
        }
        Command::Trend { chart } => {
            let (transactions, settings) = planner.snapshot()?;
            let series = rolling_3_month_series(&transactions, today)?;

            println!("Last 3 Months Expense Comparison");
            for (month, total) in &series {
                println!(
                    "  {:<11}{}",
                    month_name(*month),
                    format_money(settings.currency, *total)
                );
            }

            if let Some(path) = chart {
                write_charts(&path, &[comparison_chart(&series, settings.currency)])?;
            }
        }
        Command::Report { period } => {
            let (transactions, settings) = planner.snapshot()?;
            let generated_at = local_now(offset);

            let (report, output) = match period {
                ReportPeriod::Monthly {
                    month,
                    year,
                    output,
                } => {
                    let month = match month {
                        Some(month) => parse_month(&month)?,
                        None => today.month(),
                    };
                    let year = year.unwrap_or(today.year());
                    let report =
                        MonthlyReport::build(&transactions, &settings, year, month, generated_at)?;
                    (Report::Monthly(report), output)
                }
                ReportPeriod::Yearly { year, output } => {
                    let year = year.unwrap_or(today.year());
                    let report = YearlyReport::build(&transactions, &settings, year, generated_at)?;
                    (Report::Yearly(report), output)
                }
            };

            let path = export_report(&report, &output)?;
            println!("Report saved to {}", path.display());
        }
        Command::Settings { action } => match action {
            SettingsAction::Show => {
                let settings = planner.settings().get_settings()?;
                println!("Currency:          {}", settings.currency);
                if settings.monthly_budget > 0.0 {
                    println!(
                        "Monthly Budget:    {}",
                        format_money(settings.currency, settings.monthly_budget)
                    );
                } else {
                    println!("Monthly Budget:    not set");
                }
                println!("Security Question: {}", settings.security_question.question);
            }
            SettingsAction::Currency { code } => {
                planner.settings_mut().set_currency(code)?;
                println!("Currency set to {code}");
            }
            SettingsAction::Budget { amount } => {
                let parsed: f64 = amount
                    .trim()
                    .parse()
                    .map_err(|_| ValidationError::InvalidBudget(amount.clone()))?;
                planner.settings_mut().set_budget(parsed)?;
                let currency = planner.settings().get_currency()?;
                println!("Monthly budget set to {}", format_money(currency, parsed));
            }
            SettingsAction::Pin => {
                let new = prompt_secret("Enter a new PIN: ")?;
                let confirm = prompt_secret("Enter the same PIN again: ")?;
                planner.settings_mut().set_pin(pin, &new, &confirm)?;
                println!("PIN changed.");
            }
            SettingsAction::SecurityQuestion { question } => {
                let answer = prompt_secret("Enter the answer: ")?;
                planner.settings_mut().set_security_qa(&question, &answer)?;
                println!("Security question changed.");
            }
        },
        Command::Backup { destination } => {
            backup_database(db_path, &destination)?;
            println!("Backup saved to {}", destination.display());
        }
        Command::Restore { source } => {
            return Err(Error::IoError(format!(
                "cannot restore {} while the database is open",
                source.display()
            )));
        }
        Command::Clear { yes } => {
            if !yes {
                print_warning("This deletes every transaction. Run again with --yes to confirm.");
                return Ok(());
            }
            let deleted = planner.records_mut().clear()?;
            println!("Deleted {deleted} transactions.");
        }
    }

    Ok(())
}

/// Warn if the last change pushed this month's expenses over the budget.
fn report_budget_alert(planner: &PocketPlanner, before: Option<BudgetUsage>, today: Date) {
    let (Some(before), Some(after)) = (before, planner.try_budget_usage(today)) else {
        print_warning("Could not check the monthly budget, the change was still saved.");
        return;
    };

    if let Some(alert) = budget_alert(&before, &after) {
        let currency = planner.settings().get_currency().unwrap_or_default();
        print_warning(format!(
            "Budget exceeded! Spent {} of {} this month, {} over.",
            format_money(currency, alert.spent),
            format_money(currency, alert.budget),
            format_money(currency, alert.over_by)
        ));
    }
}

fn export_report(report: &Report, output: &ReportOutput) -> Result<PathBuf, Error> {
    let mut buffer = Vec::new();
    let extension = {
        let mut sink: Box<dyn ReportSink + '_> = match output.format {
            ReportFormat::Text => Box::new(TextSink::new(&mut buffer)),
            ReportFormat::Json => Box::new(JsonSink::new(&mut buffer)),
            ReportFormat::Csv => Box::new(CsvSink::new(&mut buffer)),
        };
        sink.write_report(report)?;
        sink.extension()
    };

    fs::create_dir_all(&output.output_dir)?;
    let path = output
        .output_dir
        .join(format!("{}.{extension}", report.file_name()));
    fs::write(&path, buffer)?;

    Ok(path)
}

fn write_charts(path: &Path, charts: &[ChartDocument]) -> Result<(), Error> {
    let json = serde_json::to_string_pretty(charts)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;
    fs::write(path, json)?;
    println!("Charts saved to {}", path.display());

    Ok(())
}

fn print_rows(rows: &[TransactionRow]) {
    println!(
        "{:<6}{:<22}{:<16}{:<9}{:<15}Date",
        "ID", "Title", "Amount", "Type", "Category"
    );
    for row in rows {
        println!(
            "{:<6}{:<22}{:<16}{:<9}{:<15}{}",
            row.id,
            row.title,
            row.amount,
            row.kind.as_str(),
            row.category.as_str(),
            row.date
        );
    }
}

/// The current local time with seconds, for backup file names.
fn now_with_seconds(offset: UtcOffset) -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc().to_offset(offset);
    PrimitiveDateTime::new(now.date(), now.time())
}

fn prompt_secret(prompt: &str) -> Result<String, Error> {
    match rpassword::prompt_password(prompt) {
        Ok(secret) => Ok(secret),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => Err(Error::IoError(
            "no input given, stdin was closed".to_owned(),
        )),
        Err(error) => Err(Error::IoError(format!(
            "could not read from stdin: {error}"
        ))),
    }
}

fn print_warning(message: impl ToString) {
    eprintln!("\x1b[33;1m{}\x1b[0m", message.to_string())
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use crate::{Args, Command};

    #[test]
    fn summary_lists_top_five_categories_by_default() {
        let args = Args::try_parse_from(["planner", "summary"]).unwrap();

        assert!(matches!(args.command, Command::Summary { top: 5, chart: None }));
    }

    #[test]
    fn summary_category_count_can_be_changed() {
        let args = Args::try_parse_from(["planner", "summary", "--top", "3"]).unwrap();

        assert!(matches!(args.command, Command::Summary { top: 3, .. }));
    }

    #[test]
    fn unknown_sort_order_is_rejected() {
        let result = Args::try_parse_from(["planner", "list", "--sort", "newest"]);

        assert!(result.is_err());
    }
}
