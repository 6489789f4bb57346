//! Roll-ups of transactions by calendar month and year.

use std::{fmt::Display, str::FromStr};

use time::{Date, Month, PrimitiveDateTime};

use crate::{
    Error, Transaction, ValidationError,
    aggregation::{IncomeExpense, parse_timestamps},
};

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The full English name of `month`, e.g. "January".
pub fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    }
}

/// Parse a full or three letter month name, ignoring case.
///
/// # Errors
/// Returns a [ValidationError::InvalidMonth] if `text` is not a month name.
pub fn parse_month(text: &str) -> Result<Month, Error> {
    let name = text.trim();

    MONTHS
        .into_iter()
        .find(|month| {
            let full_name = month_name(*month);
            full_name.eq_ignore_ascii_case(name)
                || (name.len() == 3 && full_name[..3].eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| ValidationError::InvalidMonth(text.to_owned()).into())
}

/// Which records [monthly_series] sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonthSelection {
    /// Every record.
    #[default]
    All,
    /// Records from the named month of any year.
    Month(Month),
}

impl FromStr for MonthSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(MonthSelection::All);
        }

        parse_month(s).map(MonthSelection::Month)
    }
}

impl Display for MonthSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonthSelection::All => f.write_str("All"),
            MonthSelection::Month(month) => f.write_str(month_name(*month)),
        }
    }
}

/// Sum income and expenses for the selected month name.
///
/// Records from the same month in different years are added together.
///
/// # Errors
/// Returns an [Error::CorruptRecord] if any timestamp cannot be read.
pub fn monthly_series(
    transactions: &[Transaction],
    selection: MonthSelection,
) -> Result<IncomeExpense, Error> {
    let mut sums = IncomeExpense::default();

    for (transaction, created_at) in parse_timestamps(transactions)? {
        let selected = match selection {
            MonthSelection::All => true,
            MonthSelection::Month(month) => created_at.month() == month,
        };

        if selected {
            sums.include(transaction);
        }
    }

    Ok(sums)
}

/// Sum expenses for each calendar month of `year`.
///
/// Every month is present, in calendar order, with zero for months without
/// expenses.
///
/// # Errors
/// Returns an [Error::CorruptRecord] if any timestamp cannot be read.
pub fn yearly_series(transactions: &[Transaction], year: i32) -> Result<[(Month, f64); 12], Error> {
    let mut series = MONTHS.map(|month| (month, 0.0));

    for (transaction, created_at) in parse_timestamps(transactions)? {
        if transaction.is_expense() && created_at.year() == year {
            let index = u8::from(created_at.month()) as usize - 1;
            series[index].1 += transaction.amount;
        }
    }

    Ok(series)
}

/// Sum expenses for the three calendar months ending with the month of
/// `today`, oldest first.
///
/// The window wraps around the new year, e.g. November, December, January.
/// Records are matched by month name only, so the same month from an earlier
/// year is counted as well.
///
/// # Errors
/// Returns an [Error::CorruptRecord] if any timestamp cannot be read.
pub fn rolling_3_month_series(
    transactions: &[Transaction],
    today: Date,
) -> Result<[(Month, f64); 3], Error> {
    let current = today.month();
    let previous = current.previous();
    let mut series = [(previous.previous(), 0.0), (previous, 0.0), (current, 0.0)];

    for (transaction, created_at) in parse_timestamps(transactions)? {
        if !transaction.is_expense() {
            continue;
        }

        if let Some((_, total)) = series
            .iter_mut()
            .find(|(month, _)| *month == created_at.month())
        {
            *total += transaction.amount;
        }
    }

    Ok(series)
}

/// A calendar month or year that a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// A single month of a specific year.
    Month {
        /// The calendar year.
        year: i32,
        /// The month of `year`.
        month: Month,
    },
    /// A whole calendar year.
    Year(i32),
}

impl Period {
    /// Whether `datetime` falls within the period.
    pub fn contains(&self, datetime: PrimitiveDateTime) -> bool {
        match self {
            Period::Month { year, month } => datetime.year() == *year && datetime.month() == *month,
            Period::Year(year) => datetime.year() == *year,
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Period::Month { year, month } => write!(f, "{} {year}", month_name(*month)),
            Period::Year(year) => write!(f, "{year}"),
        }
    }
}

/// Select the transactions recorded within `period`, keeping input order.
///
/// # Errors
/// Returns an [Error::CorruptRecord] if any timestamp cannot be read.
pub fn transactions_in_period(
    transactions: &[Transaction],
    period: Period,
) -> Result<Vec<Transaction>, Error> {
    Ok(parse_timestamps(transactions)?
        .into_iter()
        .filter(|(_, created_at)| period.contains(*created_at))
        .map(|(transaction, _)| transaction.clone())
        .collect())
}
