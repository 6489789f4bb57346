//! Defines the core data models for transactions.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{
    PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{Error, ValidationError, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl Kind {
    /// The label used for storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Kind::Income),
            "expense" => Ok(Kind::Expense),
            _ => Err(ValidationError::InvalidKind(s.to_owned()).into()),
        }
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of labels used to group transactions.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Bills,
    Health,
    Salary,
    Education,
    Entertainment,
    Gifts,
    #[default]
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 10] = [
        Category::Food,
        Category::Travel,
        Category::Shopping,
        Category::Bills,
        Category::Health,
        Category::Salary,
        Category::Education,
        Category::Entertainment,
        Category::Gifts,
        Category::Other,
    ];

    /// The label used for storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Health => "Health",
            Category::Salary => "Salary",
            Category::Education => "Education",
            Category::Entertainment => "Entertainment",
            Category::Gifts => "Gifts",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    /// Parse a category label, ignoring case and any decoration after the
    /// first word (e.g. "Food 🍔").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.split_whitespace().next().unwrap_or_default();

        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| ValidationError::InvalidCategory(s.to_owned()).into())
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The creation time of a transaction, exactly as it is stored.
///
/// The raw text is kept rather than a parsed date so that a corrupted value
/// can be carried through the store and reported by whichever aggregation
/// needs it, see [Transaction::created_at].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp(String);

impl Timestamp {
    /// The storage format, e.g. "05-10-2025 18:30".
    pub const FORMAT: &'static [BorrowedFormatItem<'static>] =
        format_description!("[day]-[month]-[year] [hour]:[minute]");

    /// Format a date and time with minute precision.
    pub fn from_datetime(datetime: PrimitiveDateTime) -> Self {
        Self(format!(
            "{:02}-{:02}-{:04} {:02}:{:02}",
            datetime.day(),
            u8::from(datetime.month()),
            datetime.year(),
            datetime.hour(),
            datetime.minute()
        ))
    }

    /// Wrap stored text without validating it.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// a malformed value only surfaces as an [Error::CorruptRecord] when it is
    /// parsed.
    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.to_owned())
    }

    /// Parse the stored text.
    pub fn parse(&self) -> Result<PrimitiveDateTime, time::error::Parse> {
        PrimitiveDateTime::parse(&self.0, Self::FORMAT)
    }
}

impl AsRef<str> for Timestamp {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short text description of what the transaction was for.
    pub title: String,
    /// The amount of money spent or earned, never negative.
    pub amount: f64,
    /// Whether the money was earned or spent.
    pub kind: Kind,
    /// The category the transaction belongs to.
    pub category: Category,
    /// When the transaction was recorded.
    pub timestamp: Timestamp,
}

impl Transaction {
    /// Parse the creation time of the transaction.
    ///
    /// # Errors
    ///
    /// Returns an [Error::CorruptRecord] if the stored timestamp is malformed.
    pub fn created_at(&self) -> Result<PrimitiveDateTime, Error> {
        self.timestamp.parse().map_err(|_| Error::CorruptRecord {
            id: self.id,
            field: "timestamp",
            value: self.timestamp.to_string(),
        })
    }

    /// Whether this is an expense.
    pub fn is_expense(&self) -> bool {
        self.kind == Kind::Expense
    }
}

/// The validated user-editable fields of a transaction.
///
/// Used both to create a transaction and to replace the fields of an
/// existing one. The timestamp is not part of this type, since edits never
/// change it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    title: String,
    amount: f64,
    kind: Kind,
    category: Category,
}

impl NewTransaction {
    /// Validate typed transaction fields.
    ///
    /// # Errors
    ///
    /// Returns a:
    /// - [ValidationError::EmptyTitle] if `title` is empty after trimming,
    /// - or [ValidationError::InvalidAmount] if `amount` is negative, NaN or infinite.
    pub fn new(title: &str, amount: f64, kind: Kind, category: Category) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }

        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidAmount(amount.to_string()).into());
        }

        Ok(Self {
            title: title.to_owned(),
            amount,
            kind,
            category,
        })
    }

    /// Validate transaction fields entered as text.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the title is empty, the amount is not a
    /// non-negative number, or the kind or category are not recognised.
    pub fn parse(title: &str, amount: &str, kind: &str, category: &str) -> Result<Self, Error> {
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }

        let parsed_amount: f64 = amount
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidAmount(amount.to_owned()))?;

        if !parsed_amount.is_finite() || parsed_amount < 0.0 {
            return Err(ValidationError::InvalidAmount(amount.to_owned()).into());
        }

        let kind = kind.parse()?;
        let category = category.parse()?;

        Self::new(title, parsed_amount, kind, category)
    }

    /// The trimmed title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The validated amount.
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// The transaction kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The transaction category.
    pub fn category(&self) -> Category {
        self.category
    }
}
