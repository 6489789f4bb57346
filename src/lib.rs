//! Pocket Planner is a single-user personal finance tracker.
//!
//! This library provides:
//! - a SQLite backed [RecordStore] for income and expense entries,
//! - a [SettingsStore] for the currency, monthly budget and PIN credentials,
//! - the [aggregation] functions that compute totals, breakdowns and monthly
//!   roll-ups from a snapshot of every record,
//! - and the [report] formatter that turns those aggregates into chart series
//!   and printable documents.
//!
//! The `planner` binary is a thin command line front end over these pieces.

#![warn(missing_docs)]

pub mod aggregation;
mod app_state;
pub mod backup;
mod database_id;
mod db;
mod logging;
mod pin;
pub mod report;
mod settings;
mod timezone;
mod transaction;

pub use app_state::PocketPlanner;
pub use database_id::TransactionId;
pub use db::initialize;
pub use logging::setup_logging;
pub use pin::{DEFAULT_PIN, MINIMUM_PIN_LENGTH, SecretHash, ValidatedPin};
pub use settings::{
    Currency, DEFAULT_SECURITY_ANSWER, DEFAULT_SECURITY_QUESTION, SQLiteSettingsStore,
    SecurityQuestion, Settings, SettingsStore,
};
pub use timezone::{get_local_offset, local_now};
pub use transaction::{
    Category, Kind, NewTransaction, RecordStore, SQLiteRecordStore, Timestamp, Transaction,
};

/// Input that was rejected before it reached the database.
///
/// These errors are recoverable: the caller should correct the input and try
/// again.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    /// A transaction title was empty or only whitespace.
    #[error("the title cannot be empty")]
    EmptyTitle,

    /// An amount was not a non-negative, finite number.
    #[error("\"{0}\" is not a valid amount, enter a number that is zero or greater")]
    InvalidAmount(String),

    /// The text did not name a transaction kind.
    #[error("\"{0}\" is not a valid transaction type, expected Income or Expense")]
    InvalidKind(String),

    /// The text did not name one of the fixed categories.
    #[error("\"{0}\" is not a valid category")]
    InvalidCategory(String),

    /// The text did not name a supported currency.
    #[error("\"{0}\" is not a supported currency")]
    InvalidCurrency(String),

    /// A monthly budget was negative or not a number.
    #[error("\"{0}\" is not a valid budget, enter a number that is zero or greater")]
    InvalidBudget(String),

    /// A new PIN was shorter than [MINIMUM_PIN_LENGTH].
    #[error("the PIN must be at least {MINIMUM_PIN_LENGTH} characters long")]
    PinTooShort,

    /// The new PIN and its confirmation differ.
    #[error("the new PIN and the confirmation PIN do not match")]
    PinMismatch,

    /// The security question was empty.
    #[error("the security question cannot be empty")]
    EmptySecurityQuestion,

    /// The security answer was empty.
    #[error("the security answer cannot be empty")]
    EmptySecurityAnswer,

    /// The text did not name a listing sort order.
    #[error("\"{0}\" is not a sort order, expected latest, oldest, highest or lowest")]
    InvalidSortKey(String),

    /// The text did not name a calendar month (or "All").
    #[error("\"{0}\" is not a month name")]
    InvalidMonth(String),
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The caller provided malformed or out-of-range input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested transaction was not found.
    ///
    /// The caller should re-fetch the list of transactions, the record may
    /// have already been deleted.
    #[error("the requested transaction could not be found")]
    NotFound,

    /// The PIN entered by the user did not match the stored PIN.
    #[error("the PIN is incorrect")]
    InvalidPin,

    /// A stored transaction has a field that cannot be read back.
    ///
    /// Aggregations that hit this error fail as a whole rather than skipping
    /// the record, since skipping would silently produce wrong totals.
    #[error("transaction {id} has an unreadable {field} \"{value}\"")]
    CorruptRecord {
        /// The ID of the offending transaction.
        id: TransactionId,
        /// The name of the field that could not be parsed.
        field: &'static str,
        /// The raw stored value.
        value: String,
    },

    /// The settings row is missing or holds a value that cannot be read.
    #[error("the settings record is unreadable: {0}")]
    CorruptSettings(String),

    /// An unexpected error occurred with the underlying hashing library.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a report as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// An error occurred while writing a report as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// A file could not be read, written or copied.
    #[error("file operation failed: {0}")]
    IoError(String),
}

/// The broad class of an [Error], used by front ends to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input, the user should correct it and retry.
    Validation,
    /// The referenced record does not exist.
    NotFound,
    /// A credential did not match.
    Auth,
    /// Persisted data cannot be read. Not recoverable locally.
    DataCorruption,
    /// Any other failure (SQL, I/O, hashing, serialization).
    Internal,
}

impl Error {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::InvalidTimezoneError(_) => ErrorKind::Validation,
            Error::NotFound => ErrorKind::NotFound,
            Error::InvalidPin => ErrorKind::Auth,
            Error::CorruptRecord { .. } | Error::CorruptSettings(_) => ErrorKind::DataCorruption,
            Error::HashingError(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::JSONSerializationError(_)
            | Error::CsvError(_)
            | Error::IoError(_) => ErrorKind::Internal,
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::IoError(value.to_string())
    }
}

#[cfg(test)]
mod error_tests {
    use crate::{Error, ErrorKind, ValidationError};

    #[test]
    fn no_rows_maps_to_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
        assert_eq!(error.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            Error::from(ValidationError::EmptyTitle).kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::InvalidPin.kind(), ErrorKind::Auth);
        assert_eq!(
            Error::CorruptRecord {
                id: 1,
                field: "timestamp",
                value: "yesterday".to_owned()
            }
            .kind(),
            ErrorKind::DataCorruption
        );
        assert_eq!(Error::DatabaseLockError.kind(), ErrorKind::Internal);
    }

    #[test]
    fn validation_message_is_shown_unchanged() {
        let error = Error::from(ValidationError::PinMismatch);

        assert_eq!(
            error.to_string(),
            "the new PIN and the confirmation PIN do not match"
        );
    }
}
