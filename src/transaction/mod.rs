//! Transaction records for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated `NewTransaction` input
//! - The `RecordStore` trait and its SQLite implementation

mod core;
mod store;

pub use core::{Category, Kind, NewTransaction, Timestamp, Transaction};
pub use store::{RecordStore, SQLiteRecordStore, create_transaction_table};
