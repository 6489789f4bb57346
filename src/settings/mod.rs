//! The single settings record: display currency, monthly budget and the
//! credentials that guard the app.

mod core;
mod store;

pub use core::{
    Currency, DEFAULT_SECURITY_ANSWER, DEFAULT_SECURITY_QUESTION, SecurityQuestion, Settings,
};
pub use store::{SQLiteSettingsStore, SettingsStore, create_settings_table, insert_default_settings};
