//! Bundles the record and settings stores that share one database connection.

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;
use time::{Date, UtcOffset};

use crate::{
    Error, RecordStore, SQLiteRecordStore, SQLiteSettingsStore, SecretHash, Settings,
    SettingsStore, Transaction,
    aggregation::{BudgetUsage, budget_usage},
    db::initialize,
};

/// The state of the application: both stores over a single SQLite connection.
#[derive(Debug, Clone)]
pub struct PocketPlanner {
    records: SQLiteRecordStore,
    settings: SQLiteSettingsStore,
}

impl PocketPlanner {
    /// Open (or create) the database at `path` and initialize its tables.
    ///
    /// `offset` is the local UTC offset used to stamp new transactions.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open(path: &Path, offset: UtcOffset) -> Result<Self, Error> {
        let connection = Connection::open(path)?;

        tracing::debug!("Opened database at {}", path.display());

        Self::from_connection(connection, offset, SecretHash::DEFAULT_COST)
    }

    /// Initialize the tables on `connection` and build the stores over it.
    ///
    /// `hash_cost` is used whenever a PIN or security answer is hashed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn from_connection(
        connection: Connection,
        offset: UtcOffset,
        hash_cost: u32,
    ) -> Result<Self, Error> {
        initialize(&connection, hash_cost)?;

        let connection = Arc::new(Mutex::new(connection));

        Ok(Self {
            records: SQLiteRecordStore::new(connection.clone(), offset),
            settings: SQLiteSettingsStore::new(connection).with_hash_cost(hash_cost),
        })
    }

    /// The transaction records.
    pub fn records(&self) -> &SQLiteRecordStore {
        &self.records
    }

    /// The transaction records, for editing.
    pub fn records_mut(&mut self) -> &mut SQLiteRecordStore {
        &mut self.records
    }

    /// The settings record.
    pub fn settings(&self) -> &SQLiteSettingsStore {
        &self.settings
    }

    /// The settings record, for editing.
    pub fn settings_mut(&mut self) -> &mut SQLiteSettingsStore {
        &mut self.settings
    }

    /// Read every transaction together with the current settings.
    ///
    /// Aggregations and reports work on this snapshot rather than on the
    /// stores directly.
    ///
    /// # Errors
    /// Returns an error if either store cannot be read.
    pub fn snapshot(&self) -> Result<(Vec<Transaction>, Settings), Error> {
        Ok((self.records.list_all()?, self.settings.get_settings()?))
    }

    /// The budget usage for the month containing `today`, or `None` if it
    /// cannot be computed.
    ///
    /// Used around record mutations to raise budget alerts. A failure is
    /// logged and never stops the mutation.
    pub fn try_budget_usage(&self, today: Date) -> Option<BudgetUsage> {
        let result = self
            .snapshot()
            .and_then(|(transactions, settings)| {
                budget_usage(&transactions, settings.monthly_budget, today)
            });

        match result {
            Ok(usage) => Some(usage),
            Err(error) => {
                tracing::warn!("Could not check the monthly budget: {error}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{
        UtcOffset,
        macros::{date, datetime},
    };

    use crate::{
        Category, Currency, Kind, NewTransaction, PocketPlanner, RecordStore, SettingsStore,
        aggregation::BudgetUsage, initialize,
    };

    fn get_test_planner() -> PocketPlanner {
        let conn = Connection::open_in_memory().unwrap();
        PocketPlanner::from_connection(conn, UtcOffset::UTC, 4).unwrap()
    }

    #[test]
    fn stores_share_the_connection() {
        let mut planner = get_test_planner();
        let new = NewTransaction::new("Bus", 3.0, Kind::Expense, Category::Travel).unwrap();

        planner
            .records_mut()
            .add_at(new, datetime!(2025-06-01 07:45))
            .unwrap();
        planner.settings_mut().set_currency(Currency::Gbp).unwrap();

        let (transactions, settings) = planner.snapshot().unwrap();

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].title, "Bus");
        assert_eq!(settings.currency, Currency::Gbp);
    }

    #[test]
    fn budget_usage_covers_current_month() {
        let mut planner = get_test_planner();
        planner.settings_mut().set_budget(1000.0).unwrap();
        let new = NewTransaction::new("Rent", 1200.0, Kind::Expense, Category::Bills).unwrap();
        planner
            .records_mut()
            .add_at(new, datetime!(2025-06-01 07:45))
            .unwrap();

        let usage = planner.try_budget_usage(date!(2025 - 06 - 15));

        assert_eq!(usage, Some(BudgetUsage::from_spent(1000.0, 1200.0)));
    }

    #[test]
    fn corrupt_timestamp_does_not_block_adding() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn, 4).unwrap();
        conn.execute(
            "INSERT INTO \"transaction\" (title, amount, kind, category, created_at)
             VALUES ('Mystery', 5.0, 'Expense', 'Other', 'yesterday')",
            (),
        )
        .unwrap();
        let mut planner = PocketPlanner::from_connection(conn, UtcOffset::UTC, 4).unwrap();
        planner.settings_mut().set_budget(1000.0).unwrap();

        assert_eq!(planner.try_budget_usage(date!(2025 - 06 - 15)), None);

        let new = NewTransaction::new("Lunch", 12.5, Kind::Expense, Category::Food).unwrap();
        let id = planner.records_mut().add(new).unwrap();

        assert_eq!(planner.records().get(id).unwrap().title, "Lunch");
        assert_eq!(planner.try_budget_usage(date!(2025 - 06 - 15)), None);
    }

    #[test]
    fn open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("planner.db");

        let planner = PocketPlanner::open(&path, UtcOffset::UTC).unwrap();

        assert!(path.is_file());
        assert_eq!(planner.records().count(), Ok(0));
    }
}
