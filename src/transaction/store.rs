//! Defines the record store trait and its SQLite implementation.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row};
use time::{PrimitiveDateTime, UtcOffset};

use crate::{
    Error,
    database_id::TransactionId,
    timezone::local_now,
    transaction::{Category, Kind, NewTransaction, Timestamp, Transaction},
};

/// Handles the creation, retrieval, editing and deletion of transactions.
pub trait RecordStore {
    /// Record a new transaction stamped with the current local time.
    ///
    /// Returns the ID of the new transaction, which is greater than every ID
    /// the store has handed out before.
    fn add(&mut self, new: NewTransaction) -> Result<TransactionId, Error>;

    /// Record a new transaction with an explicit creation time.
    fn add_at(
        &mut self,
        new: NewTransaction,
        created_at: PrimitiveDateTime,
    ) -> Result<TransactionId, Error>;

    /// Replace the title, amount, kind and category of a transaction.
    ///
    /// The timestamp is left untouched.
    fn update(&mut self, id: TransactionId, new: NewTransaction) -> Result<(), Error>;

    /// Delete a transaction.
    fn delete(&mut self, id: TransactionId) -> Result<(), Error>;

    /// Delete every transaction, returning how many were deleted.
    fn clear(&mut self) -> Result<usize, Error>;

    /// Retrieve a transaction by its ID.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve every transaction in storage order.
    fn list_all(&self) -> Result<Vec<Transaction>, Error>;

    /// Count the stored transactions.
    fn count(&self) -> Result<usize, Error>;
}

/// Stores transactions in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteRecordStore {
    connection: Arc<Mutex<Connection>>,
    offset: UtcOffset,
}

impl SQLiteRecordStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// `offset` is the local UTC offset used to stamp new transactions.
    pub fn new(connection: Arc<Mutex<Connection>>, offset: UtcOffset) -> Self {
        Self { connection, offset }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl RecordStore for SQLiteRecordStore {
    fn add(&mut self, new: NewTransaction) -> Result<TransactionId, Error> {
        let now = local_now(self.offset);
        self.add_at(new, now)
    }

    /// Insert a transaction.
    ///
    /// # Errors
    /// This function will return an [Error::SqlError] if there is some SQL error.
    fn add_at(
        &mut self,
        new: NewTransaction,
        created_at: PrimitiveDateTime,
    ) -> Result<TransactionId, Error> {
        let timestamp = Timestamp::from_datetime(created_at);

        let id = self
            .lock()?
            .prepare(
                "INSERT INTO \"transaction\" (title, amount, kind, category, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 RETURNING id",
            )?
            .query_row(
                (
                    new.title(),
                    new.amount(),
                    new.kind().as_str(),
                    new.category().as_str(),
                    timestamp.as_ref(),
                ),
                |row| row.get(0),
            )?;

        tracing::debug!("Created transaction {id} at {timestamp}");

        Ok(id)
    }

    /// Replace the editable fields of a transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a stored transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn update(&mut self, id: TransactionId, new: NewTransaction) -> Result<(), Error> {
        let rows_affected = self.lock()?.execute(
            "UPDATE \"transaction\"
             SET title = ?1, amount = ?2, kind = ?3, category = ?4
             WHERE id = ?5",
            (
                new.title(),
                new.amount(),
                new.kind().as_str(),
                new.category().as_str(),
                id,
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        tracing::debug!("Updated transaction {id}");

        Ok(())
    }

    /// Delete a transaction.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a stored transaction,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn delete(&mut self, id: TransactionId) -> Result<(), Error> {
        let rows_affected = self
            .lock()?
            .execute("DELETE FROM \"transaction\" WHERE id = ?1", (id,))?;

        if rows_affected == 0 {
            return Err(Error::NotFound);
        }

        tracing::debug!("Deleted transaction {id}");

        Ok(())
    }

    fn clear(&mut self) -> Result<usize, Error> {
        let rows_affected = self.lock()?.execute("DELETE FROM \"transaction\"", ())?;

        tracing::debug!("Deleted all {rows_affected} transactions");

        Ok(rows_affected)
    }

    /// Retrieve a transaction by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a stored transaction,
    /// - [Error::CorruptRecord] if the stored kind or category cannot be read,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error> {
        let row = self
            .lock()?
            .prepare(
                "SELECT id, title, amount, kind, category, created_at
                 FROM \"transaction\" WHERE id = :id",
            )?
            .query_one(&[(":id", &id)], map_transaction_row)?;

        row.try_into()
    }

    /// Retrieve every transaction, ordered by ID, i.e. the order they were added.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::CorruptRecord] if a stored kind or category cannot be read,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn list_all(&self) -> Result<Vec<Transaction>, Error> {
        let rows = self
            .lock()?
            .prepare(
                "SELECT id, title, amount, kind, category, created_at
                 FROM \"transaction\" ORDER BY id ASC",
            )?
            .query_map([], map_transaction_row)?
            .collect::<Result<Vec<_>, rusqlite::Error>>()?;

        rows.into_iter().map(Transaction::try_from).collect()
    }

    fn count(&self) -> Result<usize, Error> {
        self.lock()?
            .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
                row.get(0)
            })
            .map_err(|error| error.into())
    }
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                kind TEXT NOT NULL,
                category TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT INTO sqlite_sequence (name, seq)
         SELECT 'transaction', 0
         WHERE NOT EXISTS (SELECT 1 FROM sqlite_sequence WHERE name = 'transaction')",
        (),
    )?;

    Ok(())
}

/// A transaction row as stored, before the kind and category are parsed.
struct TransactionRow {
    id: TransactionId,
    title: String,
    amount: f64,
    kind: String,
    category: String,
    created_at: String,
}

fn map_transaction_row(row: &Row) -> Result<TransactionRow, rusqlite::Error> {
    Ok(TransactionRow {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        kind: row.get(3)?,
        category: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = Error;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let kind: Kind = row.kind.parse().map_err(|_| Error::CorruptRecord {
            id: row.id,
            field: "kind",
            value: row.kind.clone(),
        })?;
        let category: Category = row.category.parse().map_err(|_| Error::CorruptRecord {
            id: row.id,
            field: "category",
            value: row.category.clone(),
        })?;

        Ok(Transaction {
            id: row.id,
            title: row.title,
            amount: row.amount,
            kind,
            category,
            timestamp: Timestamp::new_unchecked(&row.created_at),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{UtcOffset, macros::datetime};

    use crate::{
        Category, Error, Kind, NewTransaction, RecordStore, SQLiteRecordStore, db::initialize,
    };

    fn get_test_store() -> SQLiteRecordStore {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn, 4).unwrap();
        SQLiteRecordStore::new(Arc::new(Mutex::new(conn)), UtcOffset::UTC)
    }

    fn lunch() -> NewTransaction {
        NewTransaction::new("Lunch", 12.5, Kind::Expense, Category::Food).unwrap()
    }

    #[test]
    fn add_then_get_returns_same_fields() {
        let mut store = get_test_store();

        let id = store.add_at(lunch(), datetime!(2025-10-05 12:30)).unwrap();
        let got = store.get(id).unwrap();

        assert_eq!(got.title, "Lunch");
        assert_eq!(got.amount, 12.5);
        assert_eq!(got.kind, Kind::Expense);
        assert_eq!(got.category, Category::Food);
        assert_eq!(got.timestamp.as_ref(), "05-10-2025 12:30");
    }

    #[test]
    fn ids_increase_monotonically() {
        let mut store = get_test_store();

        let first = store.add(lunch()).unwrap();
        let second = store.add(lunch()).unwrap();

        assert!(second > first);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut store = get_test_store();
        let first = store.add(lunch()).unwrap();
        let second = store.add(lunch()).unwrap();

        store.delete(second).unwrap();
        let third = store.add(lunch()).unwrap();

        assert!(third > second);
        assert!(third > first);
    }

    #[test]
    fn ids_are_not_reused_after_clear() {
        let mut store = get_test_store();
        let first = store.add(lunch()).unwrap();

        assert_eq!(store.clear(), Ok(1));
        let second = store.add(lunch()).unwrap();

        assert!(second > first);
        assert_eq!(store.count(), Ok(1));
    }

    #[test]
    fn update_replaces_fields_and_keeps_timestamp() {
        let mut store = get_test_store();
        let id = store.add_at(lunch(), datetime!(2025-01-02 08:00)).unwrap();
        let edit = NewTransaction::new("Salary", 3000.0, Kind::Income, Category::Salary).unwrap();

        store.update(id, edit).unwrap();
        let got = store.get(id).unwrap();

        assert_eq!(got.title, "Salary");
        assert_eq!(got.amount, 3000.0);
        assert_eq!(got.kind, Kind::Income);
        assert_eq!(got.category, Category::Salary);
        assert_eq!(got.timestamp.as_ref(), "02-01-2025 08:00");
    }

    #[test]
    fn update_missing_fails_with_not_found() {
        let mut store = get_test_store();

        assert_eq!(store.update(42, lunch()), Err(Error::NotFound));
    }

    #[test]
    fn delete_then_get_fails_with_not_found() {
        let mut store = get_test_store();
        let id = store.add(lunch()).unwrap();

        store.delete(id).unwrap();

        assert_eq!(store.get(id), Err(Error::NotFound));
    }

    #[test]
    fn delete_missing_fails_with_not_found() {
        let mut store = get_test_store();

        assert_eq!(store.delete(42), Err(Error::NotFound));
    }

    #[test]
    fn list_all_returns_insertion_order() {
        let mut store = get_test_store();
        let ids: Vec<_> = (0..3).map(|_| store.add(lunch()).unwrap()).collect();

        let got: Vec<_> = store.list_all().unwrap().iter().map(|t| t.id).collect();

        assert_eq!(got, ids);
    }

    #[test]
    fn list_all_reports_corrupt_category() {
        let store = get_test_store();
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO \"transaction\" (title, amount, kind, category, created_at)
                 VALUES ('Mystery', 1.0, 'Expense', 'Crypto', '01-01-2025 00:00')",
                (),
            )
            .unwrap();

        let result = store.list_all();

        assert!(matches!(
            result,
            Err(Error::CorruptRecord {
                field: "category",
                ..
            })
        ));
    }

    #[test]
    fn list_all_keeps_corrupt_timestamp_as_raw_text() {
        let store = get_test_store();
        store
            .lock()
            .unwrap()
            .execute(
                "INSERT INTO \"transaction\" (title, amount, kind, category, created_at)
                 VALUES ('Mystery', 1.0, 'Expense', 'Food', 'yesterday')",
                (),
            )
            .unwrap();

        let transactions = store.list_all().unwrap();

        assert_eq!(transactions[0].timestamp.as_ref(), "yesterday");
        assert!(transactions[0].created_at().is_err());
    }
}
