//! Sets up the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    settings::{create_settings_table, insert_default_settings},
    transaction::create_transaction_table,
};

/// Create the application tables if they do not exist and seed the settings
/// record with the factory defaults.
///
/// Calling this on an already initialized database leaves its data untouched.
/// `hash_cost` is the bcrypt cost used to hash the default PIN and security
/// answer.
///
/// # Errors
/// Returns an error if a table cannot be created, the defaults cannot be
/// hashed or there is some other SQL error.
pub fn initialize(connection: &Connection, hash_cost: u32) -> Result<(), Error> {
    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    create_settings_table(&transaction)?;
    insert_default_settings(&transaction, hash_cost)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    fn count_rows(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn initialize_creates_single_settings_row() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn, 4).unwrap();

        assert_eq!(count_rows(&conn, "settings"), 1);
        assert_eq!(count_rows(&conn, "transaction"), 0);
    }

    #[test]
    fn initialize_twice_keeps_data() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn, 4).unwrap();
        conn.execute(
            "INSERT INTO \"transaction\" (title, amount, kind, category, created_at)
             VALUES ('Rent', 900.0, 'Expense', 'Bills', '01-10-2025 09:00')",
            (),
        )
        .unwrap();
        conn.execute("UPDATE settings SET currency = 'USD'", ())
            .unwrap();

        initialize(&conn, 4).unwrap();

        assert_eq!(count_rows(&conn, "settings"), 1);
        assert_eq!(count_rows(&conn, "transaction"), 1);
        let currency: String = conn
            .query_row("SELECT currency FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(currency, "USD");
    }

    #[test]
    fn settings_table_rejects_second_row() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn, 4).unwrap();

        let result = conn.execute(
            "INSERT INTO settings
                (id, currency, monthly_budget, pin_hash, security_question, security_answer_hash)
             VALUES (2, 'INR', 0.0, 'x', 'q', 'a')",
            (),
        );

        assert!(result.is_err());
    }
}
