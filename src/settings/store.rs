//! Defines the settings store trait and its SQLite implementation.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::{
    DEFAULT_PIN, Error, SecretHash, ValidatedPin, ValidationError,
    settings::{
        Currency, DEFAULT_SECURITY_ANSWER, DEFAULT_SECURITY_QUESTION, SecurityQuestion, Settings,
    },
};

/// Reads and updates the single settings record.
pub trait SettingsStore {
    /// Retrieve the whole settings record.
    fn get_settings(&self) -> Result<Settings, Error>;

    /// The currency amounts are displayed in.
    fn get_currency(&self) -> Result<Currency, Error>;

    /// Change the display currency.
    fn set_currency(&mut self, currency: Currency) -> Result<(), Error>;

    /// The monthly budget, zero when unset.
    fn get_budget(&self) -> Result<f64, Error>;

    /// Change the monthly budget. Zero clears it.
    fn set_budget(&mut self, amount: f64) -> Result<(), Error>;

    /// The hash of the current PIN.
    fn get_pin(&self) -> Result<SecretHash, Error>;

    /// Check `candidate` against the stored PIN.
    fn verify_pin(&self, candidate: &str) -> Result<bool, Error>;

    /// Change the PIN after checking the old one.
    fn set_pin(&mut self, old: &str, new: &str, confirm: &str) -> Result<(), Error>;

    /// The PIN recovery question and the hash of its answer.
    fn get_security_qa(&self) -> Result<SecurityQuestion, Error>;

    /// Replace the PIN recovery question and answer.
    fn set_security_qa(&mut self, question: &str, answer: &str) -> Result<(), Error>;

    /// Check an answer to the security question, resetting the PIN to
    /// [DEFAULT_PIN] if it matches.
    fn verify_security_answer(&mut self, candidate: &str) -> Result<bool, Error>;
}

/// Stores the settings record in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteSettingsStore {
    connection: Arc<Mutex<Connection>>,
    hash_cost: u32,
}

impl SQLiteSettingsStore {
    /// Create a new store for the SQLite `connection` that hashes new
    /// credentials with [SecretHash::DEFAULT_COST].
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            connection,
            hash_cost: SecretHash::DEFAULT_COST,
        }
    }

    /// Use `hash_cost` rounds when hashing new credentials.
    ///
    /// Lower costs are only intended for tests.
    pub fn with_hash_cost(mut self, hash_cost: u32) -> Self {
        self.hash_cost = hash_cost;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)
    }

    fn update_pin_hash(&self, pin_hash: &SecretHash) -> Result<(), Error> {
        self.lock()?.execute(
            "UPDATE settings SET pin_hash = ?1 WHERE id = 1",
            (pin_hash.as_ref(),),
        )?;

        Ok(())
    }
}

impl SettingsStore for SQLiteSettingsStore {
    /// Retrieve the settings record.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::CorruptSettings] if the record is missing or has an unknown currency,
    /// - or [Error::SqlError] if there is some other SQL error.
    fn get_settings(&self) -> Result<Settings, Error> {
        let (currency, monthly_budget, pin_hash, question, answer_hash) = self
            .lock()?
            .query_row(
                "SELECT currency, monthly_budget, pin_hash, security_question, security_answer_hash
                 FROM settings WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .map_err(|error| match error {
                rusqlite::Error::QueryReturnedNoRows => {
                    Error::CorruptSettings("the settings row is missing".to_owned())
                }
                error => error.into(),
            })?;

        let currency = currency
            .parse()
            .map_err(|_| Error::CorruptSettings(format!("unknown currency \"{currency}\"")))?;

        Ok(Settings {
            currency,
            monthly_budget,
            pin_hash: SecretHash::new_unchecked(&pin_hash),
            security_question: SecurityQuestion {
                question,
                answer_hash: SecretHash::new_unchecked(&answer_hash),
            },
        })
    }

    fn get_currency(&self) -> Result<Currency, Error> {
        Ok(self.get_settings()?.currency)
    }

    fn set_currency(&mut self, currency: Currency) -> Result<(), Error> {
        self.lock()?.execute(
            "UPDATE settings SET currency = ?1 WHERE id = 1",
            (currency.code(),),
        )?;

        tracing::debug!("Set currency to {currency}");

        Ok(())
    }

    fn get_budget(&self) -> Result<f64, Error> {
        Ok(self.get_settings()?.monthly_budget)
    }

    /// Change the monthly budget.
    ///
    /// # Errors
    /// Returns a [ValidationError::InvalidBudget] if `amount` is negative or
    /// not a finite number.
    fn set_budget(&mut self, amount: f64) -> Result<(), Error> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidBudget(amount.to_string()).into());
        }

        self.lock()?.execute(
            "UPDATE settings SET monthly_budget = ?1 WHERE id = 1",
            (amount,),
        )?;

        tracing::debug!("Set monthly budget to {amount}");

        Ok(())
    }

    fn get_pin(&self) -> Result<SecretHash, Error> {
        Ok(self.get_settings()?.pin_hash)
    }

    fn verify_pin(&self, candidate: &str) -> Result<bool, Error> {
        let is_match = self.get_pin()?.verify_pin(candidate)?;

        if !is_match {
            tracing::warn!("Rejected an incorrect PIN");
        }

        Ok(is_match)
    }

    /// Change the PIN.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidPin] if `old` does not match the stored PIN,
    /// - [ValidationError::PinTooShort] if `new` is too short,
    /// - or [ValidationError::PinMismatch] if `new` and `confirm` differ.
    ///
    /// The stored PIN is unchanged on error.
    fn set_pin(&mut self, old: &str, new: &str, confirm: &str) -> Result<(), Error> {
        if !self.verify_pin(old)? {
            return Err(Error::InvalidPin);
        }

        let pin = ValidatedPin::new(new)?;

        if new != confirm {
            return Err(ValidationError::PinMismatch.into());
        }

        self.update_pin_hash(&SecretHash::from_pin(pin, self.hash_cost)?)?;

        tracing::info!("Changed the PIN");

        Ok(())
    }

    fn get_security_qa(&self) -> Result<SecurityQuestion, Error> {
        Ok(self.get_settings()?.security_question)
    }

    /// Replace the security question and answer.
    ///
    /// # Errors
    /// Returns a [ValidationError::EmptySecurityQuestion] or
    /// [ValidationError::EmptySecurityAnswer] if either is blank.
    fn set_security_qa(&mut self, question: &str, answer: &str) -> Result<(), Error> {
        let question = question.trim();

        if question.is_empty() {
            return Err(ValidationError::EmptySecurityQuestion.into());
        }

        if answer.trim().is_empty() {
            return Err(ValidationError::EmptySecurityAnswer.into());
        }

        let answer_hash = SecretHash::from_answer(answer, self.hash_cost)?;

        self.lock()?.execute(
            "UPDATE settings SET security_question = ?1, security_answer_hash = ?2 WHERE id = 1",
            (question, answer_hash.as_ref()),
        )?;

        tracing::info!("Changed the security question");

        Ok(())
    }

    fn verify_security_answer(&mut self, candidate: &str) -> Result<bool, Error> {
        let security_question = self.get_security_qa()?;

        if !security_question.answer_hash.verify_answer(candidate)? {
            tracing::warn!("Rejected an incorrect security answer");
            return Ok(false);
        }

        let default_pin =
            SecretHash::from_pin(ValidatedPin::new_unchecked(DEFAULT_PIN), self.hash_cost)?;
        self.update_pin_hash(&default_pin)?;

        tracing::info!("Reset the PIN to the factory default");

        Ok(true)
    }
}

/// Create the settings table in the database.
///
/// The `CHECK` constraint keeps the table to a single row.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                currency TEXT NOT NULL,
                monthly_budget REAL NOT NULL,
                pin_hash TEXT NOT NULL,
                security_question TEXT NOT NULL,
                security_answer_hash TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Seed the settings record with the factory defaults if it does not exist yet.
///
/// # Errors
/// Returns an [Error::HashingError] if the default credentials cannot be
/// hashed, or an [Error::SqlError] if there is an SQL error.
pub fn insert_default_settings(connection: &Connection, hash_cost: u32) -> Result<(), Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM settings", [], |row| row.get(0))?;

    if count > 0 {
        return Ok(());
    }

    let pin_hash = SecretHash::from_pin(ValidatedPin::new_unchecked(DEFAULT_PIN), hash_cost)?;
    let answer_hash = SecretHash::from_answer(DEFAULT_SECURITY_ANSWER, hash_cost)?;

    connection.execute(
        "INSERT INTO settings
            (id, currency, monthly_budget, pin_hash, security_question, security_answer_hash)
         VALUES (1, ?1, 0.0, ?2, ?3, ?4)",
        (
            Currency::default().code(),
            pin_hash.as_ref(),
            DEFAULT_SECURITY_QUESTION,
            answer_hash.as_ref(),
        ),
    )?;

    tracing::info!("Created the default settings");

    Ok(())
}
