//! Core settings types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, SecretHash, ValidationError};

/// The question new databases are seeded with.
pub const DEFAULT_SECURITY_QUESTION: &str = "What is your favourite color?";

/// The answer to [DEFAULT_SECURITY_QUESTION] new databases are seeded with.
pub const DEFAULT_SECURITY_ANSWER: &str = "pink";

/// The currencies amounts can be displayed in.
///
/// Amounts are stored as plain magnitudes, so changing the currency only
/// changes how they are labelled.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Inr,
    Usd,
    Eur,
    Gbp,
    Jpy,
}

impl Currency {
    /// Every supported currency.
    pub const ALL: [Currency; 5] = [
        Currency::Inr,
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
    ];

    /// The ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
        }
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();

        Currency::ALL
            .into_iter()
            .find(|currency| currency.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ValidationError::InvalidCurrency(s.to_owned()).into())
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The security question used to recover a forgotten PIN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityQuestion {
    /// The question shown to the user.
    pub question: String,
    /// The hash of the normalised answer.
    pub answer_hash: SecretHash,
}

/// A snapshot of the settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// The currency amounts are displayed in.
    pub currency: Currency,
    /// The monthly spending budget, zero when unset.
    pub monthly_budget: f64,
    /// The hash of the app PIN.
    pub pin_hash: SecretHash,
    /// The PIN recovery question.
    pub security_question: SecurityQuestion,
}

#[cfg(test)]
mod tests {
    use crate::{Currency, Error, ValidationError};

    #[test]
    fn currency_parses_case_insensitively() {
        assert_eq!("usd".parse::<Currency>(), Ok(Currency::Usd));
        assert_eq!(" JPY ".parse::<Currency>(), Ok(Currency::Jpy));
    }

    #[test]
    fn currency_rejects_unknown_code() {
        assert_eq!(
            "AUD".parse::<Currency>(),
            Err(Error::Validation(ValidationError::InvalidCurrency(
                "AUD".to_owned()
            )))
        );
    }

    #[test]
    fn default_currency_is_inr() {
        assert_eq!(Currency::default(), Currency::Inr);
    }
}
