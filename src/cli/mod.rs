//! CLI command handlers
//!
//! Bridges the clap argument definitions with the service layer. Handlers
//! print their results and return `EnvelopeResult`.

pub mod account;
pub mod audit;
pub mod budget;
pub mod envelope;
pub mod transaction;

pub use account::{handle_account_command, AccountCommands};
pub use audit::handle_audit_command;
pub use budget::{handle_budget_command, BudgetCommands};
pub use envelope::{handle_envelope_command, EnvelopeCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::{Duration, Local, NaiveDate};

use crate::config::Settings;
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{Account, Money, Month};
use crate::services::AccountService;

pub(crate) fn parse_money(input: &str) -> EnvelopeResult<Money> {
    Money::parse(input).map_err(|e| {
        EnvelopeError::Validation(format!(
            "Invalid amount '{}': {}. Use a format like '12.50' or '12'",
            input, e
        ))
    })
}

/// Parse an optional month argument, defaulting to the current month
pub(crate) fn parse_month(input: Option<&str>) -> EnvelopeResult<Month> {
    match input {
        Some(s) => Month::parse(s).map_err(|e| EnvelopeError::Validation(e.to_string())),
        None => Ok(Month::current()),
    }
}

/// Parse an optional date argument, defaulting to today
///
/// Accepts the configured date format, ISO dates, "today" and "yesterday".
pub(crate) fn parse_date(input: Option<&str>, settings: &Settings) -> EnvelopeResult<NaiveDate> {
    let today = Local::now().date_naive();
    let Some(input) = input.map(str::trim) else {
        return Ok(today);
    };

    match input.to_lowercase().as_str() {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    NaiveDate::parse_from_str(input, &settings.date_format)
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| {
            EnvelopeError::Validation(format!(
                "Invalid date '{}'. Use YYYY-MM-DD",
                input
            ))
        })
}

/// The named account, or the configured default account
pub(crate) fn account_or_default(
    service: &AccountService<'_>,
    settings: &Settings,
    account: Option<&str>,
) -> EnvelopeResult<Account> {
    match account.or(settings.default_account.as_deref()) {
        Some(identifier) => service.resolve(identifier),
        None => Err(EnvelopeError::Validation(
            "No account given and no default account configured. \
             Pass --account or run 'ledger config --default-account NAME'"
                .into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let settings = Settings::default();
        assert_eq!(
            parse_date(Some("2025-03-14"), &settings).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
        );
        assert_eq!(
            parse_date(Some("yesterday"), &settings).unwrap(),
            parse_date(None, &settings).unwrap() - Duration::days(1)
        );
        assert!(parse_date(Some("14/03"), &settings).unwrap_err().is_validation());
    }

    #[test]
    fn test_custom_date_format() {
        let settings = Settings {
            date_format: "%d/%m/%Y".into(),
            ..Settings::default()
        };
        assert_eq!(
            parse_date(Some("14/03/2025"), &settings).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
        );
    }

    #[test]
    fn test_parse_money_and_month() {
        assert_eq!(parse_money("12.50").unwrap().cents(), 1250);
        assert!(parse_money("abc").unwrap_err().is_validation());
        assert_eq!(parse_month(Some("2025-02")).unwrap(), Month::new(2025, 2).unwrap());
        assert!(parse_month(Some("2025-13")).is_err());
    }
}
