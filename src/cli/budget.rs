//! Budget CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_envelope_summary, format_month_overview};
use crate::error::EnvelopeResult;
use crate::services::{AccountService, BudgetService, EnvelopeService};
use crate::storage::Storage;

use super::{account_or_default, parse_money, parse_month};

#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Assign money from an account's ready-to-assign pool to an envelope
    Assign {
        /// Envelope name or ID
        envelope: String,
        /// Amount to assign
        amount: String,
        /// Source checking account (defaults to the configured account)
        #[arg(short, long)]
        account: Option<String>,
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Return money from an envelope to an account's ready-to-assign pool
    Release {
        envelope: String,
        amount: String,
        #[arg(short, long)]
        account: Option<String>,
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Move money between envelopes
    Move {
        /// Source envelope
        from: String,
        /// Destination envelope
        to: String,
        amount: String,
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Show the budget for a month, or one envelope
    Show {
        /// Only this envelope
        envelope: Option<String>,
        #[arg(short, long)]
        month: Option<String>,
    },
}

pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BudgetCommands,
) -> EnvelopeResult<()> {
    let budget = BudgetService::new(storage);
    let envelopes = EnvelopeService::new(storage);
    let accounts = AccountService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BudgetCommands::Assign {
            envelope,
            amount,
            account,
            month,
        } => {
            let envelope = envelopes.resolve(&envelope)?;
            let account = account_or_default(&accounts, settings, account.as_deref())?;
            let month = parse_month(month.as_deref())?;
            let amount = parse_money(&amount)?;

            budget.assign(account.id, envelope.id, month, amount)?;
            println!(
                "Assigned {} to '{}' for {} from '{}'",
                amount.format_with_symbol(symbol),
                envelope.name,
                month,
                account.name
            );
        }

        BudgetCommands::Release {
            envelope,
            amount,
            account,
            month,
        } => {
            let envelope = envelopes.resolve(&envelope)?;
            let account = account_or_default(&accounts, settings, account.as_deref())?;
            let month = parse_month(month.as_deref())?;
            let amount = parse_money(&amount)?;

            budget.release(envelope.id, account.id, month, amount)?;
            println!(
                "Released {} from '{}' for {} to '{}'",
                amount.format_with_symbol(symbol),
                envelope.name,
                month,
                account.name
            );
        }

        BudgetCommands::Move {
            from,
            to,
            amount,
            month,
        } => {
            let from = envelopes.resolve(&from)?;
            let to = envelopes.resolve(&to)?;
            let month = parse_month(month.as_deref())?;
            let amount = parse_money(&amount)?;

            budget.move_funds(from.id, to.id, month, amount)?;
            println!(
                "Moved {} from '{}' to '{}' for {}",
                amount.format_with_symbol(symbol),
                from.name,
                to.name,
                month
            );
        }

        BudgetCommands::Show { envelope, month } => {
            let month = parse_month(month.as_deref())?;
            match envelope {
                Some(identifier) => {
                    let envelope = envelopes.resolve(&identifier)?;
                    let summary = budget.envelope_summary(envelope.id, month)?;
                    print!("{}", format_envelope_summary(&summary, symbol));
                }
                None => {
                    let overview = budget.month_overview(month)?;
                    print!("{}", format_month_overview(&overview, symbol));
                }
            }
        }
    }

    Ok(())
}
