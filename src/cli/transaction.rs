//! Transaction CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_transaction_details, format_transaction_list, Names};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{SplitItem, TransactionKind};
use crate::services::{
    AccountService, EnvelopeService, RegisterTransactionInput, TransactionChanges,
    TransactionFilter, TransactionService, TransferService,
};
use crate::storage::Storage;

use super::{account_or_default, parse_date, parse_money, parse_month};

#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction
    Add {
        /// Amount (always positive; the kind decides the direction)
        amount: String,
        /// Kind: expense, income, loan, loan-repayment-received, borrowing,
        /// borrowing-repayment-given, payment
        #[arg(short, long, default_value = "expense")]
        kind: String,
        /// Account name or ID (defaults to the configured account)
        #[arg(short, long)]
        account: Option<String>,
        /// Envelope for an expense
        #[arg(short, long)]
        envelope: Option<String>,
        /// Split part as ENVELOPE=AMOUNT (repeat for each part)
        #[arg(short, long = "split", conflicts_with = "envelope")]
        splits: Vec<String>,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        payee: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Change a transaction
    Edit {
        /// Transaction ID (full or short)
        id: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(short, long)]
        kind: Option<String>,
        #[arg(short, long)]
        account: Option<String>,
        #[arg(short, long)]
        envelope: Option<String>,
        /// Drop the envelope assignment
        #[arg(long, conflicts_with_all = ["envelope", "splits"])]
        no_envelope: bool,
        /// Replace the split parts, as ENVELOPE=AMOUNT
        #[arg(short, long = "split", conflicts_with = "envelope")]
        splits: Vec<String>,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        payee: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Delete a transaction (both halves of a transfer)
    Delete {
        /// Transaction ID (full or short)
        id: String,
    },
    /// List transactions, newest first
    List {
        #[arg(short, long)]
        account: Option<String>,
        #[arg(short, long)]
        envelope: Option<String>,
        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,
        #[arg(short, long)]
        kind: Option<String>,
        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show transaction details
    Show {
        /// Transaction ID (full or short)
        id: String,
    },
    /// Move money between two accounts
    Transfer {
        /// Source account
        from: String,
        /// Destination account
        to: String,
        amount: String,
        #[arg(short, long)]
        date: Option<String>,
        #[arg(short, long)]
        note: Option<String>,
    },
}

fn parse_kind(input: &str) -> EnvelopeResult<TransactionKind> {
    TransactionKind::parse(input).ok_or_else(|| {
        EnvelopeError::Validation(format!(
            "Invalid transaction kind: '{}'. Valid kinds: expense, income, loan, \
             loan-repayment-received, borrowing, borrowing-repayment-given, payment",
            input
        ))
    })
}

/// Parse "ENVELOPE=AMOUNT" parts; the last '=' separates the amount
fn parse_splits(
    envelopes: &EnvelopeService<'_>,
    parts: &[String],
) -> EnvelopeResult<Vec<SplitItem>> {
    parts
        .iter()
        .map(|part| {
            let (name, amount) = part.rsplit_once('=').ok_or_else(|| {
                EnvelopeError::Validation(format!(
                    "Invalid split '{}'. Use ENVELOPE=AMOUNT",
                    part
                ))
            })?;
            let envelope = envelopes.resolve(name.trim())?;
            Ok(SplitItem::new(envelope.id, parse_money(amount.trim())?))
        })
        .collect()
}

pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> EnvelopeResult<()> {
    let service = TransactionService::new(storage);
    let accounts = AccountService::new(storage);
    let envelopes = EnvelopeService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    let names = || -> EnvelopeResult<Names> {
        Ok(Names::new(&accounts.list(true)?, &envelopes.list(true)?))
    };

    match cmd {
        TransactionCommands::Add {
            amount,
            kind,
            account,
            envelope,
            splits,
            date,
            payee,
            note,
        } => {
            let account = account_or_default(&accounts, settings, account.as_deref())?;
            let mut input = RegisterTransactionInput::new(
                account.id,
                parse_kind(&kind)?,
                parse_money(&amount)?,
                parse_date(date.as_deref(), settings)?,
            );
            input.envelope_id = envelope
                .map(|e| envelopes.resolve(&e).map(|found| found.id))
                .transpose()?;
            input.splits = parse_splits(&envelopes, &splits)?;
            input.payee = payee;
            input.note = note;

            let txn = service.register(input)?;
            println!(
                "Recorded {} of {} on '{}'",
                txn.kind,
                txn.amount.format_with_symbol(symbol),
                account.name
            );
            println!("  ID: {}", txn.id);
        }

        TransactionCommands::Edit {
            id,
            amount,
            kind,
            account,
            envelope,
            no_envelope,
            splits,
            date,
            payee,
            note,
        } => {
            let txn = service.resolve(&id)?;

            // A single envelope and splits replace each other
            let (envelope_id, splits) = match (envelope, splits.is_empty()) {
                _ if no_envelope => (Some(None), Some(Vec::new())),
                (Some(e), _) => (Some(Some(envelopes.resolve(&e)?.id)), Some(Vec::new())),
                (None, false) => (Some(None), Some(parse_splits(&envelopes, &splits)?)),
                (None, true) => (None, None),
            };

            let changes = TransactionChanges {
                account_id: account
                    .map(|a| accounts.resolve(&a).map(|found| found.id))
                    .transpose()?,
                kind: kind.map(|k| parse_kind(&k)).transpose()?,
                amount: amount.map(|a| parse_money(&a)).transpose()?,
                date: date
                    .map(|d| parse_date(Some(d.as_str()), settings))
                    .transpose()?,
                envelope_id,
                splits,
                payee,
                note,
            };

            let updated = service.modify(txn.id, changes)?;
            println!("Updated transaction {}", updated.id);
            print!("{}", format_transaction_details(&updated, &names()?, symbol));
        }

        TransactionCommands::Delete { id } => {
            let txn = service.resolve(&id)?;
            let deleted = service.delete(txn.id)?;
            for removed in &deleted {
                println!(
                    "Deleted {} of {} ({})",
                    removed.kind,
                    removed.amount.format_with_symbol(symbol),
                    removed.id
                );
            }
        }

        TransactionCommands::List {
            account,
            envelope,
            month,
            kind,
            limit,
        } => {
            let mut filter = TransactionFilter::new().limit(limit);
            if let Some(account) = account {
                filter = filter.account(accounts.resolve(&account)?.id);
            }
            if let Some(envelope) = envelope {
                filter = filter.envelope(envelopes.resolve(&envelope)?.id);
            }
            if month.is_some() {
                filter = filter.month(parse_month(month.as_deref())?);
            }
            if let Some(kind) = kind {
                filter = filter.kind(parse_kind(&kind)?);
            }

            let transactions = service.list(filter)?;
            print!(
                "{}",
                format_transaction_list(&transactions, &names()?, symbol)
            );
        }

        TransactionCommands::Show { id } => {
            let txn = service.resolve(&id)?;
            print!("{}", format_transaction_details(&txn, &names()?, symbol));
        }

        TransactionCommands::Transfer {
            from,
            to,
            amount,
            date,
            note,
        } => {
            let from = accounts.resolve(&from)?;
            let to = accounts.resolve(&to)?;
            let amount = parse_money(&amount)?;
            let date = parse_date(date.as_deref(), settings)?;

            let result =
                TransferService::new(storage).transfer(from.id, to.id, amount, date, note)?;
            println!(
                "Transferred {} from '{}' to '{}'",
                amount.format_with_symbol(symbol),
                from.name,
                to.name
            );
            println!("  Outflow ID: {}", result.from_transaction.id);
            println!("  Inflow ID:  {}", result.to_transaction.id);
        }
    }

    Ok(())
}
