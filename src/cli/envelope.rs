//! Envelope CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_envelope_list, format_envelope_summary};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::{Cadence, Objective};
use crate::services::{BudgetService, EnvelopeService};
use crate::storage::Storage;

use super::{parse_money, parse_month};

#[derive(Subcommand)]
pub enum EnvelopeCommands {
    /// Create a new envelope
    Create {
        /// Envelope name
        name: String,
        /// Group the envelope belongs to
        #[arg(short, long)]
        group: Option<String>,
        /// Objective amount
        #[arg(short, long)]
        objective: Option<String>,
        /// Objective cadence: monthly, yearly or a YYYY-MM-DD target date
        #[arg(short, long, default_value = "monthly")]
        cadence: String,
    },
    /// List envelopes grouped
    List {
        /// Include archived envelopes
        #[arg(short, long)]
        all: bool,
    },
    /// Show an envelope's state for a month
    Show {
        /// Envelope name or ID
        envelope: String,
        /// Month (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Rename an envelope
    Rename {
        envelope: String,
        new_name: String,
    },
    /// Move an envelope to another group
    Regroup {
        envelope: String,
        group: String,
    },
    /// Set or clear an envelope's objective
    Objective {
        /// Envelope name or ID
        envelope: String,
        /// Objective amount
        amount: Option<String>,
        /// Cadence: monthly, yearly or a YYYY-MM-DD target date
        #[arg(short, long, default_value = "monthly")]
        cadence: String,
        /// Remove the objective
        #[arg(long, conflicts_with = "amount")]
        clear: bool,
    },
    /// Archive an envelope
    Archive { envelope: String },
    /// Unarchive an envelope
    Unarchive { envelope: String },
}

fn parse_objective(amount: &str, cadence: &str) -> EnvelopeResult<Objective> {
    let amount = parse_money(amount)?;
    let cadence = Cadence::parse(cadence).ok_or_else(|| {
        EnvelopeError::Validation(format!(
            "Invalid cadence '{}'. Use monthly, yearly or YYYY-MM-DD",
            cadence
        ))
    })?;
    Ok(Objective::new(amount, cadence))
}

pub fn handle_envelope_command(
    storage: &Storage,
    settings: &Settings,
    cmd: EnvelopeCommands,
) -> EnvelopeResult<()> {
    let service = EnvelopeService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        EnvelopeCommands::Create {
            name,
            group,
            objective,
            cadence,
        } => {
            let objective = objective
                .map(|amount| parse_objective(&amount, &cadence))
                .transpose()?;
            let envelope = service.create(&name, group.as_deref(), objective)?;

            println!("Created envelope: {} ({})", envelope.name, envelope.group);
            if let Some(objective) = &envelope.objective {
                println!(
                    "  Objective: {} {}",
                    objective.amount.format_with_symbol(symbol),
                    objective.cadence
                );
            }
            println!("  ID: {}", envelope.id);
        }

        EnvelopeCommands::List { all } => {
            let envelopes = service.list(all)?;
            print!("{}", format_envelope_list(&envelopes, symbol));
        }

        EnvelopeCommands::Show { envelope, month } => {
            let found = service.resolve(&envelope)?;
            let month = parse_month(month.as_deref())?;
            let summary = BudgetService::new(storage).envelope_summary(found.id, month)?;
            print!("{}", format_envelope_summary(&summary, symbol));
        }

        EnvelopeCommands::Rename { envelope, new_name } => {
            let found = service.resolve(&envelope)?;
            let renamed = service.rename(found.id, &new_name)?;
            println!("Renamed envelope '{}' to '{}'", found.name, renamed.name);
        }

        EnvelopeCommands::Regroup { envelope, group } => {
            let found = service.resolve(&envelope)?;
            let moved = service.regroup(found.id, &group)?;
            println!("Moved envelope '{}' to group '{}'", moved.name, moved.group);
        }

        EnvelopeCommands::Objective {
            envelope,
            amount,
            cadence,
            clear,
        } => {
            let found = service.resolve(&envelope)?;
            let objective = match (amount, clear) {
                (_, true) => None,
                (Some(amount), false) => Some(parse_objective(&amount, &cadence)?),
                (None, false) => {
                    return Err(EnvelopeError::Validation(
                        "Give an objective amount, or --clear to remove it".into(),
                    ))
                }
            };

            let updated = service.set_objective(found.id, objective)?;
            match &updated.objective {
                Some(objective) => println!(
                    "Objective for '{}' set to {} {}",
                    updated.name,
                    objective.amount.format_with_symbol(symbol),
                    objective.cadence
                ),
                None => println!("Objective for '{}' cleared", updated.name),
            }
        }

        EnvelopeCommands::Archive { envelope } => {
            let found = service.resolve(&envelope)?;
            let archived = service.archive(found.id)?;
            println!("Archived envelope: {}", archived.name);
        }

        EnvelopeCommands::Unarchive { envelope } => {
            let found = service.resolve(&envelope)?;
            let unarchived = service.unarchive(found.id)?;
            println!("Unarchived envelope: {}", unarchived.name);
        }
    }

    Ok(())
}
