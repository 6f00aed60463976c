//! Account CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_account_details, format_account_list, format_balance_check};
use crate::error::{EnvelopeError, EnvelopeResult};
use crate::models::AccountType;
use crate::services::AccountService;
use crate::storage::Storage;

use super::parse_money;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create a new account
    Create {
        /// Account name
        name: String,
        /// Account type (checking, credit, debt, investment)
        #[arg(short = 't', long = "type", default_value = "checking")]
        account_type: String,
        /// Opening balance (e.g. "1000.00"); on a checking account it is ready to assign
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        balance: String,
    },
    /// List accounts
    List {
        /// Include archived accounts
        #[arg(short, long)]
        all: bool,
    },
    /// Show account details
    Show {
        /// Account name or ID
        account: String,
    },
    /// Rename an account
    Rename {
        /// Account name or ID
        account: String,
        /// New name
        new_name: String,
    },
    /// Archive an account
    Archive {
        /// Account name or ID
        account: String,
    },
    /// Unarchive an account
    Unarchive {
        /// Account name or ID
        account: String,
    },
    /// Recompute balances from the transaction history and report drift
    Check {
        /// Account name or ID (all active accounts when omitted)
        account: Option<String>,
    },
}

pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    cmd: AccountCommands,
) -> EnvelopeResult<()> {
    let service = AccountService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        AccountCommands::Create {
            name,
            account_type,
            balance,
        } => {
            let account_type = AccountType::parse(&account_type).ok_or_else(|| {
                EnvelopeError::Validation(format!(
                    "Invalid account type: '{}'. Valid types: checking, credit, debt, investment",
                    account_type
                ))
            })?;
            let opening_balance = parse_money(&balance)?;

            let account = service.create(&name, account_type, opening_balance)?;

            println!("Created account: {}", account.name);
            println!("  Type: {}", account.account_type);
            println!(
                "  Opening balance: {}",
                account.opening_balance.format_with_symbol(symbol)
            );
            println!("  ID: {}", account.id);
        }

        AccountCommands::List { all } => {
            let accounts = service.list(all)?;
            print!("{}", format_account_list(&accounts, symbol));
        }

        AccountCommands::Show { account } => {
            let found = service.resolve(&account)?;
            print!("{}", format_account_details(&found, symbol));
        }

        AccountCommands::Rename { account, new_name } => {
            let found = service.resolve(&account)?;
            let renamed = service.rename(found.id, &new_name)?;
            println!("Renamed account '{}' to '{}'", found.name, renamed.name);
        }

        AccountCommands::Archive { account } => {
            let found = service.resolve(&account)?;
            let archived = service.archive(found.id)?;
            println!("Archived account: {}", archived.name);
        }

        AccountCommands::Unarchive { account } => {
            let found = service.resolve(&account)?;
            let unarchived = service.unarchive(found.id)?;
            println!("Unarchived account: {}", unarchived.name);
        }

        AccountCommands::Check { account } => {
            let accounts = match account {
                Some(identifier) => vec![service.resolve(&identifier)?],
                None => service.list(false)?,
            };

            if accounts.is_empty() {
                println!("No accounts found.");
            }
            for account in accounts {
                let check = service.check_balance(account.id)?;
                print!("{}", format_balance_check(&check, symbol));
            }
        }
    }

    Ok(())
}
