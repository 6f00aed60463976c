use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use envelope_ledger::cli::{
    handle_account_command, handle_audit_command, handle_budget_command,
    handle_envelope_command, handle_transaction_command,
};
use envelope_ledger::config::{EnvelopePaths, Settings};
use envelope_ledger::logging;
use envelope_ledger::services::AccountService;
use envelope_ledger::storage::Storage;

#[derive(Parser)]
#[command(
    name = "ledger",
    version,
    about = "Envelope budgeting ledger",
    long_about = "Track accounts, hand money out to envelopes month by month, \
                  and record transactions whose effects flow through to both \
                  account balances and envelope allocations."
)]
struct Cli {
    /// Increase diagnostic output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and settings
    Init,

    /// Show or change configuration
    Config {
        /// Currency symbol shown after amounts
        #[arg(long)]
        currency: Option<String>,
        /// Account used when a command omits --account
        #[arg(long)]
        default_account: Option<String>,
    },

    /// Account management commands
    #[command(subcommand)]
    Account(envelope_ledger::cli::AccountCommands),

    /// Envelope management commands
    #[command(subcommand)]
    Envelope(envelope_ledger::cli::EnvelopeCommands),

    /// Assign, release and move envelope money
    #[command(subcommand)]
    Budget(envelope_ledger::cli::BudgetCommands),

    /// Transaction management commands
    #[command(subcommand, name = "txn", alias = "transaction")]
    Transaction(envelope_ledger::cli::TransactionCommands),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        count: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let paths = EnvelopePaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    debug!(data_dir = %paths.data_dir().display(), "resolved paths");

    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Init) => {
            let already = storage.is_initialized();
            settings.save(&paths)?;
            if already {
                println!("Already initialized at: {}", paths.base_dir().display());
            } else {
                println!("Initialized ledger at: {}", paths.base_dir().display());
                println!();
                println!("Next steps:");
                println!("  ledger account create Checking --balance 1000");
                println!("  ledger envelope create Groceries --group Needs");
                println!("  ledger budget assign Groceries 200 --account Checking");
            }
        }
        Some(Commands::Config {
            currency,
            default_account,
        }) => {
            let changed = currency.is_some() || default_account.is_some();
            if let Some(currency) = currency {
                settings.currency_symbol = currency;
            }
            if let Some(identifier) = default_account {
                let account = AccountService::new(&storage).resolve(&identifier)?;
                settings.default_account = Some(account.name);
            }
            if changed {
                settings.save(&paths)?;
                println!("Configuration saved.");
                println!();
            }

            println!("Ledger Configuration");
            println!("====================");
            let paths = storage.paths();
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
            println!(
                "  Default account: {}",
                settings.default_account.as_deref().unwrap_or("(none)")
            );
        }
        Some(Commands::Account(cmd)) => {
            handle_account_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Envelope(cmd)) => {
            handle_envelope_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            handle_budget_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Transaction(cmd)) => {
            handle_transaction_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Audit { count }) => {
            handle_audit_command(&storage, count)?;
        }
        None => {
            println!("ledger - envelope budgeting from the command line");
            println!();
            println!("Run 'ledger --help' for usage information.");
            println!("Run 'ledger init' to get started.");
        }
    }

    Ok(())
}
