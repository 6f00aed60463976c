//! Display formatting for terminal output

pub mod account;
pub mod budget;
pub mod transaction;

pub use account::{format_account_details, format_account_list, format_balance_check};
pub use budget::{format_envelope_list, format_envelope_summary, format_month_overview};
pub use transaction::{format_transaction_details, format_transaction_list, Names};
