//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use crate::models::Account;
use crate::services::BalanceCheck;

/// Format a list of accounts as a table
pub fn format_account_list(accounts: &[Account], symbol: &str) -> String {
    if accounts.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let name_width = accounts
        .iter()
        .map(|a| a.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<10}  {:>14}  {:>14}  {}\n",
        "Name",
        "Type",
        "Balance",
        "To assign",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<10}  {:->14}  {:->14}  {:-<8}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for account in accounts {
        let pool = if account.account_type.has_ready_to_assign() {
            account.ready_to_assign.format_with_symbol(symbol)
        } else {
            "-".to_string()
        };
        output.push_str(&format!(
            "{:<name_width$}  {:<10}  {:>14}  {:>14}  {}\n",
            account.name,
            account.account_type,
            account.balance.format_with_symbol(symbol),
            pool,
            if account.archived { "Archived" } else { "Active" },
            name_width = name_width,
        ));
    }

    output
}

/// Format one account in detail
pub fn format_account_details(account: &Account, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  ID:              {}\n", account.id));
    output.push_str(&format!("  Type:            {}\n", account.account_type));
    output.push_str(&format!(
        "  Opening balance: {}\n",
        account.opening_balance.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Balance:         {}\n",
        account.balance.format_with_symbol(symbol)
    ));
    if account.account_type.has_ready_to_assign() {
        output.push_str(&format!(
            "  Ready to assign: {}\n",
            account.ready_to_assign.format_with_symbol(symbol)
        ));
    }
    if account.archived {
        output.push_str("  Status:          Archived\n");
    }
    output.push_str(&format!(
        "  Created:         {}\n",
        account.created_at.format("%Y-%m-%d %H:%M")
    ));
    output
}

pub fn format_balance_check(check: &BalanceCheck, symbol: &str) -> String {
    let mut output = format!(
        "{}: stored {} / expected {} ({} transactions)\n",
        check.account.name,
        check.account.balance.format_with_symbol(symbol),
        check.expected.format_with_symbol(symbol),
        check.transaction_count
    );
    if check.is_consistent() {
        output.push_str("Balance is consistent.\n");
    } else {
        output.push_str(&format!(
            "Drift of {} detected.\n",
            check.drift().format_with_symbol(symbol)
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, Money};

    #[test]
    fn test_empty_list() {
        assert_eq!(format_account_list(&[], "€"), "No accounts found.\n");
    }

    #[test]
    fn test_pool_only_shown_for_checking() {
        let checking = Account::with_opening_balance(
            "Checking",
            AccountType::Checking,
            Money::from_cents(1250),
        );
        let card = Account::new("Card", AccountType::Credit);

        let output = format_account_list(&[checking, card], "€");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].contains("12.50 €"));
        assert!(lines[3].contains(" - "));
    }
}
