//! Transaction display formatting

use std::collections::HashMap;

use crate::models::{Account, AccountId, Envelope, EnvelopeId, Transaction};

/// Id to name lookups used when rendering transactions
#[derive(Debug, Default)]
pub struct Names {
    accounts: HashMap<AccountId, String>,
    envelopes: HashMap<EnvelopeId, String>,
}

impl Names {
    pub fn new(accounts: &[Account], envelopes: &[Envelope]) -> Self {
        Self {
            accounts: accounts.iter().map(|a| (a.id, a.name.clone())).collect(),
            envelopes: envelopes.iter().map(|e| (e.id, e.name.clone())).collect(),
        }
    }

    pub fn account(&self, id: AccountId) -> String {
        self.accounts
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn envelope(&self, id: EnvelopeId) -> String {
        self.envelopes
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Envelope column: one name, "Split (n)", or empty
    fn envelope_column(&self, txn: &Transaction) -> String {
        if txn.is_split() {
            format!("Split ({})", txn.splits.len())
        } else {
            txn.envelope_id.map(|id| self.envelope(id)).unwrap_or_default()
        }
    }
}

pub fn format_transaction_list(
    transactions: &[Transaction],
    names: &Names,
    symbol: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<10}  {:<14}  {:<25}  {:<16}  {:>14}  {}\n",
        "ID", "Date", "Account", "Kind", "Envelope", "Amount", "Payee"
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<10}  {:-<14}  {:-<25}  {:-<16}  {:->14}  {:-<10}\n",
        "", "", "", "", "", "", ""
    ));

    for txn in transactions {
        output.push_str(&format!(
            "{:<12}  {:<10}  {:<14}  {:<25}  {:<16}  {:>14}  {}\n",
            txn.id.to_string(),
            txn.date.format("%Y-%m-%d").to_string(),
            truncate(&names.account(txn.account_id), 14),
            txn.kind,
            truncate(&names.envelope_column(txn), 16),
            txn.balance_delta().format_with_symbol(symbol),
            txn.payee,
        ));
    }

    output
}

pub fn format_transaction_details(txn: &Transaction, names: &Names, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("  Date:     {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!("  Account:  {}\n", names.account(txn.account_id)));
    output.push_str(&format!("  Kind:     {}\n", txn.kind));
    output.push_str(&format!(
        "  Amount:   {}\n",
        txn.balance_delta().format_with_symbol(symbol)
    ));

    if let Some(envelope_id) = txn.envelope_id {
        output.push_str(&format!("  Envelope: {}\n", names.envelope(envelope_id)));
    }
    for item in &txn.splits {
        output.push_str(&format!(
            "    - {}: {}",
            names.envelope(item.envelope_id),
            item.amount.format_with_symbol(symbol)
        ));
        if !item.note.is_empty() {
            output.push_str(&format!(" ({})", item.note));
        }
        output.push('\n');
    }

    if !txn.payee.is_empty() {
        output.push_str(&format!("  Payee:    {}\n", txn.payee));
    }
    if !txn.note.is_empty() {
        output.push_str(&format!("  Note:     {}\n", txn.note));
    }
    if let Some(linked) = txn.transfer_transaction_id {
        output.push_str(&format!("  Linked:   {}\n", linked));
    }

    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, Money, SplitItem, TransactionKind};
    use chrono::NaiveDate;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Groceries", 16), "Groceries");
        assert_eq!(truncate("A very long envelope name", 6), "A ver…");
    }

    #[test]
    fn test_list_shows_names_and_signed_amounts() {
        let account = Account::new("Checking", AccountType::Checking);
        let envelope = Envelope::new("Groceries", "Living");
        let names = Names::new(std::slice::from_ref(&account), std::slice::from_ref(&envelope));

        let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let expense = Transaction::expense(account.id, envelope.id, Money::from_cents(1999), date);
        let mut split =
            Transaction::new(account.id, TransactionKind::Expense, Money::from_cents(300), date);
        split.splits = vec![
            SplitItem::new(envelope.id, Money::from_cents(100)),
            SplitItem::new(EnvelopeId::new(), Money::from_cents(200)),
        ];

        let output = format_transaction_list(&[expense, split], &names, "");
        assert!(output.contains("Checking"));
        assert!(output.contains("Groceries"));
        assert!(output.contains("-19.99"));
        assert!(output.contains("Split (2)"));
    }
}
