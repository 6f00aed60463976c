use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ledger(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ledger").unwrap();
    cmd.env("ENVELOPE_LEDGER_DATA_DIR", dir.path())
        .env_remove("ENVELOPE_LEDGER_LOG");
    cmd
}

fn run(dir: &TempDir, args: &[&str]) -> String {
    let output = ledger(dir).args(args).assert().success();
    String::from_utf8(output.get_output().stdout.clone()).unwrap()
}

/// Pull the id printed on an "  ID: ..." line
fn printed_id(stdout: &str) -> String {
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("ID:"))
        .map(|id| id.trim().to_string())
        .unwrap()
}

/// Initialized ledger with one funded checking account and one envelope
fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    run(&dir, &["init"]);
    run(&dir, &["config", "--currency", "EUR"]);
    run(&dir, &["account", "create", "Checking", "--balance", "1000"]);
    run(&dir, &["envelope", "create", "Groceries", "--group", "Needs"]);
    dir
}

#[test]
fn test_init_and_config() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized ledger"));

    ledger(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Already initialized"));

    ledger(&dir)
        .args(["config", "--currency", "USD"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Currency symbol: USD"));
}

#[test]
fn test_account_create_and_list() {
    let dir = setup();

    ledger(&dir)
        .args(["account", "create", "Visa", "--type", "credit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created account: Visa"));

    ledger(&dir)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Checking").and(predicate::str::contains("Visa")));

    ledger(&dir)
        .args(["account", "create", "checking"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_assign_and_show_budget() {
    let dir = setup();

    ledger(&dir)
        .args(["budget", "assign", "Groceries", "200", "-a", "Checking", "-m", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Assigned 200.00 EUR"));

    ledger(&dir)
        .args(["budget", "show", "-m", "2025-03"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Budget for 2025-03")
                .and(predicate::str::contains("Ready to assign: 800.00 EUR"))
                .and(predicate::str::contains("Groceries")),
        );
}

#[test]
fn test_assign_more_than_pool_fails() {
    let dir = setup();

    ledger(&dir)
        .args(["budget", "assign", "Groceries", "5000", "-a", "Checking", "-m", "2025-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Insufficient funds"));

    ledger(&dir)
        .args(["account", "show", "Checking"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1000.00 EUR"));
}

#[test]
fn test_expense_updates_envelope_and_account() {
    let dir = setup();
    run(&dir, &["budget", "assign", "Groceries", "200", "-a", "Checking", "-m", "2025-03"]);

    run(
        &dir,
        &[
            "txn", "add", "45.50", "-a", "Checking", "-e", "Groceries", "-d", "2025-03-05", "-p",
            "Market",
        ],
    );

    ledger(&dir)
        .args(["envelope", "show", "Groceries", "-m", "2025-03"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Spent:       45.50 EUR")
                .and(predicate::str::contains("Remaining:   154.50 EUR")),
        );

    ledger(&dir)
        .args(["account", "show", "Checking"])
        .assert()
        .success()
        .stdout(predicate::str::contains("954.50 EUR"));

    ledger(&dir)
        .args(["txn", "list", "-a", "Checking"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Market"));
}

#[test]
fn test_delete_restores_balances() {
    let dir = setup();
    run(&dir, &["budget", "assign", "Groceries", "200", "-a", "Checking", "-m", "2025-03"]);
    let added = run(
        &dir,
        &["txn", "add", "60", "-a", "Checking", "-e", "Groceries", "-d", "2025-03-05"],
    );
    let id = printed_id(&added);

    ledger(&dir)
        .args(["txn", "delete", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    ledger(&dir)
        .args(["envelope", "show", "Groceries", "-m", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remaining:   200.00 EUR"));

    ledger(&dir)
        .args(["account", "show", "Checking"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1000.00 EUR"));

    ledger(&dir)
        .args(["txn", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_split_expense() {
    let dir = setup();
    run(&dir, &["envelope", "create", "Household"]);

    ledger(&dir)
        .args([
            "txn", "add", "30", "-a", "Checking", "-s", "Groceries=20", "-s", "Household=10", "-d",
            "2025-03-05",
        ])
        .assert()
        .success();

    ledger(&dir)
        .args(["envelope", "show", "Household", "-m", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spent:       10.00 EUR"));

    ledger(&dir)
        .args(["txn", "add", "30", "-a", "Checking", "-s", "Groceries=20", "-d", "2025-03-05"])
        .assert()
        .failure();
}

#[test]
fn test_transfer_between_accounts() {
    let dir = setup();
    run(&dir, &["account", "create", "Savings"]);

    ledger(&dir)
        .args(["txn", "transfer", "Checking", "Savings", "100", "-d", "2025-03-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transferred 100.00 EUR"));

    ledger(&dir)
        .args(["account", "show", "Savings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100.00 EUR"));

    ledger(&dir)
        .args(["txn", "list", "-k", "transfer-out"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transfer to Savings"));

    ledger(&dir)
        .args(["txn", "transfer", "Checking", "Checking", "5"])
        .assert()
        .failure();
}

#[test]
fn test_default_account() {
    let dir = setup();

    ledger(&dir)
        .args(["txn", "add", "10", "-e", "Groceries"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No account given"));

    run(&dir, &["config", "--default-account", "checking"]);

    ledger(&dir)
        .args(["txn", "add", "10", "-e", "Groceries"])
        .assert()
        .success()
        .stdout(predicate::str::contains("on 'Checking'"));
}

#[test]
fn test_audit_log() {
    let dir = setup();

    ledger(&dir)
        .args(["audit", "--count", "5"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("CREATE Account")
                .and(predicate::str::contains("CREATE Envelope")),
        );
}

#[test]
fn test_unknown_account_fails() {
    let dir = setup();

    ledger(&dir)
        .args(["account", "show", "Nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Account not found"));
}

#[test]
fn test_edit_reposts_amount() {
    let dir = setup();
    run(&dir, &["budget", "assign", "Groceries", "100", "-a", "Checking", "-m", "2025-03"]);
    let added = run(
        &dir,
        &["txn", "add", "20", "-a", "Checking", "-e", "Groceries", "-d", "2025-03-05"],
    );
    let id = printed_id(&added);

    ledger(&dir)
        .args(["txn", "edit", &id, "--amount", "25", "--payee", "Bakery"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Updated transaction {}", id)));

    ledger(&dir)
        .args(["envelope", "show", "Groceries", "-m", "2025-03"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Remaining:   75.00 EUR"));

    ledger(&dir)
        .args(["account", "check", "Checking"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Balance is consistent."));
}
