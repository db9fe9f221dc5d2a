use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SCENARIO: &str = "CITY OF TULSA\nTicket #: 00123\nWeight: 5,000\nTruck No: TR-9\nDriver: Jane Doe\nMonitor Name(Id): AB12\nDebris Type: Vegetative\n";

fn haul(dir: &Path) -> Command {
    let config = dir.join("config.json");
    if !config.exists() {
        fs::write(&config, "{}").unwrap();
    }
    let mut cmd = Command::cargo_bin("haul").unwrap();
    cmd.current_dir(dir).arg("--config").arg(&config);
    cmd
}

fn ticket_ids(dir: &Path) -> Vec<String> {
    let content = fs::read_to_string(dir.join("tickets.json")).unwrap();
    let records: serde_json::Value = serde_json::from_str(&content).unwrap();
    records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn extract_prints_fields_as_json() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("scan.txt"), SCENARIO).unwrap();

    haul(dir.path())
        .args(["extract", "scan.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""ticket_number":"00123""#))
        .stdout(predicate::str::contains(r#""weight_tons":"5000""#))
        .stdout(predicate::str::contains(r#""driver_badge":"AB12""#))
        .stdout(predicate::str::contains(r#""needs_fix":false"#));
}

#[test]
fn extract_reads_stdin_and_flags_missing_weight() {
    let dir = TempDir::new().unwrap();

    haul(dir.path())
        .args(["extract", "-", "--format", "text"])
        .write_stdin("Ticket: 987654\nDriver: Bo Li\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ticket:  987654"))
        .stdout(predicate::str::contains("needs fix"));
}

#[test]
fn extract_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    haul(dir.path())
        .args(["extract", "nope.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn ingest_review_and_export() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("uploads")).unwrap();
    fs::write(dir.path().join("uploads/t1.txt"), SCENARIO).unwrap();

    haul(dir.path())
        .args(["ingest", "uploads/t1.txt", "--uploader", "crew-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(pending)"));

    // A second upload of the same path is not recorded again
    haul(dir.path())
        .args(["ingest", "uploads/t1.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already ingested"));

    let ids = ticket_ids(dir.path());
    assert_eq!(ids.len(), 1);

    haul(dir.path())
        .args(["review", "approve", &ids[0]])
        .assert()
        .failure();

    haul(dir.path())
        .args(["review", "approve", &ids[0], "--user", "mgr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(approved)"));

    let today = chrono::Utc::now().date_naive().to_string();
    haul(dir.path())
        .args(["export", "--start", &today, "--end", &today])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ticket_number,date,driver"))
        .stdout(predicate::str::contains("00123"))
        .stdout(predicate::str::contains("approved,no"));
}

#[test]
fn manual_ticket_can_be_fixed() {
    let dir = TempDir::new().unwrap();

    haul(dir.path())
        .args(["review", "manual", "--ticket-number", "555", "--user", "mgr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(draft)"))
        .stdout(predicate::str::contains("missing"));

    let ids = ticket_ids(dir.path());
    haul(dir.path())
        .args(["review", "fix", &ids[0], "--weight", "7.25", "--user", "mgr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(pending)"));

    haul(dir.path())
        .args(["review", "list", "--status", "pending"])
        .assert()
        .success()
        .stdout(predicate::str::contains("555"));
}

#[test]
fn fix_queue_history_and_summary() {
    let dir = TempDir::new().unwrap();

    haul(dir.path())
        .args(["review", "manual", "--ticket-number", "TKT-901", "--user", "drv-1"])
        .assert()
        .success();
    haul(dir.path())
        .args(["review", "manual", "--ticket-number", "TKT-902", "--weight", "3", "--user", "drv-2"])
        .assert()
        .success();

    haul(dir.path())
        .args(["review", "list", "--fix-needed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TKT-901"))
        .stdout(predicate::str::contains("TKT-902").not());

    haul(dir.path())
        .args(["review", "list", "--history", "drv-2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TKT-902"))
        .stdout(predicate::str::contains("TKT-901").not());

    haul(dir.path())
        .args(["review", "summary"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Pending:\s+\S*1").unwrap())
        .stdout(predicate::str::contains("All tickets:     2"));
}

#[test]
fn export_rejects_inverted_range() {
    let dir = TempDir::new().unwrap();

    haul(dir.path())
        .args(["export", "--start", "2025-04-12", "--end", "2025-04-10"])
        .assert()
        .failure();
}
