//! CLI smoke tests against the built binary

use assert_cmd::Command;
use predicates::prelude::*;

fn card_pricer() -> Command {
    let mut cmd = Command::cargo_bin("card-pricer").unwrap();
    cmd.env("RUST_LOG", "card_pricer=info");
    cmd
}

#[test]
fn test_help_lists_commands() {
    card_pricer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch"))
        .stdout(predicate::str::contains("sets"))
        .stdout(predicate::str::contains("lookup"));
}

#[test]
fn test_lookup_help_asks_for_raw_collector_number() {
    card_pricer()
        .args(["lookup", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exactly as Scryfall lists it"))
        .stdout(predicate::str::contains("123★"));
}

#[test]
fn test_sets_list_filters_catalog() {
    card_pricer()
        .args(["sets", "list", "mkm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MKM"))
        .stdout(predicate::str::contains("OTJ").not());
}

#[test]
fn test_sets_list_json() {
    let output = card_pricer()
        .args(["sets", "list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["schema_version"], "1.0");
    assert!(value["count"].as_u64().unwrap() > 200);
    assert_eq!(
        value["sets"].as_array().unwrap().len() as u64,
        value["count"].as_u64().unwrap()
    );
}

#[test]
fn test_sets_overrides() {
    card_pricer()
        .args(["sets", "overrides"])
        .assert()
        .success()
        .stdout(predicate::str::contains("XED -> 10E"));
}

#[test]
fn test_fetch_rejects_split_out_of_range() {
    card_pricer()
        .args(["fetch", "MKM", "--combined", "--split", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("split threshold 10 must be between 1000 and 100000"));
}

#[test]
fn test_fetch_rejects_unknown_set() {
    let temp = tempfile::tempdir().unwrap();
    card_pricer()
        .args(["fetch", "NOPE", "--output-dir"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown set code: NOPE"));
    assert!(!temp.path().join("NOPE_prices.csv").exists());
}

#[test]
fn test_fetch_requires_a_selection() {
    card_pricer().arg("fetch").assert().failure();
}

#[test]
fn test_fetch_unreachable_api_records_failure() {
    let temp = tempfile::tempdir().unwrap();
    let output = card_pricer()
        .args([
            "--base-url",
            "http://127.0.0.1:9",
            "--max-retries",
            "0",
            "fetch",
            "MKM",
            "--json",
            "--format",
            "item-wizard",
            "--output-dir",
        ])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["status"], "completed");
    assert_eq!(report["succeeded"], 0);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["outcomes"][0]["outcome"], "failure");
    assert_eq!(report["outcomes"][0]["set_code"], "MKM");
    assert!(!temp.path().join("MKM_prices.csv").exists());
}
