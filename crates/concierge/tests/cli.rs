#![cfg(feature = "cli")]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::{Value, json};

fn concierge() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("concierge");
    for var in [
        "SUPABASE_URL",
        "SUPABASE_ANON_KEY",
        "RESEND_API_KEY",
        "RESEND_FROM",
        "CONCIERGE_LOG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn valid_fields() -> Value {
    json!({
        "first_name": "Mere",
        "last_name": "Tane",
        "email": "mere@example.com",
        "phone": "+64 21 000 0000",
        "country": "other",
        "other_country": "Niue",
        "departure_country": "Niue",
        "departure_city": "Alofi",
        "travel_period": "Winter 2027",
        "surgery_type": "cosmetic",
        "quote_amount": 8000,
        "notes": "Prefer morning flights",
        "terms_accepted": true
    })
}

fn write_answers(dir: &TempDir, name: &str, fields: Value) -> std::path::PathBuf {
    let file = dir.child(name);
    file.write_str(
        &serde_json::to_string_pretty(&json!({
            "schema": "concierge-answers/v1",
            "fields": fields
        }))
        .unwrap(),
    )
    .unwrap();
    file.path().to_path_buf()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("temp paths are utf-8")
}

#[test]
fn form_prints_definition_and_schema() {
    concierge()
        .arg("form")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"concierge-interest\""))
        .stdout(predicate::str::contains("\"other_country\""));

    concierge()
        .args(["form", "--schema"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"additionalProperties\": false"));
}

#[test]
fn validate_accepts_complete_answers() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", valid_fields());
    concierge()
        .args(["validate", "--answers", path_arg(&answers)])
        .assert()
        .success()
        .stdout(predicate::str::contains("all 3 steps are valid"));
}

#[test]
fn validate_reports_field_errors_and_fails() {
    let dir = TempDir::new().unwrap();
    let mut fields = valid_fields();
    fields["email"] = json!("a@b");
    fields["phone"] = json!("abc");
    let answers = write_answers(&dir, "answers.json", fields);

    let output = concierge()
        .args(["validate", "--json", "--answers", path_arg(&answers)])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let result: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(result["valid"], false);
    assert_eq!(result["errors"]["email"]["code"], "invalid_email");
    assert_eq!(result["errors"]["phone"]["code"], "invalid_phone");
}

#[test]
fn wizard_submits_answers_in_dry_run() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", valid_fields());
    let output = concierge()
        .args(["wizard", "--dry-run", "--json", "--answers", path_arg(&answers)])
        .assert()
        .success()
        .stderr(predicate::str::contains("dry run"))
        .get_output()
        .stdout
        .clone();

    let report: Value = serde_json::from_slice(&output).unwrap();
    let code = report["reference_code"].as_str().unwrap();
    assert!(regex::Regex::new(r"^CC-[A-Z0-9]{6}$").unwrap().is_match(code));
    assert_eq!(report["persistence"]["status"], "succeeded");
    assert_eq!(report["notification"]["status"], "succeeded");
    assert_eq!(report["record"]["country"], "Niue");
    assert_eq!(report["record"]["payment_status"], "pending");
}

#[test]
fn wizard_prints_reference_code_without_json() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", valid_fields());
    concierge()
        .args(["wizard", "--answers", path_arg(&answers)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Your reference code is CC-"));
}

#[test]
fn wizard_uses_prefix_from_config() {
    let dir = TempDir::new().unwrap();
    let answers = write_answers(&dir, "answers.json", valid_fields());
    let config = dir.child("concierge.toml");
    config
        .write_str("[submission]\nreference_prefix = \"MT-\"\n")
        .unwrap();

    let output = concierge()
        .args([
            "wizard",
            "--json",
            "--config",
            path_arg(config.path()),
            "--answers",
            path_arg(&answers),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&output).unwrap();
    assert!(report["reference_code"].as_str().unwrap().starts_with("MT-"));
}

#[test]
fn wizard_stops_on_the_first_invalid_step() {
    let dir = TempDir::new().unwrap();
    let mut fields = valid_fields();
    fields["surgery_type"] = json!("dental");
    let answers = write_answers(&dir, "answers.json", fields);
    concierge()
        .args(["wizard", "--answers", path_arg(&answers)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step `travel` is invalid"))
        .stderr(predicate::str::contains("surgery_type"));
}

#[test]
fn wizard_rejects_unknown_schema_and_fields() {
    let dir = TempDir::new().unwrap();
    let wrong = dir.child("wrong.json");
    wrong
        .write_str(r#"{"schema":"concierge-answers/v0","fields":{}}"#)
        .unwrap();
    concierge()
        .args(["wizard", "--answers", path_arg(wrong.path())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("concierge-answers/v1"));

    let mut fields = valid_fields();
    fields["passport_number"] = json!("X123");
    let answers = write_answers(&dir, "extra.json", fields);
    concierge()
        .args(["wizard", "--answers", path_arg(&answers)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("passport_number"));
}

#[test]
fn wizard_needs_answers_without_a_terminal() {
    concierge()
        .arg("wizard")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--answers"));
}

#[test]
fn missing_answers_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(!fs::exists(&missing).unwrap());
    concierge()
        .args(["validate", "--answers", path_arg(&missing)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read answers"));
}
