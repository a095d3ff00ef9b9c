use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

const DOCUMENT: &str = r#"{
    "paragraphs": [
        { "fragments": [
            { "text": "Chapter ", "format": { "bold": true } },
            { "text": "1. DEFIN" },
            { "text": "ITIONS" }
        ]}
    ]
}"#;

const REPLACE_CHANGES: &str = r#"[
    {
        "change_id": "CHG-001",
        "operation": "REPLACE",
        "target_text": "1. DEFINITIONS",
        "payload": { "new_text": "1. TERMS" },
        "description": "Rename the definitions chapter"
    }
]"#;

#[test]
fn apply_requires_a_changes_source() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("doc.json");
    input.write_str(DOCUMENT).unwrap();

    cmd()
        .arg("--file")
        .arg(input.path())
        .arg("apply")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Either --changes-file or --changes must be provided.",
        ));
}

#[test]
fn apply_fails_on_a_missing_changes_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("doc.json");
    input.write_str(DOCUMENT).unwrap();

    cmd()
        .arg("--file")
        .arg(input.path())
        .arg("apply")
        .arg("--changes-file")
        .arg("missing.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read changes file"));
}

#[test]
fn apply_rewrites_the_document_in_place_and_prints_the_report() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("doc.json");
    input.write_str(DOCUMENT).unwrap();
    let changes = temp.child("changes.json");
    changes.write_str(REPLACE_CHANGES).unwrap();

    cmd()
        .arg("--file")
        .arg(input.path())
        .arg("apply")
        .arg("--changes-file")
        .arg(changes.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"COMPLETED\""))
        .stdout(predicate::str::contains("\"successful\": 1"))
        .stdout(predicate::str::contains("\"change_id\": \"CHG-001\""));

    let content = std::fs::read_to_string(input.path()).unwrap();
    assert!(content.contains("1. TERMS"));
    assert!(!content.contains("DEFINITIONS"));
    // Untouched formatting survives the rewrite.
    assert!(content.contains("\"bold\": true"));
}

#[test]
fn apply_accepts_yaml_changes_and_writes_to_an_output_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("doc.json");
    input.write_str(DOCUMENT).unwrap();
    let changes = temp.child("changes.yaml");
    changes
        .write_str(
            r#"- change_id: CHG-001
  operation: DELETE
  target_text: "1. DEFINITIONS"
"#,
        )
        .unwrap();
    let output = temp.child("out.json");

    cmd()
        .arg("--file")
        .arg(input.path())
        .arg("--output")
        .arg(output.path())
        .arg("apply")
        .arg("--changes-file")
        .arg(changes.path())
        .assert()
        .success();

    // The original is untouched; the output carries the edit.
    let original = std::fs::read_to_string(input.path()).unwrap();
    assert!(original.contains("DEFIN"));
    let written = std::fs::read_to_string(output.path()).unwrap();
    assert!(!written.contains("DEFIN"));
    assert!(written.contains("Chapter "));
}

#[test]
fn dry_run_reports_without_writing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("doc.json");
    input.write_str(DOCUMENT).unwrap();

    cmd()
        .arg("--file")
        .arg(input.path())
        .arg("apply")
        .arg("--changes")
        .arg(REPLACE_CHANGES)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"successful\": 1"));

    let content = std::fs::read_to_string(input.path()).unwrap();
    assert_eq!(content, DOCUMENT, "dry run must not modify the document");
}

#[test]
fn diff_mode_prints_a_unified_diff_of_the_plain_text() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("doc.json");
    input.write_str(DOCUMENT).unwrap();

    cmd()
        .arg("--file")
        .arg(input.path())
        .arg("apply")
        .arg("--changes")
        .arg(REPLACE_CHANGES)
        .arg("--diff")
        .assert()
        .success()
        .stdout(predicate::str::contains("-Chapter 1. DEFINITIONS"))
        .stdout(predicate::str::contains("+Chapter 1. TERMS"));

    let content = std::fs::read_to_string(input.path()).unwrap();
    assert_eq!(content, DOCUMENT, "diff mode must not modify the document");
}

#[test]
fn report_flag_writes_the_summary_to_a_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("doc.json");
    input.write_str(DOCUMENT).unwrap();
    let report = temp.child("report.json");

    cmd()
        .arg("--file")
        .arg(input.path())
        .arg("apply")
        .arg("--changes")
        .arg(REPLACE_CHANGES)
        .arg("--report")
        .arg(report.path())
        .assert()
        .success();

    let written = std::fs::read_to_string(report.path()).unwrap();
    assert!(written.contains("\"total_changes\": 1"));
    assert!(written.contains("\"failed\": 0"));
}

#[test]
fn a_failed_change_is_reported_but_does_not_fail_the_process() {
    let temp = assert_fs::TempDir::new().unwrap();
    let input = temp.child("doc.json");
    input.write_str(DOCUMENT).unwrap();

    cmd()
        .arg("--file")
        .arg(input.path())
        .arg("apply")
        .arg("--changes")
        .arg(
            r#"[{ "change_id": "CHG-001", "operation": "REPLACE",
                  "target_text": "no such clause",
                  "payload": { "new_text": "x" } }]"#,
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("\"failed\": 1"))
        .stdout(predicate::str::contains("\"NOT_FOUND\""));
}

#[test]
fn stdin_document_requires_an_output_path() {
    cmd()
        .arg("apply")
        .arg("--changes")
        .arg(REPLACE_CHANGES)
        .write_stdin(DOCUMENT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires --output"));
}

#[test]
fn stdin_cannot_feed_both_document_and_changes() {
    cmd()
        .arg("apply")
        .arg("--changes-file")
        .arg("-")
        .write_stdin(DOCUMENT)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Cannot read both the source document and the changes from stdin.",
        ));
}
