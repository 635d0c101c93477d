#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn blogforge(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("blogforge").unwrap();
    cmd.current_dir(dir.path())
        .env("BLOGFORGE_DB", dir.path().join("content.redb"))
        .env_remove("GENAI_BASE_URL");
    cmd
}

// ---------------------------------------------------------------------------
// blogforge keyword
// ---------------------------------------------------------------------------

#[test]
fn keyword_add_and_list() {
    let dir = TempDir::new().unwrap();

    blogforge(&dir)
        .args(["keyword", "add", "pickleball courts", "--priority", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pickleball courts"));

    blogforge(&dir)
        .args(["keyword", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pickleball courts"))
        .stdout(predicate::str::contains("pending"));
}

#[test]
fn keyword_import_from_json_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("keywords.json");
    std::fs::write(
        &file,
        r#"[
            {"text": "indoor pickleball", "priority": 3},
            {"text": "paddle reviews", "intent": "commercial"},
            {"text": "   "}
        ]"#,
    )
    .unwrap();

    blogforge(&dir)
        .args(["keyword", "import"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("imported 2 keywords"));

    blogforge(&dir)
        .args(["keyword", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("indoor pickleball"))
        .stdout(predicate::str::contains("paddle reviews"));
}

#[test]
fn keyword_import_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    blogforge(&dir)
        .args(["keyword", "import", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// ---------------------------------------------------------------------------
// blogforge run --dry-run
// ---------------------------------------------------------------------------

#[test]
fn dry_run_produces_a_post_without_touching_the_database() {
    let dir = TempDir::new().unwrap();

    blogforge(&dir)
        .args(["run", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created draft post"));

    // The real database was never opened, so there is nothing to list.
    blogforge(&dir)
        .args(["post", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created draft post").not());
}

#[test]
fn dry_run_json_reports_the_outcome() {
    let dir = TempDir::new().unwrap();

    let output = blogforge(&dir)
        .args(["--json", "run", "--dry-run"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["success"], true);
    assert!(value["post_id"].is_string());
    assert!(value["tokens"].as_u64().unwrap() > 0);
}

// ---------------------------------------------------------------------------
// blogforge run against an empty queue
// ---------------------------------------------------------------------------

#[test]
fn run_with_empty_queue_fails() {
    let dir = TempDir::new().unwrap();

    blogforge(&dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("pipeline run failed"));
}

// ---------------------------------------------------------------------------
// blogforge job / post lookups
// ---------------------------------------------------------------------------

#[test]
fn job_list_starts_empty() {
    let dir = TempDir::new().unwrap();

    blogforge(&dir)
        .args(["--json", "job", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn post_show_unknown_slug_fails() {
    let dir = TempDir::new().unwrap();

    blogforge(&dir)
        .args(["post", "show", "no-such-post"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-post"));
}
