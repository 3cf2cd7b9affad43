//! End-to-end tests of the docwarden binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    dir: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        self.cmd_for("docs")
    }

    fn cmd_for(&self, collection: &str) -> Command {
        let mut cmd = Command::cargo_bin("docwarden").unwrap();
        cmd.env("DOCWARDEN_CONFIG", self.dir.path().join("config.toml"))
            .env_remove("DOCWARDEN_DATA_DIR")
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(self.dir.path().join("data"))
            .arg("--collection")
            .arg(collection);
        cmd
    }

    fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .cmd()
            .args(["--format", "json"])
            .args(args)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "{}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).unwrap()
    }

    fn add(&self, id: &str, text: &str) {
        self.cmd()
            .args(["doc", "add", "--id", id, text])
            .assert()
            .success();
    }
}

#[test]
fn test_length_pass_splits_and_removes() {
    let env = Env::new();
    env.add("id0", "");
    env.add("id1", "short-ok");
    env.add("id2", &"x".repeat(25));

    let report = env.json(&["maintain", "lengths", "--min", "1", "--max", "10", "--split"]);
    assert_eq!(report["success"], true);
    assert_eq!(report["removed_empty"], serde_json::json!(["id0"]));
    assert_eq!(report["split_large_count"], 1);
    assert_eq!(
        report["added_ids"],
        serde_json::json!(["id2_split0", "id2_split1", "id2_split2"])
    );

    let count = env.json(&["collection", "count"]);
    assert_eq!(count["count"], 4);
}

#[test]
fn test_keyword_delete() {
    let env = Env::new();
    env.add("a", "系统错误");
    env.add("b", "all good");
    env.add("c", "网络错误");

    env.cmd()
        .args(["maintain", "keyword", "错误"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 documents"));

    let remaining = env.json(&["doc", "get"]);
    assert_eq!(remaining["ids"], serde_json::json!(["b"]));
}

#[test]
fn test_cleanup_ids_reports_nothing_on_clean_collection() {
    let env = Env::new();
    env.add("a", "fine");

    let report = env.json(&["maintain", "cleanup-ids"]);
    assert_eq!(report["removed_count"], 0);
}

#[test]
fn test_missing_collection_fails_and_is_logged() {
    let env = Env::new();

    env.cmd_for("ghost")
        .args(["maintain", "cleanup-ids"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Collection not found: ghost"));

    let log = std::fs::read_to_string(env.dir.path().join("data").join("maintenance_errors.log"))
        .unwrap();
    assert!(log.contains("cleanup_invalid_ids (ghost): Collection not found: ghost"));
}

#[test]
fn test_inverted_bounds_rejected() {
    let env = Env::new();
    env.add("a", "text");

    env.cmd()
        .args(["--format", "json", "maintain", "lengths", "--min", "20", "--max", "5"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"success\": false"));
}

#[test]
fn test_lengths_splits_by_default() {
    let env = Env::new();
    env.add("big", &"y".repeat(12));

    let report = env.json(&["maintain", "lengths", "--max", "5"]);
    assert_eq!(report["split_large_count"], 1);
    assert_eq!(
        report["added_ids"],
        serde_json::json!(["big_split0", "big_split1", "big_split2"])
    );

    let env = Env::new();
    env.add("big", &"y".repeat(12));
    let report = env.json(&["maintain", "lengths", "--max", "5", "--keep-large"]);
    assert_eq!(report["split_large_count"], 0);
    assert_eq!(env.json(&["collection", "count"])["count"], 1);
}

#[test]
fn test_split_and_delete_large_conflict() {
    let env = Env::new();
    env.cmd()
        .args(["maintain", "lengths", "--split", "--delete-large"])
        .assert()
        .failure();
}

#[test]
fn test_doc_query_and_filters() {
    let env = Env::new();
    env.cmd()
        .args(["doc", "add", "--id", "r", "rust ownership", "--meta", "lang=en"])
        .assert()
        .success();
    env.cmd()
        .args(["doc", "add", "--id", "g", "gartenarbeit", "--meta", "lang=de"])
        .assert()
        .success();

    let filtered = env.json(&["doc", "get", "--where", r#"{"lang": "de"}"#]);
    assert_eq!(filtered["ids"], serde_json::json!(["g"]));

    let hits = env.json(&["doc", "query", "rust ownership", "-n", "1"]);
    assert_eq!(hits["hits"][0]["id"], "r");
    assert_eq!(hits["hits"][0]["relevance"], "high");

    let deleted = env.json(&["doc", "delete", "r", "nope"]);
    assert_eq!(deleted["deleted_count"], 1);
}

#[test]
fn test_collection_lifecycle() {
    let env = Env::new();
    env.cmd()
        .args(["collection", "create", "notes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created collection: notes"));

    env.cmd()
        .args(["collection", "create", "notes"])
        .assert()
        .failure();

    env.cmd()
        .args(["collection", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("notes (0 documents)"));

    env.cmd()
        .args(["collection", "delete", "notes", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_set_and_get() {
    let env = Env::new();
    env.cmd()
        .args(["config", "set", "max_length", "1234"])
        .assert()
        .success();
    env.cmd()
        .args(["config", "get", "max_length"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1234\n"));
    env.cmd()
        .args(["config", "get", "colour"])
        .assert()
        .failure();
}

#[test]
fn test_completions() {
    let env = Env::new();
    env.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("docwarden"));
}
