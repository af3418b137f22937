//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CATALOG: &str = r#"[
  {"id": "AdX", "title": "book shelf organizer", "body": "", "url_template": "https://shop.example/x?tag={amazon_tracking_id}"},
  {"id": "AdY", "title": "water flosser", "body": "cordless", "url_template": "https://shop.example/y?tag={amazon_tracking_id}", "description": "Travel flosser"}
]"#;

fn workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let catalog = dir.path().join("ads.json");
    fs::write(&catalog, CATALOG).expect("write catalog");
    (dir, catalog)
}

fn adrank(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("adrank"));
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("adrank"));
    cmd.arg("--version");
    cmd.assert().success().stdout(predicate::str::contains("adrank"));
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("adrank"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("rank"))
        .stdout(predicate::str::contains("recommend"))
        .stdout(predicate::str::contains("prerank"))
        .stdout(predicate::str::contains("history"));
}

#[test]
fn test_rank_prints_best_match_with_score() {
    let (dir, catalog) = workspace();
    adrank(&dir)
        .args(["rank", "--catalog", catalog.to_str().expect("utf8"), "-q", "book shelf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1. [AdX] book shelf organizer (score 6)"))
        .stdout(predicate::str::contains("AdY").not());
}

#[test]
fn test_rank_excludes_ids() {
    let (dir, catalog) = workspace();
    adrank(&dir)
        .args([
            "rank",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "-q",
            "book shelf",
            "--exclude",
            "AdX",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[AdY]"));
}

#[test]
fn test_rank_reports_exhausted_catalog() {
    let (dir, catalog) = workspace();
    adrank(&dir)
        .args([
            "rank",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "-q",
            "book shelf",
            "--exclude",
            "AdX,AdY",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No unseen ads left."));
}

#[test]
fn test_rank_json_multi_query() {
    let (dir, catalog) = workspace();
    let output = adrank(&dir)
        .args([
            "rank",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "-q",
            "water flosser",
            "-q",
            "book shelf",
            "-n",
            "5",
            "--json",
        ])
        .output()
        .expect("run");
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let rows = parsed.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], "AdX");
    assert_eq!(rows[0]["score"], 6);
    assert_eq!(rows[1]["id"], "AdY");
    assert_eq!(rows[1]["score"], 6);
}

#[test]
fn test_rank_respects_config_file_weights() {
    let (dir, catalog) = workspace();
    fs::write(dir.path().join("adrank.toml"), "title_weight = 10\n").expect("write config");
    adrank(&dir)
        .args(["rank", "--catalog", catalog.to_str().expect("utf8"), "-q", "water"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(score 10)"));
}

#[test]
fn test_recommend_never_repeats_an_ad() {
    let (dir, catalog) = workspace();
    let db = dir.path().join("exposure.sqlite");
    let run = |query: &str| {
        adrank(&dir)
            .args([
                "recommend",
                "--catalog",
                catalog.to_str().expect("utf8"),
                "--caller",
                "bot-1",
                "--query",
                query,
                "--tracking-id",
                "bot1-20",
                "--db",
                db.to_str().expect("utf8"),
            ])
            .assert()
            .success()
    };

    run("book shelf").stdout(predicate::str::contains("https://shop.example/x?tag=bot1-20"));
    run("book shelf").stdout(predicate::str::contains("https://shop.example/y?tag=bot1-20"));
    run("water flosser").stdout(predicate::str::contains("No unseen ads left for caller bot-1"));

    adrank(&dir)
        .args(["history", "--caller", "bot-1", "--db", db.to_str().expect("utf8")])
        .assert()
        .success()
        .stdout(predicate::str::contains("ad=AdX"))
        .stdout(predicate::str::contains("ad=AdY"))
        .stdout(predicate::str::contains("no unseen ads"));
}

#[test]
fn test_rank_excludes_caller_history() {
    let (dir, catalog) = workspace();
    let db = dir.path().join("exposure.sqlite");
    adrank(&dir)
        .args([
            "recommend",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "--caller",
            "bot-1",
            "--query",
            "book shelf",
            "--tracking-id",
            "t",
            "--db",
            db.to_str().expect("utf8"),
        ])
        .assert()
        .success();

    adrank(&dir)
        .args([
            "rank",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "-q",
            "book shelf",
            "--caller",
            "bot-1",
            "--db",
            db.to_str().expect("utf8"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[AdY]"))
        .stdout(predicate::str::contains("[AdX]").not());
}

#[test]
fn test_recommend_json_view() {
    let (dir, catalog) = workspace();
    let db = dir.path().join("exposure.sqlite");
    adrank(&dir)
        .args([
            "recommend",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "--caller",
            "bot-9",
            "--query",
            "cordless flosser",
            "--tracking-id",
            "bot9-20",
            "--db",
            db.to_str().expect("utf8"),
            "--json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"ad_id\": \"AdY\""))
        .stdout(predicate::str::contains("\"description\": \"Travel flosser\""))
        .stdout(predicate::str::contains("https://shop.example/y?tag=bot9-20"));
}

#[test]
fn test_recommend_rejects_empty_query() {
    let (dir, catalog) = workspace();
    let db = dir.path().join("exposure.sqlite");
    adrank(&dir)
        .args([
            "recommend",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "--caller",
            "bot-1",
            "--query",
            "  ",
            "--tracking-id",
            "t",
            "--db",
            db.to_str().expect("utf8"),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No query provided"));
}

#[test]
fn test_prerank_outputs_ranked_ids() {
    let (dir, catalog) = workspace();
    adrank(&dir)
        .args([
            "prerank",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "-q",
            "water flosser",
            "-q",
            "book shelf",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"AdY\",\n  \"AdX\""));
}

#[test]
fn test_recommend_serves_from_stored_prerank() {
    let (dir, catalog) = workspace();
    let db = dir.path().join("exposure.sqlite");
    adrank(&dir)
        .args([
            "prerank",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "-q",
            "water flosser",
            "-q",
            "book shelf",
            "--caller",
            "bot-1",
            "--db",
            db.to_str().expect("utf8"),
        ])
        .assert()
        .success();

    let recommend = |query: &str| {
        adrank(&dir)
            .args([
                "recommend",
                "--catalog",
                catalog.to_str().expect("utf8"),
                "--caller",
                "bot-1",
                "--query",
                query,
                "--tracking-id",
                "t1",
                "--db",
                db.to_str().expect("utf8"),
            ])
            .assert()
            .success()
    };

    // Nothing matches "zzz", so the pre-ranked order decides: AdY before AdX.
    recommend("zzz").stdout(predicate::str::contains("https://shop.example/y?tag=t1"));
    recommend("zzz").stdout(predicate::str::contains("https://shop.example/x?tag=t1"));
    recommend("zzz").stdout(predicate::str::contains("No unseen ads left for caller bot-1"));
}

#[test]
fn test_rank_for_caller_is_limited_to_stored_prerank() {
    let (dir, catalog) = workspace();
    let db = dir.path().join("exposure.sqlite");
    adrank(&dir)
        .args([
            "prerank",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "-q",
            "water",
            "--caller",
            "bot-2",
            "--db",
            db.to_str().expect("utf8"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"AdY\""));

    adrank(&dir)
        .args([
            "rank",
            "--catalog",
            catalog.to_str().expect("utf8"),
            "-q",
            "book shelf",
            "-n",
            "5",
            "--caller",
            "bot-2",
            "--db",
            db.to_str().expect("utf8"),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("[AdY]"))
        .stdout(predicate::str::contains("[AdX]").not());
}

#[test]
fn test_invalid_catalog_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let catalog = dir.path().join("ads.json");
    fs::write(&catalog, r#"[{"id": "a", "url": "u"}]"#).expect("write");
    adrank(&dir)
        .args(["rank", "--catalog", catalog.to_str().expect("utf8"), "-q", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required field 'title'"));
}
