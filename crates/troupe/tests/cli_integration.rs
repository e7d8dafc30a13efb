//! CLI integration tests for the Troupe command-line interface.
//!
//! None of these reach an LLM: they cover help output, argument parsing and
//! the commands that only inspect a crew definition.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NEWSROOM: &str = r#"
[crew]
name = "newsroom"

[[crew.agents]]
name = "writer"
task = "Write a paragraph about tide pools."

[[crew.agents]]
name = "editor"
task = "Tighten the paragraph."
dependencies = ["writer"]

[[crew.agents]]
name = "counter"
task = "Count the words of the edited paragraph."
tools = ["word_count"]
dependencies = ["editor"]
"#;

const CYCLIC: &str = r#"
[crew]
name = "loop"

[[crew.agents]]
name = "chicken"
task = "x"
dependencies = ["egg"]

[[crew.agents]]
name = "egg"
task = "y"
dependencies = ["chicken"]
"#;

/// A troupe command isolated from the user's config and working directory.
fn troupe(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("troupe").unwrap();
    cmd.current_dir(dir)
        .env("TROUPE_CONFIG_DIR", dir.join("config"))
        .env_remove("RUST_LOG")
        .env_remove("TROUPE_MODEL");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    troupe(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("graph"))
        .stdout(predicate::str::contains("tool"))
        .stdout(predicate::str::contains("reflect"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    troupe(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("troupe"));
}

#[test]
fn test_reflect_help() {
    let dir = TempDir::new().unwrap();
    troupe(dir.path())
        .args(["reflect", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--steps"));
}

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    troupe(dir.path()).arg("dance").assert().failure();
}

#[test]
fn test_tool_requires_prompt() {
    let dir = TempDir::new().unwrap();
    troupe(dir.path()).arg("tool").assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Definition Commands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_plan_prints_order() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "crew.toml", NEWSROOM);

    troupe(dir.path())
        .arg("plan")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("1. writer"))
        .stdout(predicate::str::contains("2. editor"))
        .stdout(predicate::str::contains("3. counter"));
}

#[test]
fn test_plan_json() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "crew.toml", NEWSROOM);

    let output = troupe(dir.path())
        .arg("--json")
        .arg("plan")
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());

    let steps: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(steps[1]["agent"], "editor");
    assert_eq!(steps[1]["dependencies"][0], "writer");
}

#[test]
fn test_graph_prints_dot() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "crew.toml", NEWSROOM);

    troupe(dir.path())
        .arg("graph")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph \"newsroom\""))
        .stdout(predicate::str::contains("\"writer\" -> \"editor\";"))
        .stdout(predicate::str::contains("\"editor\" -> \"counter\";"));
}

#[test]
fn test_cycle_rejected() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "crew.toml", CYCLIC);

    troupe(dir.path())
        .arg("plan")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycle"));
}

#[test]
fn test_unknown_tool_rejected() {
    let dir = TempDir::new().unwrap();
    let file = write(
        dir.path(),
        "crew.toml",
        r#"
[crew]
name = "c"

[[crew.agents]]
name = "a"
task = "x"
tools = ["teleport"]
"#,
    );

    troupe(dir.path())
        .arg("graph")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("teleport"));
}

#[test]
fn test_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    troupe(dir.path())
        .args(["plan", "nope.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_run_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "crew.toml", NEWSROOM);

    troupe(dir.path())
        .env_remove("GROQ_API_KEY")
        .arg("run")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("GROQ_API_KEY"));
}

#[test]
fn test_malformed_project_config_warns() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "crew.toml", NEWSROOM);
    write(dir.path(), "troupe.toml", "not valid toml {{{{");

    troupe(dir.path())
        .arg("plan")
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to load"));
}
