use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn docforge_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docforge"));
    cmd.current_dir(Path::new("tests/fixtures").join(fixture));
    cmd.env_remove("DOCFORGE_LOG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json(output: &Output) -> Value {
    assert!(output.status.success(), "command failed: {}", stderr(output));
    serde_json::from_slice(&output.stdout).unwrap()
}

fn titles(section: &Value) -> Vec<String> {
    section["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["title"].as_str().unwrap().to_string())
        .collect()
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn discover_locates_docs_and_partitions_categories() {
    // No DOCS_DIR: found through the fixture's pyproject.toml.
    let output = docforge_cmd("sample").args(["discover", "--format", "json"]).output().unwrap();
    let report = json(&output);

    let user = report["documents"]["user"].as_array().unwrap();
    assert_eq!(user.len(), 2);
    assert_eq!(user[0]["title"], "Getting Started");
    assert_eq!(user[0]["priority"], 20);
    assert_eq!(user[0]["is_index"], true);
    assert_eq!(user[1]["title"], "Setup Guide");
    assert_eq!(user[1]["url"], "user_docs/guides/setup.html");
    assert_eq!(user[1]["references"], serde_json::json!(["../getting_started/index"]));

    let auto = report["documents"]["auto"].as_array().unwrap();
    assert_eq!(auto.len(), 1);
    assert_eq!(auto[0]["section"], "api");
    assert_eq!(auto[0]["priority"], 70);

    assert_eq!(report["documents"]["ai"], serde_json::json!([]));
    assert_eq!(
        report["links"],
        serde_json::json!({
            "auto_docs/api/client.rst": ["user_docs/guides/setup.html"],
            "user_docs/guides/setup.md": ["user_docs/getting_started/index.html"],
        })
    );
    assert_eq!(report["fingerprint"].as_str().unwrap().len(), 64);
    assert!(stderr(&output).contains("Discovered 3 documents"));
}

#[test]
fn discover_is_idempotent() {
    let first = docforge_cmd("sample").args(["discover", "docs", "-f", "json"]).output().unwrap();
    let second = docforge_cmd("sample").args(["discover", "docs", "-f", "json"]).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn toc_places_every_file_once() {
    let output = docforge_cmd("sample").args(["toc", "docs", "-f", "json"]).output().unwrap();
    let report = json(&output);
    let sections = &report["sections"];

    assert_eq!(titles(&sections["user_guide"]), ["Setup Guide"]);
    assert_eq!(titles(&sections["reference"]), ["Client"]);

    let concepts = &sections["concepts"]["items"][0];
    assert_eq!(concepts["title"], "Design Notes");
    assert_eq!(concepts["category"], "orphan");
    assert_eq!(concepts["priority"], 90);

    let start = titles(&sections["getting_started"]);
    assert_eq!(start.first().map(String::as_str), Some("Getting Started"));
    assert!(start.contains(&"Notes".to_string()));

    let total: usize = sections
        .as_object()
        .unwrap()
        .values()
        .map(|s| s["items"].as_array().unwrap().len())
        .sum();
    // Three discovered files plus three orphans; `_build/` is never scanned.
    assert_eq!(total, 6);
    assert_eq!(report["orphans"].as_array().unwrap().len(), 3);
}

#[test]
fn toc_respecting_toctrees_skips_listed_orphans() {
    let output = docforge_cmd("sample")
        .args(["toc", "docs", "-f", "json", "--respect-toctrees"])
        .output()
        .unwrap();
    let report = json(&output);

    let orphans = report["orphans"].as_array().unwrap();
    assert_eq!(orphans.len(), 1);
    assert!(orphans[0].as_str().unwrap().ends_with("design.md"));
    assert_eq!(titles(&report["sections"]["getting_started"]), ["Getting Started"]);
}

#[test]
fn toc_yaml_written_to_file() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("toc.yaml");
    let output = docforge_cmd("sample")
        .args(["toc", "docs", "-f", "yaml", "-o"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success(), "toc failed: {}", stderr(&output));
    assert!(stdout(&output).is_empty());

    let yaml: serde_yaml::Value = serde_yaml::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(yaml["issues"].as_sequence().map(Vec::len), Some(0));
    assert_eq!(yaml["orphans"].as_sequence().map(Vec::len), Some(3));
    let guide = &yaml["sections"]["user_guide"]["items"][0];
    assert_eq!(guide["category"].as_str(), Some("user"));
    assert_eq!(guide["title"].as_str(), Some("Setup Guide"));
}

#[test]
fn check_reports_orphans_with_exit_1() {
    let output = docforge_cmd("sample").args(["check", "docs"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("ORPHAN  misc/design.md (would go in concepts)"));
    assert!(!out.contains("notes.md"));
    assert!(out.ends_with("1 orphans\n"));
}

#[test]
fn check_reports_missing_targets_with_exit_2() {
    let output = docforge_cmd("broken").args(["check", "docs"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let out = stdout(&output);
    assert!(out.contains("MISSING index.rst: toctree entry `missing` does not exist"));
    assert!(out.contains("UNRESOLVED user_docs/guides/intro.md: reference `next-step` matches no document"));
    assert!(out.ends_with("2 structural issues, 0 orphans\n"));
}

#[test]
fn check_clean_tree_exits_0() {
    let output = docforge_cmd("clean").args(["check", "docs"]).output().unwrap();
    assert!(output.status.success(), "check failed: {}", stdout(&output));
    assert!(stdout(&output).contains("All 1 documents placed, no orphans"));
}

#[test]
fn missing_docs_dir_exits_3_with_diagnostic() {
    let output = docforge_cmd("clean").args(["discover", "nope"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Documentation Directory Not Found"));
}

#[test]
fn unknown_format_exits_3() {
    let output = docforge_cmd("clean").args(["toc", "docs", "-f", "xml"]).output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("`xml` is not a supported format."));
}

#[test]
fn guide_and_keyword_orphan_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    write(tmp.path(), "user_docs/guides/setup.md", "# Setup Guide\n");
    write(tmp.path(), "notes.md", "quickstart tips");

    let output = Command::new(env!("CARGO_BIN_EXE_docforge"))
        .args(["toc", "-f", "json"])
        .arg(tmp.path())
        .output()
        .unwrap();
    let report = json(&output);

    let guide = &report["sections"]["user_guide"]["items"][0];
    assert_eq!(guide["title"], "Setup Guide");
    assert_eq!(guide["priority"], 50);

    let start = &report["sections"]["getting_started"]["items"];
    assert_eq!(start.as_array().unwrap().len(), 1);
    assert_eq!(start[0]["title"], "Notes");
    assert_eq!(start[0]["priority"], 90);
}
