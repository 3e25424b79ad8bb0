use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn projmap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_projmap"))
}

#[test]
fn cli_writes_report_for_typescript_project() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("webapp");

    write_file(&project.join("src/index.ts"), "let a = 1;\nlet b = 2;\nlet c = 3;\n");
    write_file(&project.join("src/utils.ts"), "");
    write_file(&project.join("package-lock.json"), "{}\n");
    write_file(&project.join("node_modules/dep/index.js"), "module.exports = 1;\n");

    let report = dir.path().join("analysis.md");
    let output = projmap()
        .args([
            project.to_str().unwrap(),
            "-o",
            report.to_str().unwrap(),
            "--stats",
            "--builtin-tree",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.starts_with("# PROJECT ANALYSIS\n\n**Project:** webapp\n"));
    assert!(text.contains("webapp/\n└── src/\n    ├── index.ts\n    └── utils.ts\n"));
    assert!(text.contains("| ts | 2 | 3 |"));
    assert_eq!(text.matches("```typescript\n").count(), 2);
    assert!(!text.contains("node_modules"));
    assert!(!text.contains("package-lock.json"));
}

#[test]
fn cli_json_summary() {
    let dir = tempdir().unwrap();
    write_file(&dir.path().join("proj/a.py"), "print(1)\nprint(2)\n");
    write_file(&dir.path().join("proj/b.py"), "pass\n");

    let report = dir.path().join("out/report.md");
    let output = projmap()
        .args([
            dir.path().join("proj").to_str().unwrap(),
            "--output",
            report.to_str().unwrap(),
            "--stats",
            "--no-content",
            "--builtin-tree",
            "--json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(v["files_included"], 2);
    assert_eq!(v["tree_entries"], 2);
    assert_eq!(v["tree_truncated"], false);
    assert_eq!(v["tree_provider"], "builtin");
    assert_eq!(v["stats"]["total_lines"], 3);
    assert_eq!(v["stats"]["by_extension"]["py"]["files"], 2);

    let text = fs::read_to_string(&report).unwrap();
    assert!(!text.contains("# FILE CONTENTS"));
}

#[test]
fn cli_missing_directory_fails_without_output() {
    let dir = tempdir().unwrap();
    let report = dir.path().join("report.md");

    let output = projmap()
        .args([
            dir.path().join("nope").to_str().unwrap(),
            "-o",
            report.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(3));
    assert!(!report.exists());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("path not found"));
}

#[test]
fn cli_json_error_output_is_valid_json_even_with_quotes_in_path() {
    let dir = tempdir().unwrap();

    let bad_path = dir.path().join("does-not-exist-\"quoted\"");

    let output = projmap()
        .args([bad_path.to_str().unwrap(), "--json"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());

    let stderr = String::from_utf8(output.stderr).unwrap();
    let v: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert!(v["error"].as_str().unwrap().contains("path not found"));
}

#[test]
fn cli_list_flags_replace_and_extend() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("proj");
    write_file(&project.join("main.rs"), "fn main() {}\n");
    write_file(&project.join("lib.ts"), "export {};\n");
    write_file(&project.join("gen/out.rs"), "// generated\n");
    write_file(&project.join("snap.rs.bak"), "old\n");

    let report = dir.path().join("r.md");
    let output = projmap()
        .args([
            project.to_str().unwrap(),
            "-o",
            report.to_str().unwrap(),
            "--extensions",
            "rs",
            "--add-extensions",
            "bak",
            "--add-exclude-dirs",
            "gen",
            "--add-exclude-files",
            "*.bak",
            "--builtin-tree",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains("## main.rs"));
    assert!(!text.contains("lib.ts"));
    assert!(!text.contains("out.rs"));
    assert!(!text.contains("snap.rs.bak"));
}

#[test]
fn cli_config_file_is_applied() {
    let dir = tempdir().unwrap();
    let project = dir.path().join("proj");
    write_file(&project.join("a.ts"), "x\n");

    let config = dir.path().join("projmap.json");
    fs::write(&config, r#"{ "tree_only": true, "show_stats": true }"#).unwrap();

    let report = dir.path().join("r.md");
    let output = projmap()
        .args([
            project.to_str().unwrap(),
            "-o",
            report.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--builtin-tree",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.contains("# PROJECT STATISTICS"));
    assert!(!text.contains("# FILE CONTENTS"));
}

#[test]
fn cli_completions() {
    let output = projmap().args(["--completions", "bash"]).output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("projmap"));
}
