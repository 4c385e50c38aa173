#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"// flip helpers
name "react-flip-toolkit-lite"
version "0.3.1"
license "MIT"

scripts {
    prebuild "echo prebuild >> log.txt"
    build "echo build >> log.txt"
    format "echo format" prettier=true
    fail "exit 7"
    args "printf '%s|' >> log.txt"
}

peer-dependencies {
    react ">=16.8.0"
}

/* build tooling */
dev-dependencies {
    microbundle "^0.11.0"
}
"#;

fn sdl(dir: &TempDir) -> Command {
    let config = dir.path().join("sdl-config.toml");
    if !config.exists() {
        std::fs::write(&config, "").unwrap();
    }
    let mut cmd = Command::cargo_bin("sdl").unwrap();
    cmd.current_dir(dir.path())
        .env("SDL_CONFIG", &config)
        .env_remove("SDL_MANIFEST")
        .env_remove("RUST_LOG");
    cmd
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.sdl"), MANIFEST).unwrap();
    dir
}

fn read(dir: &TempDir, name: &str) -> String {
    std::fs::read_to_string(dir.path().join(name)).unwrap()
}

// ---------------------------------------------------------------------------
// sdl run / scripts
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn run_executes_pre_hook_then_script() {
    let dir = project();
    sdl(&dir)
        .args(["run", "build"])
        .assert()
        .success()
        .stderr(predicate::str::contains("> react-flip-toolkit-lite@0.3.1 build"));

    assert_eq!(read(&dir, "log.txt"), "prebuild\nbuild\n");
}

#[cfg(unix)]
#[test]
fn run_from_subdirectory_uses_project_root() {
    let dir = project();
    std::fs::create_dir_all(dir.path().join("src/components")).unwrap();
    let mut cmd = sdl(&dir);
    cmd.current_dir(dir.path().join("src/components"));
    cmd.args(["run", "build", "--silent"]).assert().success();

    assert!(dir.path().join("log.txt").exists());
}

#[cfg(unix)]
#[test]
fn run_passes_extra_arguments() {
    let dir = project();
    sdl(&dir)
        .args(["run", "args", "-s", "--", "one two", "--flag"])
        .assert()
        .success();

    assert_eq!(read(&dir, "log.txt"), "one two|--flag|");
}

#[cfg(unix)]
#[test]
fn run_propagates_exit_code() {
    let dir = project();
    sdl(&dir).args(["run", "fail", "-s"]).assert().code(7);
}

#[test]
fn run_unknown_script_lists_available() {
    let dir = project();
    sdl(&dir)
        .args(["run", "deploy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing script: `deploy`"))
        .stderr(predicate::str::contains("  format\n    echo format"));

    sdl(&dir).args(["run", "deploy", "--if-present"]).assert().success();
}

#[test]
fn scripts_lists_in_source_order() {
    let dir = project();
    sdl(&dir)
        .arg("scripts")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("available scripts:\n  prebuild\n"));

    let output = sdl(&dir).args(["scripts", "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["build"], "echo build >> log.txt");
}

#[test]
fn rust_log_enables_debug_output() {
    let dir = project();
    sdl(&dir)
        .env("RUST_LOG", "debug")
        .arg("scripts")
        .assert()
        .success()
        .stderr(predicate::str::contains("found manifest"));

    sdl(&dir)
        .arg("scripts")
        .assert()
        .success()
        .stderr(predicate::str::contains("found manifest").not());
}

#[test]
fn verbose_overrides_rust_log() {
    let dir = project();
    sdl(&dir)
        .env("RUST_LOG", "error")
        .args(["-v", "scripts"])
        .assert()
        .success()
        .stderr(predicate::str::contains("found manifest"));
}

#[test]
fn missing_manifest_is_reported() {
    let dir = TempDir::new().unwrap();
    sdl(&dir)
        .arg("scripts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no config.sdl found"));
}

// ---------------------------------------------------------------------------
// sdl check / dump
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_valid_manifest() {
    let dir = project();
    sdl(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok (0 warning(s))"));
}

#[test]
fn check_renders_syntax_errors() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.sdl"),
        "name \"flip\"\nversion \"1.0.0\"\nscripts {\n    format \"prettier\" prettier true\n}\n",
    )
    .unwrap();

    sdl(&dir)
        .arg("check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: expected '=' after attribute name"))
        .stderr(predicate::str::contains("config.sdl:4:32"))
        .stderr(predicate::str::contains("4 |     format \"prettier\" prettier true"));
}

#[test]
fn check_reports_schema_errors_and_warnings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bad.sdl"),
        "name \"Flip\"\nversion \"1.0.0\"\nprivate true\ndev-dependencies {\n    react \"not a range!\"\n}\n",
    )
    .unwrap();

    sdl(&dir)
        .args(["check", "bad.sdl"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[invalid-name]"))
        .stderr(predicate::str::contains("warning: unknown field `private`"))
        .stderr(predicate::str::contains("[invalid-range]"))
        .stderr(predicate::str::contains("2 error(s), 1 warning(s)"));
}

#[test]
fn dump_prints_tag_tree() {
    let dir = project();
    sdl(&dir)
        .arg("dump")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tag name {"))
        .stdout(predicate::str::contains("attributes: prettier=true"));
}

#[test]
fn dump_json_for_any_sdl_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("server.sdl"), "server \"web\" port=8080 {\n  tls true\n}\n").unwrap();

    let output = sdl(&dir).args(["dump", "server.sdl", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["attributes"]["port"], 8080);
    assert_eq!(json[0]["children"][0]["values"][0], true);
}

// ---------------------------------------------------------------------------
// sdl fmt
// ---------------------------------------------------------------------------

#[test]
fn fmt_rewrites_files() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.sdl"), "a   1 ;b { c \"x\" }").unwrap();

    sdl(&dir)
        .args(["fmt", "a.sdl"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Formatted: a.sdl"));
    assert_eq!(read(&dir, "a.sdl"), "a 1;\nb {\n    c \"x\";\n}\n");

    sdl(&dir).args(["fmt", "--check", "a.sdl"]).assert().success();
}

#[test]
fn fmt_keeps_block_comments() {
    let dir = project();
    sdl(&dir).args(["fmt", "config.sdl"]).assert().success();

    let formatted = read(&dir, "config.sdl");
    assert!(formatted.contains("\n/* build tooling */\ndev-dependencies {\n"));
    sdl(&dir).arg("check").assert().success();
    sdl(&dir).args(["fmt", "--check", "config.sdl"]).assert().success();
}

#[test]
fn fmt_check_reports_unformatted() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.sdl"), "a 1").unwrap();

    sdl(&dir)
        .args(["fmt", "--check", "a.sdl"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Would reformat: a.sdl"));
    assert_eq!(read(&dir, "a.sdl"), "a 1");
}

#[test]
fn fmt_stdin_uses_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("sdl-config.toml"),
        "[format]\nindent_size = 2\nsemicolons = false\n",
    )
    .unwrap();

    sdl(&dir)
        .arg("fmt")
        .write_stdin("b {\nc 1\n}")
        .assert()
        .success()
        .stdout("b {\n  c 1\n}\n");
}

// ---------------------------------------------------------------------------
// sdl deps / info / add / remove / init
// ---------------------------------------------------------------------------

#[test]
fn deps_shows_install_state() {
    let dir = project();
    let react = dir.path().join("node_modules/react");
    std::fs::create_dir_all(&react).unwrap();
    std::fs::write(react.join("package.json"), r#"{"version": "16.12.0"}"#).unwrap();

    sdl(&dir)
        .args(["deps", "--kind", "peer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("peer-dependencies:"))
        .stdout(predicate::str::contains("16.12.0"))
        .stdout(predicate::str::contains("ok"))
        .stdout(predicate::str::contains("microbundle").not());
}

#[test]
fn info_json() {
    let dir = project();
    let output = sdl(&dir).args(["info", "--json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["name"], "react-flip-toolkit-lite");
    assert_eq!(json["license"], "MIT");
}

#[test]
fn add_and_remove_keep_comments() {
    let dir = project();
    sdl(&dir)
        .args(["add", "prettier@1.19.1", "--dev"])
        .assert()
        .success()
        .stdout("Added `prettier@1.19.1` to dev-dependencies\n");
    sdl(&dir)
        .args(["add", "@babel/core@^7.8.0"])
        .assert()
        .success();

    let content = read(&dir, "config.sdl");
    assert!(content.starts_with("// flip helpers\n"));
    assert!(content.contains("    prettier \"1.19.1\";\n"));
    assert!(content.contains("dependencies {\n    dependency \"@babel/core\" \"^7.8.0\";\n}\n"));

    sdl(&dir)
        .args(["remove", "prettier"])
        .assert()
        .success()
        .stdout("Removed `prettier` from dev-dependencies\n");
    assert!(!read(&dir, "config.sdl").contains("prettier \"1.19.1\""));

    sdl(&dir)
        .args(["remove", "left-pad"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in any table"));
}

#[test]
fn add_rejects_bad_range() {
    let dir = project();
    sdl(&dir)
        .args(["add", "react@not a range!"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid version range `not a range!`"));
    assert_eq!(read(&dir, "config.sdl"), MANIFEST);
}

#[test]
fn add_refuses_invalid_manifest() {
    let dir = TempDir::new().unwrap();
    let source = "name \"Flip\"\nversion \"1.0.0\"\n";
    std::fs::write(dir.path().join("config.sdl"), source).unwrap();

    sdl(&dir)
        .args(["add", "react@^16.8.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[invalid-name]"))
        .stderr(predicate::str::contains("has 1 error(s)"));
    assert_eq!(read(&dir, "config.sdl"), source);
}

#[test]
fn init_writes_valid_manifest() {
    let dir = TempDir::new().unwrap();
    sdl(&dir)
        .args(["init", "--name", "flip-kit"])
        .assert()
        .success();

    assert!(read(&dir, "config.sdl").contains("name \"flip-kit\";"));
    sdl(&dir).arg("check").assert().success();
    sdl(&dir)
        .args(["init", "--name", "flip-kit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
