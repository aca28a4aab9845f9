//! End-to-end tests for the `drydock` binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn drydock() -> Command {
    Command::cargo_bin("drydock").unwrap()
}

fn write_workspace(dir: &Path, descriptor: &str, lock: &str) {
    std::fs::write(dir.join("Drydock.toml"), descriptor).unwrap();
    std::fs::write(dir.join("Cargo.lock"), lock).unwrap();
}

const CLEAN_LOCK: &str = r#"
version = 3

[[package]]
name = "matlab-beautifier"
version = "1.1.0"

[[package]]
name = "anyhow"
version = "1.0.86"
source = "registry+https://github.com/rust-lang/crates.io-index"
checksum = "b3d1d046238990b9cf5bcde22a3fb3584ee5cf65fb2765f454ed428c7a0063da"
"#;

const GIT_LOCK: &str = r#"
version = 3

[[package]]
name = "matlab-beautifier"
version = "1.1.0"

[[package]]
name = "tree-sitter-matlab"
version = "1.0.7"
source = "git+https://github.com/acristoffers/tree-sitter-matlab?tag=v1.0.7#0e956ffc2f57b8b0ebd7f1467c34f48a3c7a9ee1"
"#;

#[test]
fn check_succeeds_without_git_dependencies() {
    let tmp = TempDir::new().unwrap();
    write_workspace(
        tmp.path(),
        r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"
"#,
        CLEAN_LOCK,
    );

    drydock()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 2 locked packages"));
}

#[test]
fn check_reports_missing_override() {
    let tmp = TempDir::new().unwrap();
    write_workspace(
        tmp.path(),
        r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"
"#,
        GIT_LOCK,
    );

    drydock()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "missing hash override for `tree-sitter-matlab 1.0.7`",
        ))
        .stderr(predicate::str::contains("tree-sitter-matlab-1.0.7"));
}

#[test]
fn check_without_fetch_warns_about_unverified_trees() {
    let tmp = TempDir::new().unwrap();
    write_workspace(
        tmp.path(),
        r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"

[overrides]
"tree-sitter-matlab-1.0.7" = "sha256-47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
"#,
        GIT_LOCK,
    );

    drydock()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 git-pinned"))
        .stderr(predicate::str::contains(
            "warning: git-pinned trees were not fetched or verified",
        ));
}

#[test]
fn check_accepts_explicit_descriptor_path() {
    let tmp = TempDir::new().unwrap();
    write_workspace(
        tmp.path(),
        r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"
"#,
        CLEAN_LOCK,
    );

    drydock()
        .arg("check")
        .arg("--descriptor")
        .arg(tmp.path().join("Drydock.toml"))
        .assert()
        .success();
}

#[test]
fn missing_descriptor_is_an_error() {
    let tmp = TempDir::new().unwrap();

    drydock()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find `Drydock.toml`"));
}

#[test]
fn malformed_lock_is_an_error() {
    let tmp = TempDir::new().unwrap();
    write_workspace(
        tmp.path(),
        r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"
"#,
        "this is not a lock manifest [",
    );

    drydock()
        .current_dir(tmp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse lock manifest"));
}

#[cfg(unix)]
#[test]
fn shell_print_env_lists_toolchain() {
    let tmp = TempDir::new().unwrap();
    write_workspace(
        tmp.path(),
        r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"

[tools]
build = ["sh"]
"#,
        CLEAN_LOCK,
    );

    drydock()
        .current_dir(tmp.path())
        .args(["shell", "--print-env"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("PATH="))
        .stdout(predicate::str::contains("SH="));
}

#[test]
fn shell_reports_missing_tool() {
    let tmp = TempDir::new().unwrap();
    write_workspace(
        tmp.path(),
        r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"

[tools]
build = ["definitely-not-a-real-tool-4a1b"]
"#,
        CLEAN_LOCK,
    );

    drydock()
        .current_dir(tmp.path())
        .args(["shell", "--print-env"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("definitely-not-a-real-tool-4a1b"));
}

/// Full pipeline against a scripted stand-in toolchain placed on PATH.
#[cfg(unix)]
#[test]
fn build_installs_binary_and_share() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    write_workspace(
        tmp.path(),
        r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"

[tools]
build = ["cargo"]
"#,
        CLEAN_LOCK,
    );

    let tool_dir = tmp.path().join("tools");
    std::fs::create_dir_all(&tool_dir).unwrap();
    let fake_cargo = tool_dir.join("cargo");
    std::fs::write(
        &fake_cargo,
        "#!/bin/sh\n\
         mkdir -p target/release/share\n\
         printf 'fake binary' > target/release/matlab-beautifier\n\
         printf '(program)' > target/release/share/queries.scm\n",
    )
    .unwrap();
    let mut perms = std::fs::metadata(&fake_cargo).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&fake_cargo, perms).unwrap();

    let path = format!(
        "{}:{}",
        tool_dir.display(),
        std::env::var("PATH").unwrap_or_default()
    );

    drydock()
        .current_dir(tmp.path())
        .env("PATH", &path)
        .arg("build")
        .assert()
        .success()
        .stdout(predicate::str::contains("registry backend"));

    assert!(tmp.path().join("out/bin/matlab-beautifier").is_file());
    assert!(tmp.path().join("out/share/queries.scm").is_file());
}

/// Selecting the other backend from the CLI produces the same layout.
#[cfg(unix)]
#[test]
fn build_backend_flag_overrides_descriptor() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = TempDir::new().unwrap();
    write_workspace(
        tmp.path(),
        r#"
[package]
name = "matlab-beautifier"
version = "1.1.0"

[tools]
build = ["cargo"]
"#,
        CLEAN_LOCK,
    );

    let tool_dir = tmp.path().join("tools");
    std::fs::create_dir_all(&tool_dir).unwrap();
    let fake_cargo = tool_dir.join("cargo");
    std::fs::write(
        &fake_cargo,
        "#!/bin/sh\n\
         mkdir -p target/release\n\
         printf 'fake binary' > target/release/matlab-beautifier\n",
    )
    .unwrap();
    let mut perms = std::fs::metadata(&fake_cargo).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&fake_cargo, perms).unwrap();

    let path = format!(
        "{}:{}",
        tool_dir.display(),
        std::env::var("PATH").unwrap_or_default()
    );

    drydock()
        .current_dir(tmp.path())
        .env("PATH", &path)
        .args(["build", "--backend", "wrapper"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrapper backend"));

    assert!(tmp.path().join("out/bin/matlab-beautifier").is_file());
}
