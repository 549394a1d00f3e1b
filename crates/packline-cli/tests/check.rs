//! Integration tests for the packline binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn packline() -> Command {
    Command::cargo_bin("packline").unwrap()
}

const VALID_CONFIG: &str = r#"
entry = "src/main.js"

[output]
filename = "js/[name].js"
path = "build"

[[rules]]
test = "*.css"
steps = [{ name = "style" }, { name = "css-load" }]

[[rules]]
test = "*.{png,jpg,gif}"

[rules.output]
name = "[contenthash:10].[ext]"
dir = "imgs"
inline_limit = 30720
"#;

fn project_with(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("packline.toml"), config).unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/main.js"), "console.log('hi')\n").unwrap();
    temp
}

#[test]
fn check_fails_without_config() {
    let temp = TempDir::new().unwrap();

    packline()
        .current_dir(temp.path())
        .args(["check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config not found"));
}

#[test]
fn check_accepts_a_valid_config() {
    let temp = project_with(VALID_CONFIG);

    packline()
        .current_dir(temp.path())
        .args(["check", "--env", "production"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Configuration OK"));
}

#[test]
fn check_reports_missing_entry() {
    let temp = project_with(VALID_CONFIG);
    fs::remove_file(temp.path().join("src/main.js")).unwrap();

    packline()
        .current_dir(temp.path())
        .args(["check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("entry path not found"));
}

#[test]
fn check_rejects_overlapping_rules() {
    let temp = project_with(
        r#"
entry = "src/main.js"

[[rules]]
test = "*.js"
steps = [{ name = "babel" }]

[[rules]]
test = "*.js"
steps = [{ name = "eslint" }]
"#,
    );

    packline()
        .current_dir(temp.path())
        .args(["check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ambiguous rule dispatch"));
}

#[test]
fn build_emits_assets() {
    let temp = project_with(VALID_CONFIG);
    fs::write(temp.path().join("src/photo.png"), vec![7u8; 60000]).unwrap();

    packline()
        .current_dir(temp.path())
        .args(["build", "--env", "production"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Built"));

    assert!(temp.path().join("build/js/main.js").exists());

    let imgs: Vec<_> = fs::read_dir(temp.path().join("build/imgs"))
        .unwrap()
        .collect();
    assert_eq!(imgs.len(), 1);
}

#[test]
fn build_respects_out_dir_override() {
    let temp = project_with(VALID_CONFIG);

    packline()
        .current_dir(temp.path())
        .args(["build", "--out-dir", "dist"])
        .assert()
        .success();

    assert!(temp.path().join("dist/js/main.js").exists());
    assert!(!temp.path().join("build").exists());
}

#[test]
fn build_clean_removes_stale_output() {
    let temp = project_with(VALID_CONFIG);
    fs::create_dir_all(temp.path().join("build")).unwrap();
    fs::write(temp.path().join("build/stale.txt"), "old").unwrap();

    packline()
        .current_dir(temp.path())
        .args(["build", "--clean"])
        .assert()
        .success();

    assert!(!temp.path().join("build/stale.txt").exists());
    assert!(temp.path().join("build/js/main.js").exists());
}

#[test]
fn check_sees_entries_supplied_by_environment_overrides() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("src")).unwrap();
    fs::write(temp.path().join("src/main.js"), "console.log('hi')\n").unwrap();
    fs::write(
        temp.path().join("packline.toml"),
        "[env.production]\nentry = \"src/main.js\"\n",
    )
    .unwrap();

    // The entry only exists under the production overrides; check must
    // agree with what a production build would resolve.
    packline()
        .current_dir(temp.path())
        .args(["check", "--env", "production"])
        .assert()
        .success()
        .stderr(predicate::str::contains("1 entry point(s)"));

    packline()
        .current_dir(temp.path())
        .args(["check", "--env", "development"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no entry points"));
}

#[test]
fn check_resolves_per_environment_overrides() {
    let temp = project_with(&format!(
        "{VALID_CONFIG}\n[env.production.output]\npublic_path = \"./\"\n"
    ));

    packline()
        .current_dir(temp.path())
        .args(["check", "--env", "development"])
        .assert()
        .success();

    packline()
        .current_dir(temp.path())
        .args(["check", "--env", "production"])
        .assert()
        .success();
}
