//! Integration tests for the partkeep CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get a partkeep command isolated from the user's config
fn partkeep(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("partkeep").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".xdg"))
        .env_remove("PARTKEEP_UPLOAD_DIR")
        .env_remove("PARTKEEP_DATABASE")
        .env_remove("PARTKEEP_PAGE_SIZE")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a test project in a temp directory
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    partkeep(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to write a file to upload
fn write_file(tmp: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let dir = tmp.path().join("incoming");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn add_part(tmp: &TempDir, part_no: &str, extra: &[&str]) {
    partkeep(tmp.path())
        .args(["part", "add", "--part-no", part_no])
        .args(extra)
        .assert()
        .success();
}

fn uploads(tmp: &TempDir) -> PathBuf {
    tmp.path().join("uploads")
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    partkeep(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Parts inventory"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    partkeep(tmp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("partkeep"));
}

#[test]
fn test_part_help_lists_subcommands() {
    let tmp = TempDir::new().unwrap();
    partkeep(tmp.path())
        .args(["part", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("attach"))
        .stdout(predicate::str::contains("detach"))
        .stdout(predicate::str::contains("folder"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    partkeep(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("partkeep"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_project_structure() {
    let tmp = setup_test_project();
    assert!(tmp.path().join(".partkeep/config.yaml").is_file());
    assert!(tmp.path().join(".partkeep/parts.db").is_file());
    assert!(uploads(&tmp).is_dir());
}

#[test]
fn test_init_twice_reports_existing_project() {
    let tmp = setup_test_project();
    partkeep(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_command_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    partkeep(tmp.path())
        .args(["part", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a partkeep project"));
}

// ============================================================================
// Part Lifecycle Tests
// ============================================================================

#[test]
fn test_add_part_with_photo() {
    let tmp = setup_test_project();
    let photo = write_file(&tmp, "a.jpg", &vec![0u8; 10240]);

    partkeep(tmp.path())
        .args(["part", "add", "--part-no", "P-100", "--name", "Bracket", "--photo"])
        .arg(&photo)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created part P-100"));

    assert!(uploads(&tmp).join("p-100/photos/a.jpg").is_file());
    for dir in ["photos", "drawings", "cad", "cnc", "invoice"] {
        assert!(uploads(&tmp).join("p-100").join(dir).is_dir());
    }

    partkeep(tmp.path())
        .args(["part", "show", "P-100", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"path\": \"p-100/photos/a.jpg\""))
        .stdout(predicate::str::contains("\"size\": \"10.00 KB\""))
        .stdout(predicate::str::contains("\"type\": \"image/jpeg\""));
}

#[test]
fn test_add_duplicate_part_no_fails() {
    let tmp = setup_test_project();
    add_part(&tmp, "P-100", &[]);

    partkeep(tmp.path())
        .args(["part", "add", "--part-no", "P-100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_add_blank_part_no_fails() {
    let tmp = setup_test_project();
    partkeep(tmp.path())
        .args(["part", "add", "--part-no", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be blank"));
}

#[test]
fn test_update_rename_moves_attachments() {
    let tmp = setup_test_project();
    let photo = write_file(&tmp, "a.jpg", b"jpeg");
    add_part(&tmp, "P-100", &["--photo", photo.to_str().unwrap()]);

    partkeep(tmp.path())
        .args(["part", "update", "P-100", "--part-no", "P-200", "--qty", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated part P-200"));

    assert!(!uploads(&tmp).join("p-100").exists());
    assert!(uploads(&tmp).join("p-200/photos/a.jpg").is_file());

    partkeep(tmp.path())
        .args(["part", "show", "P-200", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"path\": \"p-200/photos/a.jpg\""))
        .stdout(predicate::str::contains("\"qty\": 5"));
}

#[test]
fn test_attach_same_name_gets_numbered() {
    let tmp = setup_test_project();
    let first = write_file(&tmp, "a.jpg", b"first");
    add_part(&tmp, "P-200", &["--photo", first.to_str().unwrap()]);

    let second = tmp.path().join("other/a.jpg");
    fs::create_dir_all(second.parent().unwrap()).unwrap();
    fs::write(&second, b"second").unwrap();

    partkeep(tmp.path())
        .args(["part", "attach", "P-200", "--category", "photos"])
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains("Attached 1 file(s)"));

    let dir = uploads(&tmp).join("p-200/photos");
    assert_eq!(fs::read(dir.join("a.jpg")).unwrap(), b"first");
    assert_eq!(fs::read(dir.join("a(1).jpg")).unwrap(), b"second");
}

#[test]
fn test_attach_missing_file_is_skipped() {
    let tmp = setup_test_project();
    add_part(&tmp, "P-1", &[]);

    partkeep(tmp.path())
        .args(["part", "attach", "P-1", "-c", "cad", "no-such-file.step"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped cad upload"));
}

#[test]
fn test_detach_removes_only_named_file() {
    let tmp = setup_test_project();
    let x = write_file(&tmp, "x.png", b"x");
    let y = write_file(&tmp, "y.png", b"y");
    add_part(
        &tmp,
        "P-1",
        &["--drawing", x.to_str().unwrap(), "--drawing", y.to_str().unwrap()],
    );

    partkeep(tmp.path())
        .args(["part", "detach", "P-1", "--category", "drawings", "x.png"])
        .assert()
        .success();

    let dir = uploads(&tmp).join("p-1/drawings");
    assert!(!dir.join("x.png").exists());
    assert!(dir.join("y.png").is_file());

    partkeep(tmp.path())
        .args(["part", "detach", "P-1", "--category", "drawings", "x.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no drawings attachment named 'x.png'"));
}

#[test]
fn test_delete_removes_folder_and_record() {
    let tmp = setup_test_project();
    let photo = write_file(&tmp, "a.jpg", b"jpeg");
    add_part(&tmp, "P-200", &["--photo", photo.to_str().unwrap()]);

    partkeep(tmp.path())
        .args(["part", "delete", "P-200", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted part P-200"));

    assert!(!uploads(&tmp).join("p-200").exists());
    partkeep(tmp.path())
        .args(["part", "show", "P-200"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_add_refuses_part_number_sharing_a_folder() {
    let tmp = setup_test_project();
    add_part(&tmp, "P-1", &[]);

    partkeep(tmp.path())
        .args(["part", "add", "--part-no", "p-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("share attachment folder"));

    partkeep(tmp.path())
        .args(["part", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_folder_prints_path() {
    let tmp = setup_test_project();
    add_part(&tmp, "Big Gear", &[]);

    partkeep(tmp.path())
        .args(["part", "folder", "Big Gear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("big_gear"));
}

// ============================================================================
// Listing Tests
// ============================================================================

#[test]
fn test_list_search_and_formats() {
    let tmp = setup_test_project();
    add_part(&tmp, "P-100", &["--name", "Bracket", "--material", "AL6061"]);
    add_part(&tmp, "P-200", &["--name", "Shaft", "--material", "4140 steel"]);
    add_part(&tmp, "X-1", &["--name", "Spacer", "--material", "Delrin"]);

    partkeep(tmp.path())
        .args(["part", "list", "--search", "STEEL", "--format", "id"])
        .assert()
        .success()
        .stdout("P-200\n");

    partkeep(tmp.path())
        .args(["part", "list", "--sort", "part_no", "--order", "asc", "--format", "id"])
        .assert()
        .success()
        .stdout("P-100\nP-200\nX-1\n");

    partkeep(tmp.path())
        .args(["part", "list", "--count"])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_list_pagination() {
    let tmp = setup_test_project();
    for n in ["A-1", "A-2", "A-3"] {
        add_part(&tmp, n, &[]);
    }

    partkeep(tmp.path())
        .args([
            "part", "list", "--sort", "part_no", "--order", "asc", "--limit", "2", "--page", "2",
            "--format", "id",
        ])
        .assert()
        .success()
        .stdout("A-3\n");

    partkeep(tmp.path())
        .args(["part", "list", "--limit", "2", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"hasMore\": true"))
        .stdout(predicate::str::contains("\"totalCount\": 3"));
}

#[test]
fn test_list_json_includes_attachments() {
    let tmp = setup_test_project();
    let photo = write_file(&tmp, "a.jpg", b"jpeg");
    add_part(&tmp, "P-1", &["--photo", photo.to_str().unwrap()]);

    let output = partkeep(tmp.path())
        .args(["part", "list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let part = &json["parts"][0];
    assert_eq!(part["attachments"]["photos"][0]["path"], "p-1/photos/a.jpg");
    assert_eq!(part["attachments"]["cad"].as_array().unwrap().len(), 0);
}

#[test]
fn test_list_rejects_unknown_sort_column() {
    let tmp = setup_test_project();
    partkeep(tmp.path())
        .args(["part", "list", "--sort", "photos"])
        .assert()
        .failure();
}

// ============================================================================
// Export & Check Tests
// ============================================================================

#[test]
fn test_export_writes_csv() {
    let tmp = setup_test_project();
    add_part(&tmp, "P-2", &["--name", "Shaft", "--qty", "3"]);
    add_part(&tmp, "P-1", &["--name", "Bracket, left"]);

    partkeep(tmp.path())
        .args(["export", "--output", "parts.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 part(s)"));

    let csv = fs::read_to_string(tmp.path().join("parts.csv")).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert!(lines[0].starts_with("PartNo,PartName,Description,Cost,Quantity"));
    assert!(lines[1].starts_with("P-1,\"Bracket, left\""));
    assert!(lines[2].starts_with("P-2,Shaft,,,3,"));
}

#[test]
fn test_export_to_stdout() {
    let tmp = setup_test_project();
    add_part(&tmp, "P-1", &[]);

    partkeep(tmp.path())
        .args(["export", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("PartNo,"))
        .stdout(predicate::str::contains("P-1,"));
}

#[test]
fn test_check_reports_missing_and_orphan_files() {
    let tmp = setup_test_project();
    let photo = write_file(&tmp, "a.jpg", b"jpeg");
    add_part(&tmp, "P-1", &["--photo", photo.to_str().unwrap()]);

    partkeep(tmp.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No problems found"));

    fs::remove_file(uploads(&tmp).join("p-1/photos/a.jpg")).unwrap();
    fs::write(uploads(&tmp).join("p-1/cnc/stray.nc"), b"G0").unwrap();

    partkeep(tmp.path())
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("'a.jpg' missing"))
        .stdout(predicate::str::contains("unreferenced file p-1/cnc/stray.nc"))
        .stderr(predicate::str::contains("2 problem(s) found"));
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_upload_dir_from_project_config() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join(".partkeep/config.yaml"), "upload_dir: files\n").unwrap();
    add_part(&tmp, "P-1", &[]);

    assert!(tmp.path().join("files/p-1/photos").is_dir());
    assert!(!uploads(&tmp).join("p-1").exists());
}

#[test]
fn test_init_creates_only_configured_upload_dir() {
    let tmp = TempDir::new().unwrap();
    partkeep(tmp.path())
        .env("PARTKEEP_UPLOAD_DIR", "files")
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("files/"));

    assert!(tmp.path().join("files").is_dir());
    assert!(!uploads(&tmp).exists());
}

#[test]
fn test_upload_dir_from_environment() {
    let tmp = setup_test_project();
    partkeep(tmp.path())
        .env("PARTKEEP_UPLOAD_DIR", "env-files")
        .args(["part", "add", "--part-no", "P-1"])
        .assert()
        .success();

    assert!(tmp.path().join("env-files/p-1").is_dir());
}

#[test]
fn test_project_option_from_other_directory() {
    let tmp = setup_test_project();
    let elsewhere = TempDir::new().unwrap();

    partkeep(elsewhere.path())
        .arg("--project")
        .arg(tmp.path())
        .args(["part", "add", "--part-no", "P-1"])
        .assert()
        .success();

    assert!(uploads(&tmp).join("p-1").is_dir());
}
