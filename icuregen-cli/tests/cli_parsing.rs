//! CLI argument parsing and end-to-end tests that need no ICU toolchain.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn icuregen() -> Command {
    let mut cmd = Command::cargo_bin("icuregen").expect("icuregen binary");
    cmd.env_remove("ANDROID_BUILD_TOP").env_remove("RUST_LOG");
    cmd
}

/// Android tree with just enough of external/icu for the license copy.
fn create_android_tree() -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    let root = td.path();
    fs::create_dir_all(root.join("external/icu/icu4c/source")).unwrap();
    fs::create_dir_all(root.join("external/icu/icu4j/main/shared/licenses")).unwrap();
    fs::write(
        root.join("external/icu/icu4j/main/shared/licenses/LICENSE"),
        "UNICODE LICENSE V3\n",
    )
    .unwrap();
    td
}

#[test]
fn help_lists_subcommands() {
    icuregen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("regenerate"))
        .stdout(predicate::str::contains("tz-data"))
        .stdout(predicate::str::contains("overlay"))
        .stdout(predicate::str::contains("copy-licenses"))
        .stdout(predicate::str::contains("print-filters"));
}

#[test]
fn print_filters_without_time_zones() {
    let out = icuregen()
        .args(["print-filters", "without-time-zones"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(
        json["featureFilters"]["misc"]["excludelist"],
        serde_json::json!(["metaZones", "timezoneTypes", "windowsZones", "zoneinfo64"])
    );
}

#[test]
fn print_filters_machine_learning_keeps_misc() {
    icuregen()
        .args(["print-filters", "machine-learning"])
        .assert()
        .success()
        .stdout(predicate::str::contains("brkitr_adaboost"))
        .stdout(predicate::str::contains("jaml"))
        .stdout(predicate::str::contains("misc").not());
}

#[test]
fn print_filters_rejects_unknown_variant() {
    icuregen()
        .args(["print-filters", "everything"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn regenerate_requires_android_root() {
    let temp = tempfile::tempdir().unwrap();
    icuregen()
        .current_dir(temp.path())
        .arg("regenerate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("ANDROID_BUILD_TOP"));
}

#[test]
fn regenerate_reports_missing_icu_checkout() {
    let temp = tempfile::tempdir().unwrap();
    icuregen()
        .current_dir(temp.path())
        .env("ANDROID_BUILD_TOP", temp.path())
        .args(["regenerate", "--scratch-dir"])
        .arg(temp.path().join("scratch"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("external/icu"));
}

#[test]
fn android_root_can_come_from_config_file() {
    let tree = create_android_tree();
    let work = tempfile::tempdir().unwrap();
    fs::write(
        work.path().join("icuregen.toml"),
        format!(
            "[paths]\nandroid_root = {:?}\n",
            tree.path().to_str().expect("utf8")
        ),
    )
    .unwrap();
    let target = work.path().join("out");
    fs::create_dir_all(&target).unwrap();

    icuregen()
        .current_dir(work.path())
        .args(["copy-licenses", "--target"])
        .arg(&target)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(target.join("LICENSE")).unwrap(),
        "UNICODE LICENSE V3\n"
    );
}

#[test]
fn copy_licenses_uses_android_build_top() {
    let tree = create_android_tree();
    let target = tree.path().join("dist");
    fs::create_dir_all(&target).unwrap();

    icuregen()
        .env("ANDROID_BUILD_TOP", tree.path())
        .args(["copy-licenses", "--target"])
        .arg(&target)
        .assert()
        .success();

    assert!(target.join("LICENSE").is_file());
}

#[test]
fn invalid_config_file_is_reported() {
    let work = tempfile::tempdir().unwrap();
    fs::write(work.path().join("icuregen.toml"), "[build]\nthreads = 4\n").unwrap();

    icuregen()
        .current_dir(work.path())
        .env("ANDROID_BUILD_TOP", work.path())
        .arg("regenerate")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("icuregen.toml"));
}

#[test]
fn explicit_config_path_is_used() {
    let tree = create_android_tree();
    let work = tempfile::tempdir().unwrap();
    let config = work.path().join("custom.toml");
    fs::write(
        &config,
        format!(
            "[paths]\nandroid_root = {:?}\n",
            tree.path().to_str().expect("utf8")
        ),
    )
    .unwrap();

    icuregen()
        .current_dir(work.path())
        .arg("--config")
        .arg(&config)
        .args(["copy-licenses", "--target", "."])
        .assert()
        .success();

    assert!(work.path().join("LICENSE").is_file());
}

#[test]
fn zero_max_iterations_is_rejected() {
    let temp = tempfile::tempdir().unwrap();
    icuregen()
        .current_dir(temp.path())
        .env("ANDROID_BUILD_TOP", temp.path())
        .args(["regenerate", "--max-iterations", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_iterations"));
}

#[test]
fn max_iterations_conflicts_with_unbounded() {
    icuregen()
        .args(["regenerate", "--max-iterations", "3", "--unbounded"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn tz_data_requires_tarball() {
    icuregen()
        .arg("tz-data")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--iana-tar"));
}
