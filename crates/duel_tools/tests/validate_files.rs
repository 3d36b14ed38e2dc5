//! Validation against catalog files on disk.

use std::fs;

use duel_core::catalog::STANDARD_CATALOG_RON;
use duel_tools::validate::{validate_catalog_file, validate_path, ValidateError};
use tempfile::tempdir;

const BROKEN: &str = r#"(tools: [
    (id: "zap", name: "Zap", aliases: ["zap"], category: Attack, effects: [Damage(amount: 5)]),
    (id: "zip", name: "Zip", aliases: ["ZAP"], category: Attack, effects: [Damage(amount: 5)]),
])"#;

#[test]
fn directory_of_good_catalogs_passes() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("standard.ron"), STANDARD_CATALOG_RON).unwrap();
    fs::write(dir.path().join("notes.txt"), "not a catalog").unwrap();

    let reports = validate_path(dir.path()).unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].tool_count, 8);
}

#[test]
fn one_bad_file_fails_the_directory() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a_standard.ron"), STANDARD_CATALOG_RON).unwrap();
    fs::write(dir.path().join("b_broken.ron"), BROKEN).unwrap();

    let err = validate_path(dir.path()).unwrap_err();
    assert!(matches!(err, ValidateError::Invalid { failed: 1, total: 2 }), "{err}");

    let report = validate_catalog_file(&dir.path().join("b_broken.ron")).unwrap();
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].to_string().contains("zap"));
}

#[test]
fn empty_directory_is_an_error() {
    let dir = tempdir().unwrap();
    assert!(matches!(validate_path(dir.path()), Err(ValidateError::NoCatalogs(_))));
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = validate_path(&dir.path().join("missing.ron")).unwrap_err();
    assert!(matches!(err, ValidateError::Game(_)));
}
