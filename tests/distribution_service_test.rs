//! Tests for DistributionService

use std::path::PathBuf;
use std::sync::Arc;

use rust_decimal_macros::dec;
use tempfile::TempDir;

use profitdist::application::services::{DistributionService, HierarchyFormat};
use profitdist::application::ApplicationError;
use profitdist::domain::DomainError;
use profitdist::infrastructure::traits::RealFileSystem;
use profitdist::util::testing;

const TWO_SUBSIDIARIES: &str = r#"
name = "Post of Australia"
commission_rate = "0.1"

[[children]]
name = "Post Office 1"
commission_rate = "0.1"
transactions = [
  { id = 1, category = "stamps", amount = "1000" },
  { id = 2, category = "envelopes", amount = "3000" },
]

[[children]]
name = "Post Office 2"
commission_rate = "0.2"
transactions = [
  { id = 3, category = "stamps", amount = "500" },
  { id = 4, category = "stamps", amount = "1" },
]
"#;

const ONE_SUBSIDIARY_JSON: &str = r#"{
  "name": "A",
  "commission_rate": "0.1",
  "children": [
    {"name": "B", "commission_rate": "0.1",
     "transactions": [{"id": 1, "category": "stamps", "amount": "1000"}]},
    {"name": "C", "commission_rate": "0.2"}
  ]
}"#;

fn create_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write hierarchy file");
    path
}

fn service() -> DistributionService {
    testing::init_test_setup();
    DistributionService::new(Arc::new(RealFileSystem), dec!(0.025))
}

#[test]
fn given_toml_hierarchy_when_distributing_then_returns_shares() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = create_file(&temp, "offices.toml", TWO_SUBSIDIARIES);

    // Act
    let out = service().distribute(&path).unwrap();

    // Assert
    assert_eq!(out.source, path);
    assert_eq!(out.allocation.grand_total, dec!(4501));
    assert_eq!(out.allocation.pool, dec!(112.52));
    assert_eq!(out.shares["Post of Australia"], dec!(11.25));
    assert_eq!(out.shares["Post Office 1"], dec!(90.00));
    assert_eq!(out.shares["Post Office 2"], dec!(11.27));
    assert!(out.duplicates.is_empty());
}

#[test]
fn given_json_hierarchy_when_distributing_then_parses_by_extension() {
    let temp = TempDir::new().unwrap();
    let path = create_file(&temp, "offices.json", ONE_SUBSIDIARY_JSON);

    let out = service().distribute(&path).unwrap();

    assert_eq!(out.shares["A"].to_string(), "2.50");
    assert_eq!(out.shares["B"].to_string(), "22.50");
    assert_eq!(out.shares["C"].to_string(), "0.00");
}

#[test]
fn given_shares_when_serializing_json_then_amounts_keep_two_decimals() {
    let temp = TempDir::new().unwrap();
    let path = create_file(&temp, "offices.json", ONE_SUBSIDIARY_JSON);

    let out = service().distribute(&path).unwrap();
    let json = serde_json::to_string(&out.shares).unwrap();

    assert_eq!(json, r#"{"A":"2.50","B":"22.50","C":"0.00"}"#);
}

#[test]
fn given_several_files_when_distributing_many_then_results_keep_input_order() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let first = create_file(&temp, "first.toml", TWO_SUBSIDIARIES);
    let missing = temp.path().join("missing.toml");
    let second = create_file(&temp, "second.json", ONE_SUBSIDIARY_JSON);

    // Act
    let results = service().distribute_many(&[first.clone(), missing, second.clone()]);

    // Assert
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().source, first);
    assert!(matches!(
        results[1],
        Err(ApplicationError::OperationFailed { .. })
    ));
    assert_eq!(results[2].as_ref().unwrap().source, second);
}

#[test]
fn given_malformed_file_when_distributing_then_parse_error_names_path() {
    let temp = TempDir::new().unwrap();
    let path = create_file(&temp, "broken.toml", "name = [unclosed");

    let err = service().distribute(&path).unwrap_err();

    match err {
        ApplicationError::Parse { path: p, .. } => assert_eq!(p, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn given_other_rate_when_using_with_rate_then_pool_changes() {
    let temp = TempDir::new().unwrap();
    let path = create_file(&temp, "offices.json", ONE_SUBSIDIARY_JSON);

    let out = service().with_rate(dec!(0.05)).distribute(&path).unwrap();

    assert_eq!(out.allocation.pool, dec!(50.00));
    assert_eq!(out.shares["A"], dec!(5.00));
    assert_eq!(out.shares["B"], dec!(45.00));
}

#[test]
fn given_duplicate_office_names_when_distributing_then_reports_them() {
    let temp = TempDir::new().unwrap();
    let path = create_file(
        &temp,
        "dup.toml",
        r#"
name = "hq"
[[children]]
name = "branch"
[[children]]
name = "branch"
"#,
    );

    let out = service().distribute(&path).unwrap();

    assert_eq!(out.duplicates, vec!["branch".to_string()]);
    assert_eq!(out.shares.len(), 2);
    assert_eq!(out.allocation.lines.len(), 3);
}

#[test]
fn given_named_office_when_reporting_volume_then_splits_own_and_descendants() {
    let temp = TempDir::new().unwrap();
    let path = create_file(&temp, "offices.toml", TWO_SUBSIDIARIES);
    let svc = service();

    let root = svc.volume(&path, None).unwrap();
    let po2 = svc.volume(&path, Some("Post Office 2")).unwrap();

    assert_eq!(root.office, "Post of Australia");
    assert_eq!(root.total, dec!(4501));
    assert_eq!(root.descendants, dec!(4501));
    assert_eq!(po2.total, dec!(501));
    assert_eq!(po2.descendants, dec!(0));
}

#[test]
fn given_unknown_office_when_reporting_volume_then_office_not_found() {
    let temp = TempDir::new().unwrap();
    let path = create_file(&temp, "offices.toml", TWO_SUBSIDIARIES);

    let err = service().volume(&path, Some("Nowhere")).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::OfficeNotFound(name)) if name == "Nowhere"
    ));
}

#[test]
fn given_paths_when_detecting_format_then_json_only_for_json_extension() {
    assert_eq!(
        HierarchyFormat::from_path(std::path::Path::new("a.JSON")),
        HierarchyFormat::Json
    );
    assert_eq!(
        HierarchyFormat::from_path(std::path::Path::new("a.toml")),
        HierarchyFormat::Toml
    );
    assert_eq!(
        HierarchyFormat::from_path(std::path::Path::new("hierarchy")),
        HierarchyFormat::Toml
    );
}
