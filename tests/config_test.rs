//! Integration tests for Settings config loading.
//!
//! Layer tests pass explicit global paths and environment maps, so the
//! machine's own config and environment do not leak in.

use std::fs;

use config::Map;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use profitdist::application::ApplicationError;
use profitdist::config::{local_config_path, OutputFormat, Settings};

fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
    Some(
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

#[test]
fn given_local_config_with_rate_when_load_file_then_overrides_default() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = local_config_path(dir.path());
    fs::write(&path, "overall_rate = \"0.04\"\n").unwrap();

    // Act
    let settings = Settings::load_file(&path).expect("load settings");

    // Assert
    assert_eq!(settings.overall_rate, dec!(0.04));
    assert_eq!(settings.output, OutputFormat::Text);
}

#[test]
fn given_local_config_with_numeric_rate_when_load_file_then_parses_exactly() {
    let dir = TempDir::new().unwrap();
    let path = local_config_path(dir.path());
    fs::write(&path, "overall_rate = 0.03\noutput = \"json\"\n").unwrap();

    let settings = Settings::load_file(&path).expect("load settings");

    assert_eq!(settings.overall_rate, dec!(0.03));
    assert_eq!(settings.output, OutputFormat::Json);
}

#[test]
fn given_invalid_local_config_when_load_file_then_config_error() {
    let dir = TempDir::new().unwrap();
    let path = local_config_path(dir.path());
    fs::write(&path, "overall_rate = \"not a number\"\n").unwrap();

    let result = Settings::load_file(&path);

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().starts_with("config error"));
}

#[test]
fn given_directory_without_local_config_when_load_file_then_error() {
    let dir = TempDir::new().unwrap();
    assert!(Settings::load_file(&local_config_path(dir.path())).is_err());
}

#[test]
fn given_settings_when_rendering_toml_then_round_trips_through_load_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("copy.toml");
    let original = Settings {
        overall_rate: dec!(0.0375),
        output: OutputFormat::Json,
    };

    fs::write(&path, original.to_toml().unwrap()).unwrap();
    let loaded = Settings::load_file(&path).unwrap();

    assert_eq!(loaded, original);
}

// ============================================================
// Layered loading
// ============================================================

#[test]
fn given_local_config_when_loading_layers_then_picks_it_up() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "overall_rate = \"0.04\"\n").unwrap();

    // Act
    let settings = Settings::load_layers(None, Some(dir.path()), env(&[])).unwrap();

    // Assert
    assert_eq!(settings.overall_rate, dec!(0.04));
    assert_eq!(settings.output, OutputFormat::Text);
}

#[test]
fn given_global_and_local_config_when_loading_layers_then_local_wins_per_field() {
    // Arrange
    let global_dir = TempDir::new().unwrap();
    let global = global_dir.path().join("profitdist.toml");
    fs::write(&global, "overall_rate = \"0.01\"\noutput = \"json\"\n").unwrap();
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "overall_rate = \"0.04\"\n").unwrap();

    // Act
    let settings = Settings::load_layers(Some(&global), Some(dir.path()), env(&[])).unwrap();

    // Assert
    assert_eq!(settings.overall_rate, dec!(0.04));
    assert_eq!(settings.output, OutputFormat::Json);
}

#[test]
fn given_missing_config_files_when_loading_layers_then_defaults() {
    let dir = TempDir::new().unwrap();
    let global = dir.path().join("absent.toml");

    let settings = Settings::load_layers(Some(&global), Some(dir.path()), env(&[])).unwrap();

    assert_eq!(settings, Settings::default());
}

#[test]
fn given_env_variables_when_loading_layers_then_they_beat_local_config() {
    // Arrange
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "overall_rate = \"0.04\"\noutput = \"text\"\n",
    )
    .unwrap();
    let vars = env(&[
        ("PROFITDIST_OVERALL_RATE", "0.05"),
        ("PROFITDIST_OUTPUT", "json"),
        ("UNRELATED_OVERALL_RATE", "0.9"),
    ]);

    // Act
    let settings = Settings::load_layers(None, Some(dir.path()), vars).unwrap();

    // Assert
    assert_eq!(settings.overall_rate, dec!(0.05));
    assert_eq!(settings.output, OutputFormat::Json);
}

#[test]
fn given_malformed_env_rate_when_loading_layers_then_config_error() {
    let dir = TempDir::new().unwrap();

    let result = Settings::load_layers(
        None,
        Some(dir.path()),
        env(&[("PROFITDIST_OVERALL_RATE", "two percent")]),
    );

    match result {
        Err(ApplicationError::Config { message }) => {
            assert!(message.contains("PROFITDIST_OVERALL_RATE"), "{message}")
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn given_unknown_env_output_when_loading_layers_then_config_error() {
    let result = Settings::load_layers(None, None, env(&[("PROFITDIST_OUTPUT", "yaml")]));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_process_env_rate_when_loading_then_overrides_local_config() {
    // Only test in this binary touching the process environment
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "overall_rate = \"0.04\"\n").unwrap();
    std::env::set_var("PROFITDIST_OVERALL_RATE", "0.05");

    let result = Settings::load(Some(dir.path()));
    std::env::remove_var("PROFITDIST_OVERALL_RATE");

    assert_eq!(result.unwrap().overall_rate, dec!(0.05));
}
