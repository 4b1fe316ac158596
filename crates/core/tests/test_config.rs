//! Tests for configuration parsing

use jshunter_core::config::{CONFIG_FILE_NAME, SHALLOW_TRAVERSAL_DEPTH};
use jshunter_core::JshunterConfig;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = JshunterConfig::default();
    assert_eq!(config.analysis.confidence_threshold, 0.5);
    assert_eq!(config.analysis.max_traversal_depth, 200);
    assert!(config.analysis.enable_variable_tracking);
    assert!(config.analysis.enable_object_property_analysis);
    assert!(!config.analysis.allow_partial_parse);
    assert_eq!(config.heuristics.graphql_min_length, 15);
    assert_eq!(config.heuristics.schema_keyword_limit, 2);
    assert!(config.modules.urls && config.modules.httpapi);
    assert!(config.ignore.paths.contains(&"node_modules/".to_string()));
    assert_eq!(config.output.format, "json");
    assert!(config.output.pretty);
}

#[test]
fn test_serialize_config() {
    let config = JshunterConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    assert!(toml_str.contains("confidence_threshold"));
    assert!(toml_str.contains("[modules]"));
}

#[test]
fn test_partial_config_keeps_defaults() {
    let toml_str = r#"
[analysis]
confidence_threshold = 0.75
include_relative_paths = false

[modules]
graphql = false
"#;

    let config: JshunterConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.analysis.confidence_threshold, 0.75);
    assert!(!config.analysis.include_relative_paths);
    assert_eq!(config.analysis.max_traversal_depth, 200);
    assert!(!config.modules.graphql);
    assert!(config.modules.domxss);
    assert_eq!(config.heuristics.schema_min_length, 20);
}

#[test]
fn test_effective_max_depth() {
    let mut config = JshunterConfig::default();
    assert_eq!(config.analysis.effective_max_depth(), 200);

    config.analysis.enable_deep_traversal = false;
    assert_eq!(config.analysis.effective_max_depth(), SHALLOW_TRAVERSAL_DEPTH);

    config.analysis.max_traversal_depth = 4;
    assert_eq!(config.analysis.effective_max_depth(), 4);
}

#[test]
fn test_save_and_load() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(CONFIG_FILE_NAME);

    let mut config = JshunterConfig::default();
    config.analysis.confidence_threshold = 0.9;
    config.modules.events = false;
    config.ignore.paths = vec!["dist/".to_string()];
    config.save(&path).unwrap();

    let loaded = JshunterConfig::from_file(&path).unwrap();
    assert_eq!(loaded.analysis.confidence_threshold, 0.9);
    assert!(!loaded.modules.events);
    assert_eq!(loaded.ignore.paths, vec!["dist/"]);
}

#[test]
fn test_find_and_load_walks_up() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(CONFIG_FILE_NAME),
        "[analysis]\nmax_traversal_depth = 42\n",
    )
    .unwrap();

    let nested = tmp.path().join("src").join("app");
    std::fs::create_dir_all(&nested).unwrap();

    let config = JshunterConfig::find_and_load(&nested).unwrap();
    assert_eq!(config.analysis.max_traversal_depth, 42);
}

#[test]
fn test_invalid_config_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "[analysis\nconfidence_threshold = ").unwrap();

    assert!(JshunterConfig::from_file(&path).is_err());
}
