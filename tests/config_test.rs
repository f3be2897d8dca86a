// tests/config_test.rs
use git_release_manager::config::{load_config, parse_config, Config};
use git_release_manager::domain::{VersionBump, VersioningStrategy};
use git_release_manager::features::{Feature, FeatureSetting, Features};
use std::io::Write;
use tempfile::NamedTempFile;

const FULL_FIXTURE: &str = "tests/fixtures/gitrelease_full.toml";

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.github.host, "github.com");
    assert!(config.github.token.is_none());
    assert!(config.project.owner.is_none());
    assert!(config.features.entries.is_empty());
    assert_eq!(config.behavior.default_bump, VersionBump::Minor);
    assert!(config.behavior.confirm);
}

#[test]
fn test_empty_document_is_default() {
    let config = parse_config("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_full_fixture() {
    let config = load_config(Some(FULL_FIXTURE)).unwrap();

    assert_eq!(config.project.owner.as_deref(), Some("acme"));
    assert_eq!(config.project.repo.as_deref(), Some("widgets"));
    assert_eq!(
        config.project.versioning_strategy,
        Some(VersioningStrategy::Calver)
    );
    assert_eq!(config.github.host, "github.example.com");
    assert_eq!(
        config.github.api_base_url.as_deref(),
        Some("https://github.example.com/api/v3")
    );
    assert_eq!(config.behavior.default_bump, VersionBump::Patch);
    assert!(!config.behavior.confirm);

    let create_rc = config.features.get("create_rc").unwrap();
    assert_eq!(create_rc.on_success.as_deref(), Some("./scripts/announce.sh"));
    assert!(config.features.get("patch").unwrap().omit);
    assert!(config.features.get("promote_rc").is_none());
}

#[test]
fn test_fixture_feature_settings() {
    let config = load_config(Some(FULL_FIXTURE)).unwrap();
    let features = Features::from_config(&config.features);

    assert!(matches!(
        features.get(Feature::CreateRc),
        FeatureSetting::Shown { on_success: Some(_) }
    ));
    assert!(matches!(
        features.get(Feature::PromoteRc),
        FeatureSetting::Shown { on_success: None }
    ));
    assert!(features.get(Feature::Patch).is_omitted());
    assert!(matches!(features.get(Feature::Custom), FeatureSetting::Custom(_)));
}

#[test]
fn test_partial_tables_keep_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[github]
token = "ghp_example"

[behavior]
confirm = false
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.github.host, "github.com");
    assert_eq!(config.github.token.as_deref(), Some("ghp_example"));
    assert_eq!(config.behavior.default_bump, VersionBump::Minor);
    assert!(!config.behavior.confirm);
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let err = parse_config("[project]\nversioning_strategy = \"romver\"\n").unwrap_err();
    assert!(err.is_validation(), "expected config error, got {}", err);
}

#[test]
fn test_missing_custom_path_fails() {
    let err = load_config(Some("does/not/exist.toml")).unwrap_err();
    assert!(err.to_string().contains("does/not/exist.toml"));
}
