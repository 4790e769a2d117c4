use super::*;

#[test]
fn missing_fields_resolve_to_defaults() {
	let raw = RawConfig::default();
	let cfg = Config::try_from(raw).unwrap();
	assert_eq!(cfg.store_path, PathBuf::from(DEFAULT_STORE_PATH));
	assert_eq!(cfg.pool_size, DEFAULT_POOL_SIZE);
}

#[test]
fn parses_a_full_yaml_document() {
	let yaml = r#"
storePath: /var/lib/proxylog/store.sqlite3
poolSize: 8
scope:
  - - url: "^https://example\\.com/"
logging:
  filter: "proxylog=debug"
  json: true
"#;
	let raw: RawConfig = serde_yaml::from_str(yaml).unwrap();
	let cfg = Config::try_from(raw).unwrap();
	assert_eq!(cfg.store_path, PathBuf::from("/var/lib/proxylog/store.sqlite3"));
	assert_eq!(cfg.pool_size, 8);
	assert!(cfg.scope.in_scope("https://example.com/a", &[], b""));
	assert!(!cfg.scope.in_scope("https://other.test/", &[], b""));
	assert_eq!(cfg.logging.filter, "proxylog=debug");
	assert!(cfg.logging.json);
}

#[test]
fn unknown_field_is_rejected() {
	let yaml = "bogusField: true\n";
	let result: Result<RawConfig, _> = serde_yaml::from_str(yaml);
	assert!(result.is_err());
}

#[test]
fn invalid_scope_regex_surfaces_as_scope_error() {
	let yaml = "scope:\n  - - url: \"(\"\n";
	let raw: RawConfig = serde_yaml::from_str(yaml).unwrap();
	let err = Config::try_from(raw).unwrap_err();
	assert!(matches!(err, Error::Scope(_)));
}

#[test]
fn load_with_missing_file_falls_back_to_defaults() {
	let cfg = load(std::path::Path::new("/nonexistent/proxylog-config-does-not-exist.yaml")).unwrap();
	assert_eq!(cfg.pool_size, DEFAULT_POOL_SIZE);
}
