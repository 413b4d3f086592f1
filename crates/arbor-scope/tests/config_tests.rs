use std::io::Write;

use arbor_scope::{ConfigError, FunctionRef, NamingConfig, ObjectRef, ScopeConfig, ScopeTree};

#[test]
fn test_empty_source_gives_defaults() {
    let config = ScopeConfig::from_toml_str("").unwrap();
    assert_eq!(config, ScopeConfig::default());
    assert_eq!(config.naming.last_result_key, "last-execution-result");
    assert_eq!(config.table.compact_threshold, arbor_table::DEFAULT_COMPACT_THRESHOLD);
}

#[test]
fn test_partial_naming_table_keeps_other_defaults() {
    let config = ScopeConfig::from_toml_str(
        r#"
        [naming]
        function_prefix = "fn:"
        last_result_key = "_"

        [table]
        compact_threshold = 4
        "#,
    )
    .unwrap();

    assert_eq!(config.naming.function_prefix, "fn:");
    assert_eq!(config.naming.last_result_key, "_");
    assert_eq!(config.naming.call_scope_prefix, NamingConfig::default().call_scope_prefix);
    assert_eq!(config.table.compact_threshold, 4);
}

#[test]
fn test_malformed_toml_is_a_parse_error() {
    let err = ScopeConfig::from_toml_str("[naming\nfunction_prefix = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_empty_prefix_is_invalid() {
    let err = ScopeConfig::from_toml_str("[naming]\nthread_scope_prefix = \"\"").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_overlapping_prefixes_are_invalid() {
    let err = ScopeConfig::from_toml_str(
        "[naming]\nfunction_prefix = \"__x_\"\ncall_scope_prefix = \"__x_call_\"",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_last_result_key_inside_prefix_namespace_is_invalid() {
    let err = ScopeConfig::from_toml_str(
        "[naming]\nlast_result_key = \"__arbor_inner_function_result\"",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[naming]\ncall_scope_prefix = \"call:\"").unwrap();

    let config = ScopeConfig::from_file(file.path()).unwrap();
    assert_eq!(config.naming.call_scope_prefix, "call:");
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ScopeConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_serialized_config_loads_back() {
    let mut config = ScopeConfig::default();
    config.naming.thread_scope_prefix = "thread:".to_string();
    config.table.compact_threshold = 8;

    let source = config.to_toml_string().unwrap();
    assert_eq!(ScopeConfig::from_toml_str(&source).unwrap(), config);
}

#[test]
fn test_tree_uses_configured_naming() {
    let config = ScopeConfig::from_toml_str(
        "[naming]\nfunction_prefix = \"fn:\"\nlast_result_key = \"_\"",
    )
    .unwrap();
    let mut tree = ScopeTree::with_config(config).unwrap();
    let root = tree.create_scope();

    let function = FunctionRef::from_raw(3).unwrap();
    tree.add_function(root, "main()", function).unwrap();
    assert!(tree.get(root, "fn:main()").unwrap().is_some());
    assert_eq!(tree.get_function(root, "main()").unwrap(), Some(function));

    let object = ObjectRef::from_raw(1).unwrap();
    tree.update_last_exec_res(root, Some(object)).unwrap();
    assert_eq!(tree.get_object(root, "_").unwrap(), Some(object));
}

#[test]
fn test_with_config_rejects_invalid_config() {
    let mut config = ScopeConfig::default();
    config.naming.function_prefix.clear();
    assert!(matches!(ScopeTree::with_config(config), Err(ConfigError::Invalid(_))));
}
