use std::{env, fs};

use chemsearch_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("chemsearch.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081

[search]
default_limit = 10

[export]
transient_dir = "/tmp/chemsearch-test-exports"

[logging]
level = "debug"

[[collections]]
name = "chemical"
searchable_fields = ["Substance_Name", "Substance_CASRN"]

[[collections]]
name = "target"
searchable_fields = ["intended_target_gene_symbol"]
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.server.host, "127.0.0.1");
    assert_eq!(cfg.search.default_limit, 10);
    assert_eq!(
        cfg.export.transient_dir,
        std::path::PathBuf::from("/tmp/chemsearch-test-exports")
    );
    assert_eq!(cfg.logging.level.to_ascii_lowercase(), "debug");
    assert_eq!(cfg.collections.len(), 2);
    assert_eq!(cfg.collections[0].name, "chemical");
    assert_eq!(
        cfg.collections[0].searchable_fields,
        vec!["Substance_Name", "Substance_CASRN"]
    );
    assert_eq!(cfg.storage.seed_path, None);

    // 2) Env override should win over file
    unsafe {
        env::set_var("CHEMSEARCH__SEARCH__DEFAULT_LIMIT", "9");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.search.default_limit, 9);
    unsafe {
        env::remove_var("CHEMSEARCH__SEARCH__DEFAULT_LIMIT");
    }

    // 3) Invalid values are rejected by validation
    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[search]\ndefault_limit = 0\n").expect("write toml");
    let err = load_config(bad.to_str()).unwrap_err();
    assert!(err.contains("default_limit"), "{err}");
}

#[test]
fn missing_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("absent.toml");
    let cfg = load_config(path.to_str()).expect("defaults should load");
    assert_eq!(cfg.server.port, 8080);
    assert_eq!(cfg.collections.len(), 2);
    assert_eq!(cfg.collections[1].name, "target");
}
