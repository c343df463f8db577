//! Integration tests for Configuration System

use super::test_utils::with_isolated_env;
use folio::config::ConfigLoader;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_workspace_config(root: &std::path::Path, name: &str, contents: &str) {
    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join(name), contents).unwrap();
}

#[test]
fn test_load_defaults_without_files() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    fs::create_dir_all(&workspace).unwrap();

    let config = with_isolated_env(&temp_dir, || ConfigLoader::load(&workspace).unwrap());

    assert_eq!(config.storage.path, PathBuf::from(".folio/store"));
    assert!(!config.storage.flush_on_save);
    assert_eq!(config.identifiers.block_size, 20);
    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_workspace_file_overrides_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    write_workspace_config(
        &workspace,
        "config.toml",
        r#"
[storage]
path = "data/content"
flush_on_save = true

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = with_isolated_env(&temp_dir, || ConfigLoader::load(&workspace).unwrap());

    assert_eq!(config.storage.path, PathBuf::from("data/content"));
    assert!(config.storage.flush_on_save);
    assert_eq!(config.identifiers.block_size, 20);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_environment_file_layers_over_base() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    write_workspace_config(
        &workspace,
        "config.toml",
        "[identifiers]\nblock_size = 50\n\n[storage]\npath = \"base\"\n",
    );
    write_workspace_config(&workspace, "staging.toml", "[identifiers]\nblock_size = 5\n");

    let config = with_isolated_env(&temp_dir, || {
        std::env::set_var("FOLIO_ENV", "staging");
        ConfigLoader::load(&workspace).unwrap()
    });

    assert_eq!(config.identifiers.block_size, 5);
    assert_eq!(config.storage.path, PathBuf::from("base"));
}

#[test]
fn test_global_file_is_lowest_file_layer() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    write_workspace_config(&workspace, "config.toml", "[storage]\npath = \"workspace\"\n");

    let config = with_isolated_env(&temp_dir, || {
        let global = ConfigLoader::global_config_path().unwrap();
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(
            &global,
            "[storage]\npath = \"global\"\n\n[identifiers]\nblock_size = 7\n",
        )
        .unwrap();
        ConfigLoader::load(&workspace).unwrap()
    });

    assert_eq!(config.storage.path, PathBuf::from("workspace"));
    assert_eq!(config.identifiers.block_size, 7);
}

#[test]
fn test_environment_variables_override_files() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    write_workspace_config(
        &workspace,
        "config.toml",
        "[storage]\npath = \"from-file\"\n\n[identifiers]\nblock_size = 50\n",
    );

    let config = with_isolated_env(&temp_dir, || {
        std::env::set_var("FOLIO__STORAGE__PATH", "from-env");
        std::env::set_var("FOLIO__IDENTIFIERS__BLOCK_SIZE", "3");
        ConfigLoader::load(&workspace).unwrap()
    });

    assert_eq!(config.storage.path, PathBuf::from("from-env"));
    assert_eq!(config.identifiers.block_size, 3);
}

#[test]
fn test_load_from_file_and_validate() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("folio.toml");
    fs::write(
        &config_file,
        r#"
[identifiers]
block_size = 0

[logging]
format = "xml"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 2);
}
