//! Tests for bootstrap configuration and root folder resolution
//!
//! Tests that manipulate DISCSHELF_ROOT_FOLDER are marked #[serial] so they
//! never race each other on the process environment.

use discshelf_common::config::{
    load_toml_config, read_toml_config, write_toml_config, CompiledDefaults,
    RootFolderInitializer, RootFolderResolver, TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let root_folder = RootFolderResolver::new().resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/discshelf-env-root");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/discshelf-toml-root")),
        ..TomlConfig::default()
    };

    let root_folder = RootFolderResolver::new().with_toml(&toml).resolve();
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root_folder, PathBuf::from("/tmp/discshelf-env-root"));
}

#[test]
#[serial]
fn test_resolver_cli_arg_has_highest_priority() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/discshelf-env-root");

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(Some(PathBuf::from("/tmp/discshelf-cli-root")))
        .resolve();
    env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(root_folder, PathBuf::from("/tmp/discshelf-cli-root"));
}

#[test]
#[serial]
fn test_resolver_uses_toml_when_env_absent() {
    env::remove_var(ROOT_FOLDER_ENV);
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/discshelf-toml-root")),
        ..TomlConfig::default()
    };

    let root_folder = RootFolderResolver::new().with_toml(&toml).resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/discshelf-toml-root"));
}

#[test]
fn test_initializer_creates_directory_and_names_database() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("nested").join("root");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("discshelf.db"));
}

#[test]
fn test_missing_toml_falls_back_to_defaults() {
    let temp = tempfile::tempdir().unwrap();

    let config = load_toml_config(&temp.path().join("absent.toml"));

    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_invalid_toml_falls_back_to_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("broken.toml");
    std::fs::write(&path, "port = \"not a number").unwrap();

    assert!(read_toml_config(&path).is_err());
    assert_eq!(load_toml_config(&path), TomlConfig::default());
}

#[test]
fn test_write_then_read_preserves_token() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("conf").join("discshelf.toml");

    let config = TomlConfig {
        discogs_token: Some("abc123".to_string()),
        port: 9000,
        ..TomlConfig::default()
    };
    write_toml_config(&config, &path).unwrap();

    let loaded = read_toml_config(&path).unwrap();
    assert_eq!(loaded.discogs_token.as_deref(), Some("abc123"));
    assert_eq!(loaded.port, 9000);
    assert!(!path.with_extension("toml.tmp").exists());
}
