//! Loading through the public API with an overridden home directory.

use warrant_config::{Config, ConfigError, ConfigLayer, ShowFormat};

#[test]
fn test_user_and_explicit_layers() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join("config.toml"),
        "[rights]\nfile = \"/srv/warrant/rights\"\n\n[logging]\nformat = \"json\"\n",
    )
    .unwrap();

    let explicit = home.path().join("override.toml");
    std::fs::write(&explicit, "[rights]\nreload = \"on_change\"\n").unwrap();

    let resolved = Config::load_with_home(Some(&explicit), home.path()).unwrap();

    assert_eq!(
        resolved.config.rights.file.as_deref(),
        Some("/srv/warrant/rights")
    );
    assert_eq!(resolved.config.rights.reload, "on_change");
    assert_eq!(resolved.config.logging.format, "json");
    assert_eq!(
        resolved.field_sources.get("rights.reload"),
        Some(&ConfigLayer::Explicit)
    );
    assert!(
        resolved
            .loaded_files
            .last()
            .is_some_and(|f| f.ends_with("override.toml"))
    );

    let shown = resolved.show(ShowFormat::Toml, Some("rights")).unwrap();
    assert!(shown.contains("reload = \"on_change\"  # [explicit]"));
}

#[test]
fn test_missing_explicit_file() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("missing.toml");
    let err = Config::load_with_home(Some(&missing), home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
    assert!(err.to_string().contains("missing.toml"));
}

#[test]
fn test_load_file_rejects_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"loud\"\n").unwrap();

    let err = Config::load_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

#[test]
fn test_unknown_keys_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[rights]\nreload = \"always\"\nlegacy_option = 3\n").unwrap();

    assert!(Config::load_file(&path).is_ok());
}
