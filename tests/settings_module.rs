use clawboot::settings::{
    bootstrap_state_dirs, BootSettings, ConfigPolicy, SettingsError, StatePaths, SETTINGS_ENV_VAR,
};
use clawboot::shared::Env;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn partial_yaml_keeps_defaults_for_missing_fields() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("settings.yaml");
    fs::write(
        &path,
        "config_dir: /data/openclaw\nports:\n  notion: 9001\nconfig_policy: keep_restored\n",
    )
    .expect("write settings");

    let settings = BootSettings::resolve(&Env::from_pairs([(
        SETTINGS_ENV_VAR,
        path.display().to_string(),
    )]))
    .expect("resolve");

    assert_eq!(settings.config_dir, PathBuf::from("/data/openclaw"));
    assert_eq!(settings.ports.notion, 9001);
    assert_eq!(settings.ports.gateway, 18789);
    assert_eq!(settings.config_policy, ConfigPolicy::KeepRestored);
    assert_eq!(settings.binaries.gateway, "openclaw");
    assert_eq!(settings.gateway_signature(), "openclaw gateway");
}

#[test]
fn invalid_settings_are_rejected_at_resolve() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("settings.yaml");
    fs::write(&path, "workspace_dir: relative/clawd\n").expect("write settings");
    let env = Env::from_pairs([(SETTINGS_ENV_VAR, path.display().to_string())]);

    let err = BootSettings::resolve(&env).expect_err("relative path rejected");
    assert!(matches!(err, SettingsError::Invalid(_)));
    assert!(err.to_string().contains("workspace_dir"));
}

#[test]
fn malformed_yaml_reports_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("settings.yaml");
    fs::write(&path, "ports: [not, a, map]\n").expect("write settings");

    let err = BootSettings::from_path(&path).expect_err("parse error");
    assert!(matches!(err, SettingsError::Parse { .. }));
    assert!(err.to_string().contains("settings.yaml"));
}

#[test]
fn state_paths_derive_from_settings() {
    let dir = tempdir().expect("tempdir");
    let settings = BootSettings {
        config_dir: dir.path().join("config"),
        workspace_dir: dir.path().join("workspace"),
        skills_dir: dir.path().join("workspace/skills"),
        state_dir: dir.path().join("state"),
        ..BootSettings::default()
    };
    let paths = StatePaths::from_settings(&settings);

    assert_eq!(paths.config_file, dir.path().join("config/openclaw.json"));
    assert_eq!(paths.workspace_link(), dir.path().join("config/workspace"));
    assert_eq!(paths.log_file(), dir.path().join("state/logs/bootstrap.log"));
    assert_eq!(
        paths.sidecar_dir("notion"),
        dir.path().join("state/sidecars/notion")
    );

    bootstrap_state_dirs(&paths).expect("bootstrap dirs");
    for path in paths.required_directories() {
        assert!(path.is_dir(), "{}", path.display());
    }
}
