//! Options file -> typed options -> validated record

use std::io::Write;

use jobrun_core::domain::constants::{CRON_EXTENSION, STAGER_EXTENSION};
use jobrun_core::port::environment::mocks::MockEnvironment;
use jobrun_core::{
    build_config, CapabilityRef, CapabilityRegistry, ErrorKind, ExtensionSpec, GracePeriod,
    LogSeverity, OptionSet, QueueSpec,
};
use jobrun_infra_system::{load_options, options_from_json, LoadedOptions};
use tempfile::NamedTempFile;

fn options_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn registry_for(loaded: &LoadedOptions) -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::with_builtins();
    loaded.declare_into(&mut registry);
    registry
}

const TOML_OPTIONS: &str = r#"
persistence_backend = "app_repo"
node = "worker.1"
prefix = "billing"
log_severity = "debug"
shutdown_grace_period = "infinity"
poll_interval = 2000
crontab = [["0 * * * *", "app.workers.hourly"]]

[queues]
mailers = 2
default = { limit = 10, paused = true }

[capabilities]
app_repo = ["config/0"]
"#;

#[test]
fn test_toml_file_builds_full_record() {
    let file = options_file(".toml", TOML_OPTIONS);
    let loaded = load_options(Some(file.path())).unwrap();
    let registry = registry_for(&loaded);

    let config = build_config(loaded.options, &MockEnvironment::new("host-a"), &registry).unwrap();

    assert_eq!(config.node(), "worker.1");
    assert_eq!(config.prefix(), "billing");
    assert_eq!(config.persistence_backend(), &CapabilityRef::new("app_repo"));
    assert_eq!(config.log_severity(), Some(LogSeverity::Debug));
    assert_eq!(config.shutdown_grace_period(), GracePeriod::Infinite);
    assert_eq!(
        config.queues().unwrap(),
        &[
            QueueSpec::with_limit("mailers", 2),
            QueueSpec::new(
                "default",
                OptionSet::new().with("limit", 10).with("paused", true)
            ),
        ]
    );

    let extensions = config.extensions().unwrap();
    assert_eq!(extensions.len(), 2);
    assert_eq!(
        extensions[0],
        ExtensionSpec::new(STAGER_EXTENSION, OptionSet::new().with("interval", 2000))
    );
    assert_eq!(extensions[1].capability, CRON_EXTENSION);
}

#[test]
fn test_json_file_is_detected_by_extension() {
    let file = options_file(
        ".json",
        r#"{
            "persistence_backend": "app_repo",
            "extensions": false,
            "capabilities": {"app_repo": ["config/0"]}
        }"#,
    );
    let loaded = load_options(Some(file.path())).unwrap();
    let registry = registry_for(&loaded);

    let config = build_config(loaded.options, &MockEnvironment::new("host-b"), &registry).unwrap();

    assert_eq!(config.node(), "host-b");
    assert_eq!(config.extensions(), None);
}

#[test]
fn test_undeclared_backend_is_rejected() {
    let file = options_file(".toml", "persistence_backend = \"app_repo\"\n");
    let loaded = load_options(Some(file.path())).unwrap();
    let registry = registry_for(&loaded);

    let err = build_config(loaded.options, &MockEnvironment::new("host-a"), &registry).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CapabilityViolation);
    assert_eq!(err.key(), Some("persistence_backend"));
}

#[test]
fn test_backend_declared_with_wrong_export_is_rejected() {
    let loaded = options_from_json(&serde_json::json!({
        "persistence_backend": "app_repo",
        "capabilities": {"app_repo": ["init/1"]},
    }))
    .unwrap();
    let registry = registry_for(&loaded);

    let err = build_config(loaded.options, &MockEnvironment::new("host-a"), &registry).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CapabilityViolation);
    assert!(err.to_string().contains("config/0"));
}

#[test]
fn test_unknown_key_in_file_is_reported() {
    let file = options_file(
        ".toml",
        "persistence_backend = \"app_repo\"\nretries = 3\n\n[capabilities]\napp_repo = [\"config/0\"]\n",
    );
    let loaded = load_options(Some(file.path())).unwrap();
    let registry = registry_for(&loaded);

    let err = build_config(loaded.options, &MockEnvironment::new("host-a"), &registry).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnknownOption);
    assert_eq!(err.key(), Some("retries"));
}

#[test]
fn test_missing_file_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_options(Some(&dir.path().join("absent.toml"))).is_err());
}

#[test]
fn test_file_keys_keep_their_case() {
    let file = options_file(
        ".toml",
        r#"
persistence_backend = "App.Repo"
node = "worker.1"
extensions = [["App.Pruner", { batchSize = 50 }]]

[queues]
Mailers = 2
default = 5

[capabilities]
"App.Repo" = ["config/0"]
"App.Pruner" = ["init/1"]
"#,
    );
    let loaded = load_options(Some(file.path())).unwrap();
    let registry = registry_for(&loaded);

    let config = build_config(loaded.options, &MockEnvironment::new("host-a"), &registry).unwrap();

    assert_eq!(config.persistence_backend(), &CapabilityRef::new("App.Repo"));
    assert_eq!(config.queue("Mailers"), Some(&QueueSpec::with_limit("Mailers", 2)));
    assert_eq!(config.queue("mailers"), None);
    assert_eq!(
        config.extension(&CapabilityRef::new("App.Pruner")).map(|e| &e.options),
        Some(&OptionSet::new().with("batchSize", 50))
    );
}
