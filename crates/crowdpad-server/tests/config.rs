// crates/crowdpad-server/tests/config.rs
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crowdpad_server::config::{write_default, CONFIG_FILE_NAME};
use crowdpad_server::{Config, ConfigError, RetryPolicy};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("crowdpad-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn empty_file_yields_defaults() {
    let (config, unknown) = Config::from_toml_str("").unwrap();
    assert_eq!(config, Config::default());
    assert!(unknown.is_empty());
    assert_eq!(config.socket_addr_string(), "127.0.0.1:5001");
    assert_eq!(config.app.tick_rate, 120);
    assert!(config.app.run_forever);
}

#[test]
fn partial_sections_merge_with_defaults() {
    let text = r#"
        [app]
        socket_port = 6000
        run_forever = false
        max_connect_attempts = 3

        [http]
        port = 8080
    "#;
    let (config, unknown) = Config::from_toml_str(text).unwrap();

    assert!(unknown.is_empty());
    assert_eq!(config.app.socket_port, 6000);
    assert_eq!(config.app.socket_address, "127.0.0.1");
    assert_eq!(config.http.port, 8080);
    assert_eq!(config.logging.level, "info");
    assert_eq!(
        config.retry_policy(),
        RetryPolicy::bounded(3, Duration::from_millis(1000))
    );
}

#[test]
fn unknown_keys_are_reported_not_fatal() {
    let text = r#"
        colour = true

        [app]
        tick_rate = 60
        mystery = 1

        [flask]
        DEBUG = false
    "#;
    let (config, mut unknown) = Config::from_toml_str(text).unwrap();
    unknown.sort();

    assert_eq!(config.app.tick_rate, 60);
    assert_eq!(unknown, vec!["app.mystery", "colour", "flask"]);
}

#[test]
fn wrong_types_fail_to_parse() {
    let err = Config::from_toml_str("[app]\nsocket_port = \"five\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn validation_rejects_bad_values() {
    let mut config = Config::default();
    config.app.tick_rate = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.app.socket_port = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.app.socket_address = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.app.run_forever = false;
    config.app.max_connect_attempts = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.app.retry_delay_ms = 0;
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

    let mut config = Config::default();
    config.app.run_forever = false;
    config.app.max_connect_attempts = 0;

    // The attempt cap is irrelevant when retrying forever.
    config.app.run_forever = true;
    assert!(config.validate().is_ok());
}

#[test]
fn environment_overrides_apply() {
    let vars: HashMap<&str, &str> = [
        ("CROWDPAD_SOCKET_ADDRESS", "10.0.0.2"),
        ("CROWDPAD_SOCKET_PORT", "7001"),
        ("CROWDPAD_TICK_RATE", "30"),
    ]
    .into_iter()
    .collect();

    let mut config = Config::default();
    config
        .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
        .unwrap();

    assert_eq!(config.socket_addr_string(), "10.0.0.2:7001");
    assert_eq!(config.app.tick_rate, 30);
    assert_eq!(config.http.port, 5000);

    let err = config
        .apply_overrides(|k| (k == "CROWDPAD_HTTP_PORT").then(|| "http".to_string()))
        .unwrap_err();
    assert!(matches!(err, ConfigError::BadOverride { .. }));
}

#[test]
fn sender_config_follows_app_section() {
    let mut config = Config::default();
    config.app.socket_address = "emu.local".to_string();
    config.app.tick_rate = 50;
    config.app.retry_delay_ms = 250;
    config.app.connect_timeout_ms = 400;

    let sender = config.sender_config();
    assert_eq!(sender.addr, "emu.local:5001");
    assert_eq!(sender.tick_rate, 50);
    assert_eq!(sender.retry, RetryPolicy::forever(Duration::from_millis(250)));
    assert_eq!(sender.connect_timeout, Duration::from_millis(400));
}

#[test]
fn missing_config_is_created_with_defaults() {
    let dir = scratch_dir("create");

    let (config, path) = Config::load(None, &dir).unwrap();

    assert_eq!(path, dir.join(CONFIG_FILE_NAME));
    assert!(path.is_file());
    assert_eq!(config, Config::default());

    // The written file reads back identically.
    let (reloaded, unknown) = Config::from_toml_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(reloaded, Config::default());
    assert!(unknown.is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn explicit_path_is_used_and_validated() {
    let dir = scratch_dir("explicit");
    let path = dir.join("custom.toml");
    write_default(&path).unwrap();
    fs::write(&path, "[app]\ntick_rate = 0\n").unwrap();

    let err = Config::load(Some(&path), &dir).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let missing = dir.join("nope.toml");
    let err = Config::load(Some(&missing), &dir).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn partial_file_gains_missing_defaults_on_load() {
    let dir = scratch_dir("fill");
    let path = dir.join("partial.toml");
    fs::create_dir_all(&dir).unwrap();
    fs::write(&path, "[app]\nsocket_port = 6001\ncolour = \"blue\"\n").unwrap();

    let (config, _) = Config::load(Some(&path), &dir).unwrap();
    assert_eq!(config.app.socket_port, 6001);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("tick_rate"));
    assert!(text.contains("[http]"));
    assert!(text.contains("colour"));

    let (reloaded, unknown) = Config::from_toml_str(&text).unwrap();
    assert_eq!(reloaded.app.socket_port, 6001);
    assert_eq!(reloaded.http, Config::default().http);
    assert_eq!(unknown, vec!["app.colour".to_string()]);

    // A complete file is left alone.
    let before = fs::read_to_string(&path).unwrap();
    Config::load(Some(&path), &dir).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), before);

    let _ = fs::remove_dir_all(&dir);
}
