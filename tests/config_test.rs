//! Configuration loading.

use std::io::Write;
use std::time::Duration;

use strictly_xo::{ClientConfig, DEFAULT_HOST};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.host(), DEFAULT_HOST);
    assert!(!*config.tls());
    assert_eq!(config.request_timeout(), None);
    assert_eq!(*config.poll_policy().max_attempts(), None);
    assert!(config.endpoints().url(strictly_xo::Endpoint::NewGame).starts_with("http://"));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let file = write_config(
        r#"
host = "localhost:3000"
poll_retry_delay_ms = 250
poll_max_attempts = 4
"#,
    );

    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(config.host(), "localhost:3000");
    assert!(!*config.tls());
    assert_eq!(
        *config.poll_policy().retry_delay(),
        Duration::from_millis(250)
    );
    assert_eq!(*config.poll_policy().max_attempts(), Some(4));
    assert_eq!(
        config.endpoints().games_channel(),
        "ws://localhost:3000/games"
    );
}

#[test]
fn test_empty_host_rejected() {
    let file = write_config("host = \"  \"\n");
    let err = ClientConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("host"));
}

#[test]
fn test_malformed_file_rejected() {
    let file = write_config("host = [\n");
    assert!(ClientConfig::from_file(file.path()).is_err());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config, ClientConfig::default());
    assert_eq!(ClientConfig::load(None).unwrap(), ClientConfig::default());
}

#[test]
fn test_flag_overrides() {
    let config = ClientConfig::default()
        .with_host("example.org".to_string())
        .with_tls(true);
    assert_eq!(
        config.endpoints().url(strictly_xo::Endpoint::Surrender),
        "https://example.org/surrender"
    );
    assert_eq!(config.endpoints().games_channel(), "wss://example.org/games");
}
