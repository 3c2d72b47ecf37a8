// Configuration loading tests
#![allow(clippy::unwrap_used)]

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use haaska::config::{ClientCertificate, Configuration, DEFAULT_CONNECT_TIMEOUT, SslVerify};
use haaska::Error;
use serde_json::json;
use tempfile::NamedTempFile;

#[test]
fn test_defaults() -> Result<()> {
    let config = Configuration::from_value(json!({"url": "http://localhost:8123"}))?;

    assert_eq!(config.url, "http://localhost:8123");
    assert_eq!(config.ssl_verify, SslVerify::Enabled);
    assert_eq!(config.bearer_token, "");
    assert_eq!(config.ssl_client, None);
    assert!(!config.debug);
    assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
    Ok(())
}

#[test]
fn test_full_configuration() -> Result<()> {
    let config = Configuration::from_value(json!({
        "url": "https://hass.example.com/api/",
        "bearer_token": "secret",
        "ssl_verify": false,
        "ssl_client": ["/etc/ssl/client.crt", "/etc/ssl/client.key"],
        "debug": true,
    }))?;

    assert_eq!(config.url, "https://hass.example.com");
    assert_eq!(config.bearer_token, "secret");
    assert_eq!(config.ssl_verify, SslVerify::Disabled);
    assert_eq!(
        config.ssl_client,
        Some(ClientCertificate::Pair {
            cert: PathBuf::from("/etc/ssl/client.crt"),
            key: PathBuf::from("/etc/ssl/client.key"),
        })
    );
    assert!(config.debug);
    Ok(())
}

#[test]
fn test_legacy_key_names() -> Result<()> {
    let config = Configuration::from_value(json!({
        "ha_url": "http://hass.local:8123/api",
        "ha_cert": "/etc/ssl/ca.pem",
    }))?;

    assert_eq!(config.url, "http://hass.local:8123");
    assert_eq!(
        config.ssl_verify,
        SslVerify::CaBundle(PathBuf::from("/etc/ssl/ca.pem"))
    );
    Ok(())
}

#[test]
fn test_url_takes_priority_over_ha_url() -> Result<()> {
    let config = Configuration::from_value(json!({
        "ha_url": "http://legacy:8123",
        "url": "http://current:8123",
        "ha_cert": false,
        "ssl_verify": true,
    }))?;

    assert_eq!(config.url, "http://current:8123");
    assert_eq!(config.ssl_verify, SslVerify::Enabled);
    Ok(())
}

#[test]
fn test_missing_url() {
    let err = Configuration::from_value(json!({"bearer_token": "secret"})).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(err.to_string(), "url is missing");
}

#[test]
fn test_empty_url() {
    let err = Configuration::from_value(json!({"url": ""})).unwrap_err();
    assert_eq!(err.to_string(), "url is missing");
}

#[test]
fn test_wrong_type_names_the_key() {
    let err = Configuration::from_value(json!({"url": "http://h", "debug": "yes"})).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(err.to_string().contains("\"debug\""), "{err}");
}

#[test]
fn test_single_client_certificate_path() -> Result<()> {
    let config = Configuration::from_value(json!({
        "url": "http://h",
        "ssl_client": "/etc/ssl/client.pem",
    }))?;

    assert_eq!(
        config.ssl_client,
        Some(ClientCertificate::Combined(PathBuf::from("/etc/ssl/client.pem")))
    );
    Ok(())
}

#[test]
fn test_empty_client_certificate() -> Result<()> {
    for ssl_client in [json!(""), json!([])] {
        let config = Configuration::from_value(json!({"url": "http://h", "ssl_client": ssl_client}))?;
        assert_eq!(config.ssl_client, None);
    }
    Ok(())
}

#[test]
fn test_client_certificate_list_must_be_a_pair() {
    let err = Configuration::from_value(json!({
        "url": "http://h",
        "ssl_client": ["a.crt", "a.key", "extra"],
    }))
    .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_load_from_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"{{"url": "http://localhost:8123/", "bearer_token": "token", "debug": false}}"#
    )?;

    let config = Configuration::load(file.path())?;
    assert_eq!(config.url, "http://localhost:8123");
    assert_eq!(config.bearer_token, "token");
    Ok(())
}

#[test]
fn test_load_malformed_json() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    write!(file, r#"{{"url": "http://localhost:8123","#)?;

    let err = Configuration::load(file.path()).unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(message.starts_with("Invalid JSON in config file"), "{message}");
    assert!(message.contains(&file.path().display().to_string()), "{message}");
    Ok(())
}

#[test]
fn test_load_missing_file() {
    let err = Configuration::load("/nonexistent/config.json").unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(err.to_string().contains("/nonexistent/config.json"));
}

#[test]
fn test_connect_timeout() -> Result<()> {
    let config = Configuration::from_value(json!({"url": "http://h", "connect_timeout": 2.5}))?;
    assert_eq!(config.connect_timeout, Duration::from_millis(2500));
    Ok(())
}

#[test]
fn test_connect_timeout_must_be_positive() {
    for connect_timeout in [json!(0), json!(-1), json!("10")] {
        let err = Configuration::from_value(json!({"url": "http://h", "connect_timeout": connect_timeout}))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "{err}");
    }
}
