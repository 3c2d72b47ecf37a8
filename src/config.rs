//! Configuration loading for the forwarder.
//!
//! The configuration is a flat JSON object, usually shipped next to the
//! Lambda binary as `config.json`. Several settings accept more than one key
//! name; each setting declares its aliases in priority order and the first
//! key present wins.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::utils::normalize_base_url;

/// File the entry point loads its configuration from.
pub const CONFIG_FILE: &str = "config.json";

/// Default time allowed to establish the TCP (and TLS) connection.
///
/// Must stay below the POST timeout, otherwise a connect that hangs is
/// indistinguishable from a slow response.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const URL_KEYS: &[&str] = &["url", "ha_url"];
const SSL_VERIFY_KEYS: &[&str] = &["ssl_verify", "ha_cert"];
const BEARER_TOKEN_KEYS: &[&str] = &["bearer_token"];
const SSL_CLIENT_KEYS: &[&str] = &["ssl_client"];
const DEBUG_KEYS: &[&str] = &["debug"];
const CONNECT_TIMEOUT_KEYS: &[&str] = &["connect_timeout"];

/// How the server certificate is verified.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SslVerify {
    #[default]
    Enabled,
    Disabled,
    /// Trust only the certificates in this PEM bundle.
    CaBundle(PathBuf),
}

/// Client certificate presented to Home Assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCertificate {
    /// One PEM file holding both the certificate and its private key.
    Combined(PathBuf),
    /// Separate certificate and key files, in that order.
    Pair { cert: PathBuf, key: PathBuf },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SslVerifyValue {
    Flag(bool),
    Bundle(PathBuf),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SslClientValue {
    Path(String),
    Files(Vec<PathBuf>),
}

/// A configuration object that has been parsed but not yet resolved.
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    values: Map<String, Value>,
}

impl RawConfig {
    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the file cannot be read, is not
    /// valid JSON, or does not hold a JSON object.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::configuration(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let value: Value = serde_json::from_str(&contents).map_err(|e| {
            Error::configuration(format!(
                "Invalid JSON in config file {}: {e}",
                path.display()
            ))
        })?;
        Self::try_from(value)
    }

    /// Returns the value of the first key in `keys` that is present.
    #[must_use]
    pub fn get(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.values.get(*key))
    }

    /// Like [`RawConfig::get`], falling back to `default` when no key is present.
    #[must_use]
    pub fn get_or<'a>(&'a self, keys: &[&str], default: &'a Value) -> &'a Value {
        self.get(keys).unwrap_or(default)
    }

    /// Resolves a setting and deserializes it into `T`.
    fn parse<T: DeserializeOwned>(&self, keys: &[&str]) -> Result<Option<T>, Error> {
        let Some((key, value)) = keys
            .iter()
            .find_map(|key| self.values.get(*key).map(|value| (*key, value)))
        else {
            return Ok(None);
        };
        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| Error::configuration(format!("Invalid value for \"{key}\": {e}")))
    }
}

impl TryFrom<Value> for RawConfig {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(Error::configuration(format!(
                "Configuration must be a JSON object, got {other}"
            ))),
        }
    }
}

/// Typed settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Home Assistant base URL, without `/api` and trailing slashes.
    pub url: String,
    pub ssl_verify: SslVerify,
    pub bearer_token: String,
    pub ssl_client: Option<ClientCertificate>,
    /// Raises log verbosity to debug for the invocation.
    pub debug: bool,
    pub connect_timeout: Duration,
}

impl Configuration {
    /// Loads the configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the file is unreadable or
    /// malformed, or if a setting is missing or has the wrong type.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::from_raw(&RawConfig::load(path.as_ref())?)
    }

    /// Builds the configuration from an in-memory JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `value` is not an object, or if a
    /// setting is missing or has the wrong type.
    pub fn from_value(value: Value) -> Result<Self, Error> {
        Self::from_raw(&RawConfig::try_from(value)?)
    }

    /// Resolves every setting of `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the URL is missing or empty, or if
    /// a present key holds a value of the wrong type.
    pub fn from_raw(raw: &RawConfig) -> Result<Self, Error> {
        let url = raw
            .parse::<String>(URL_KEYS)?
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::configuration("url is missing"))?;

        let ssl_verify = match raw.parse::<SslVerifyValue>(SSL_VERIFY_KEYS)? {
            None | Some(SslVerifyValue::Flag(true)) => SslVerify::Enabled,
            Some(SslVerifyValue::Flag(false)) => SslVerify::Disabled,
            Some(SslVerifyValue::Bundle(path)) => SslVerify::CaBundle(path),
        };

        let ssl_client = match raw.parse::<SslClientValue>(SSL_CLIENT_KEYS)? {
            None => None,
            Some(SslClientValue::Path(path)) => {
                (!path.is_empty()).then(|| ClientCertificate::Combined(path.into()))
            }
            Some(SslClientValue::Files(files)) => client_certificate_from_files(files)?,
        };

        let connect_timeout = match raw.parse::<f64>(CONNECT_TIMEOUT_KEYS)? {
            None => DEFAULT_CONNECT_TIMEOUT,
            Some(seconds) => Duration::try_from_secs_f64(seconds)
                .ok()
                .filter(|timeout| !timeout.is_zero())
                .ok_or_else(|| {
                    Error::configuration(format!(
                        "connect_timeout must be a positive number of seconds, got {seconds}"
                    ))
                })?,
        };

        Ok(Self {
            url: normalize_base_url(&url),
            ssl_verify,
            bearer_token: raw.parse(BEARER_TOKEN_KEYS)?.unwrap_or_default(),
            ssl_client,
            debug: raw.parse(DEBUG_KEYS)?.unwrap_or(false),
            connect_timeout,
        })
    }
}

impl TryFrom<Value> for Configuration {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

fn client_certificate_from_files(files: Vec<PathBuf>) -> Result<Option<ClientCertificate>, Error> {
    let mut files = files.into_iter();
    match (files.next(), files.next(), files.next()) {
        (None, _, _) => Ok(None),
        (Some(cert), Some(key), None) => Ok(Some(ClientCertificate::Pair { cert, key })),
        _ => Err(Error::configuration(
            "ssl_client must be a path or a [certificate, key] pair",
        )),
    }
}
