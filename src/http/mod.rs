//! HTTP client construction for talking to Home Assistant.

pub mod client;

use std::fs;
use std::path::Path;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Certificate, Client, Identity};

use crate::config::{ClientCertificate, Configuration, SslVerify};
use crate::error::Error;

pub use client::{DEFAULT_TIMEOUT, HomeAssistant};

/// Environment variable holding the AWS region the function runs in.
pub const REGION_ENV: &str = "AWS_DEFAULT_REGION";

/// Product prefix of the User-Agent sent to Home Assistant.
pub const USER_AGENT_PREFIX: &str = "Home Assistant Alexa Smart Home Skill";

/// Identifies the underlying HTTP library, which sends no User-Agent of its own.
/// Keep the version in step with the `reqwest` requirement in `Cargo.toml`.
const HTTP_LIBRARY_USER_AGENT: &str = "reqwest/0.12";

/// Builds the User-Agent string for the given region (`unknown` when unset).
#[must_use]
pub fn user_agent(region: Option<&str>) -> String {
    let region = region.unwrap_or("unknown");
    format!("{USER_AGENT_PREFIX} - {region} - {HTTP_LIBRARY_USER_AGENT}")
}

/// Builds an HTTP client for `config`, reading the region from the environment.
///
/// # Errors
///
/// See [`build_client_for_region`].
pub fn build_client(config: &Configuration) -> Result<Client, Error> {
    let region = std::env::var(REGION_ENV).ok();
    build_client_for_region(config, region.as_deref())
}

/// Builds an HTTP client with the auth, content-type and User-Agent headers
/// set and the connect timeout and TLS options of `config` applied.
///
/// The connect timeout lets a connect that hangs fail as a connect error
/// rather than run into the request timeout, which
/// [`HomeAssistant::post`] reads as "sent without waiting for response".
///
/// # Errors
///
/// Returns [`Error::Configuration`] if the bearer token is not a valid header
/// value, if certificate files cannot be read or parsed, or if the TLS
/// backend rejects the settings.
pub fn build_client_for_region(
    config: &Configuration,
    region: Option<&str>,
) -> Result<Client, Error> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.bearer_token))
        .map_err(|e| Error::configuration(format!("Invalid bearer token: {e}")))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let mut builder = Client::builder()
        .default_headers(headers)
        .user_agent(user_agent(region))
        .connect_timeout(config.connect_timeout);

    match &config.ssl_verify {
        SslVerify::Enabled => {}
        SslVerify::Disabled => builder = builder.danger_accept_invalid_certs(true),
        SslVerify::CaBundle(path) => {
            let pem = read_pem(path)?;
            let certificates = Certificate::from_pem_bundle(&pem).map_err(|e| {
                Error::configuration(format!("Invalid CA bundle {}: {e}", path.display()))
            })?;
            builder = builder.tls_built_in_root_certs(false);
            for certificate in certificates {
                builder = builder.add_root_certificate(certificate);
            }
        }
    }

    if let Some(certificate) = &config.ssl_client {
        builder = builder.identity(load_identity(certificate)?);
    }

    builder
        .build()
        .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {e}")))
}

fn load_identity(certificate: &ClientCertificate) -> Result<Identity, Error> {
    let (pem, source) = match certificate {
        ClientCertificate::Combined(path) => (read_pem(path)?, path.display().to_string()),
        ClientCertificate::Pair { cert, key } => {
            let mut pem = read_pem(cert)?;
            pem.push(b'\n');
            pem.extend(read_pem(key)?);
            (pem, format!("{} and {}", cert.display(), key.display()))
        }
    };
    Identity::from_pem(&pem)
        .map_err(|e| Error::configuration(format!("Invalid client certificate {source}: {e}")))
}

fn read_pem(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|e| {
        Error::configuration(format!(
            "Failed to read certificate file {}: {e}",
            path.display()
        ))
    })
}
