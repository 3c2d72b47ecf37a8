use std::path::Path;

use lambda_runtime::tracing::{debug, error, info};
use lambda_runtime::{Diagnostic, LambdaEvent};
use serde_json::Value;
use tracing::instrument::WithSubscriber;

use crate::config::{CONFIG_FILE, Configuration};
use crate::error::Error;
use crate::http::{HomeAssistant, build_client};
use crate::logging::{LogFormat, LogSettings};

/// Home Assistant endpoint that handles Alexa Smart Home directives.
pub const SMART_HOME_ENDPOINT: &str = "alexa/smart_home";

/// Forwards `event` to Home Assistant using `config`.
///
/// Returns the JSON answer, or `None` if Home Assistant did not answer in time.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the request fails.
pub async fn forward_event(config: &Configuration, event: &Value) -> Result<Option<Value>, Error> {
    let client = build_client(config)?;
    let ha = HomeAssistant::new(config.url.clone(), client);
    ha.post(SMART_HOME_ENDPOINT, event).await
}

/// Loads the configuration from `config_path` and forwards `event`.
///
/// # Errors
///
/// Returns [`Error::Configuration`] before any network call if the
/// configuration is invalid, otherwise whatever [`forward_event`] returns.
pub async fn handle(config_path: &Path, event: &Value) -> Result<Option<Value>, Error> {
    let config = Configuration::load(config_path)?;
    let logging = LogSettings::new(&config, LogFormat::from_env());

    match logging.dispatch() {
        Some(dispatch) => {
            async {
                debug!(url = %config.url, "Debug logging enabled for this invocation");
                forward_event(&config, event).await
            }
            .with_subscriber(dispatch)
            .await
        }
        None => forward_event(&config, event).await,
    }
}

/// Lambda event handler. Forwards the Alexa directive unchanged to Home
/// Assistant and returns its response, or `null` if it timed out.
///
/// # Errors
///
/// Returns a `Diagnostic` error with one of the following types:
///
/// - `ConfigurationError`: `config.json` is missing, malformed or incomplete
/// - `HttpError`: Home Assistant answered with a non-2xx status
/// - `DecodeError`: Home Assistant's answer was not JSON
/// - `TransportError`: Home Assistant could not be reached
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Option<Value>, Diagnostic> {
    let (event_payload, context) = event.into_parts();

    info!(request_id = %context.request_id, "Forwarding directive to Home Assistant");

    handle(Path::new(CONFIG_FILE), &event_payload)
        .await
        .map_err(|e| {
            error!(error = %e, error_type = e.error_type(), "Forwarding failed");
            Diagnostic::from(e)
        })
}
