//! Forwards Alexa Smart Home directives from AWS Lambda to Home Assistant.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logging;
pub mod utils;

pub use config::Configuration;
pub use error::Error;
pub use http::HomeAssistant;
