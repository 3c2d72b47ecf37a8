//! Utility functions shared across the application.

/// Normalizes a Home Assistant base URL.
///
/// Removes every `/api` substring, then any trailing slashes, so that
/// `http://hass:8123/api/` and `http://hass:8123` both become
/// `http://hass:8123`.
///
/// The removal is a plain substring replace and is not path-segment aware:
/// `http://hass/apiary` becomes `http://hassary`. Existing deployments rely
/// on this exact behavior.
#[must_use]
pub fn normalize_base_url(url: &str) -> String {
    url.replace("/api", "").trim_end_matches('/').to_string()
}
