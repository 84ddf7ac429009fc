//! Locating a remote snapshot from a page url

use url::Url;

const SCENARIO_URL_KEY: &str = "scenarioUrl";

/// Extract the snapshot url carried in a page's `scenarioUrl` query parameter.
///
/// The key matches case-insensitively and the value comes back percent-decoded.
/// A relative value is resolved against the page url. Returns `None` when the
/// page url is unparseable or carries no non-blank value.
pub fn scenario_url_from_query(page_url: &str) -> Option<String> {
    let page = Url::parse(page_url).ok()?;
    let value = page
        .query_pairs()
        .find(|(key, _)| key.eq_ignore_ascii_case(SCENARIO_URL_KEY))
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())?;

    if Url::parse(&value).is_ok() {
        return Some(value);
    }
    match page.join(&value) {
        Ok(resolved) => Some(resolved.to_string()),
        Err(e) => {
            tracing::warn!("Ignoring scenario url '{}': {}", value, e);
            None
        }
    }
}
