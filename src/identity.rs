//! Client identity discovery and caching.
//!
//! The platform's internal API only accepts requests that present a current
//! client version and API key. Both are scraped from the platform's public
//! web surface once per session and cached. A reset clears the cache so the
//! next request triggers a fresh discovery.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ExtractorConfig;
use crate::error::Error;
use crate::transport::{ApiRequest, Transport};

static CLIENT_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""INNERTUBE_CONTEXT_CLIENT_VERSION":"([^"]+?)""#)
        .expect("Invalid client version pattern")
});
static API_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""INNERTUBE_API_KEY":"([^"]+?)""#).expect("Invalid api key pattern"));

/// The version string and key a client must present to have requests
/// accepted by the internal API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub version: String,
    pub key: String,
}

/// Process-wide cache for the client identity.
///
/// Cloning the cache shares the underlying slot, so multiple extraction
/// sessions within a process resolve the identity at most once. The lock is
/// held across discovery, so concurrent `resolve` calls serialize and every
/// caller observes either a fully resolved identity or an empty slot.
#[derive(Clone, Default)]
pub struct ClientIdentityCache {
    inner: Arc<Mutex<Option<ClientIdentity>>>,
}

impl ClientIdentityCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached identity, performing a one-time discovery against
    /// the platform's service worker script if the cache is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentityResolution`] if discovery fails; pagination
    /// cannot proceed without a valid identity.
    pub async fn resolve(
        &self,
        transport: &dyn Transport,
        config: &ExtractorConfig,
    ) -> Result<ClientIdentity, Error> {
        let mut slot = self.inner.lock().await;
        if let Some(identity) = slot.as_ref() {
            debug!(version = %identity.version, "Using cached client identity");
            return Ok(identity.clone());
        }

        let identity = discover(transport, config).await?;
        info!(version = %identity.version, "Resolved client identity");
        *slot = Some(identity.clone());
        Ok(identity)
    }

    /// Clear the cache. Idempotent; safe to call when already empty.
    pub async fn reset(&self) {
        let mut slot = self.inner.lock().await;
        if slot.take().is_some() {
            debug!("Client identity cache cleared");
        }
    }
}

/// Scrape the client version and API key from the service worker script.
async fn discover(
    transport: &dyn Transport,
    config: &ExtractorConfig,
) -> Result<ClientIdentity, Error> {
    let url = format!("{}/sw.js", config.base_url);
    debug!(url = %url, "Discovering client identity");

    let request = ApiRequest::get(&url)
        .header("Origin", config.base_url.clone())
        .header("Referer", format!("{}/", config.base_url));

    let body = transport
        .send(&request)
        .await
        .map_err(|e| Error::IdentityResolution(format!("discovery request failed: {e}")))?;
    let body = String::from_utf8_lossy(&body);

    let version = capture(&CLIENT_VERSION_RE, &body)
        .ok_or_else(|| Error::IdentityResolution("client version not found in page".to_string()))?;
    let key = capture(&API_KEY_RE, &body)
        .ok_or_else(|| Error::IdentityResolution("api key not found in page".to_string()))?;

    Ok(ClientIdentity { version, key })
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SW_BODY: &str = r#"var ytcfg={"INNERTUBE_API_KEY":"AIzaTestKey123","INNERTUBE_CONTEXT_CLIENT_VERSION":"2.20260115.01.00"};"#;

    #[test]
    fn test_capture_version_and_key() {
        assert_eq!(
            capture(&CLIENT_VERSION_RE, SW_BODY).as_deref(),
            Some("2.20260115.01.00")
        );
        assert_eq!(
            capture(&API_KEY_RE, SW_BODY).as_deref(),
            Some("AIzaTestKey123")
        );
    }

    #[test]
    fn test_capture_missing() {
        assert_eq!(capture(&API_KEY_RE, "no keys here"), None);
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let cache = ClientIdentityCache::new();
        cache.reset().await;
        cache.reset().await;
    }
}
