//! Builders for the internal comments API requests.
//!
//! Pure construction: the initial request names the video, the continuation
//! request threads an opaque token from the previous response. Both carry
//! identity-derived headers so the remote service accepts them as coming
//! from a genuine client.

use serde_json::json;

use crate::config::ExtractorConfig;
use crate::error::Error;
use crate::identity::ClientIdentity;
use crate::transport::ApiRequest;

const API_PATH: &str = "/youtubei/v1/next";
const CLIENT_NAME: &str = "WEB";
const CLIENT_NAME_HEADER: &str = "1";

/// Build the request for a video's first page of comments.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `video_id` is empty.
pub fn initial_request(
    config: &ExtractorConfig,
    identity: &ClientIdentity,
    video_id: &str,
) -> Result<ApiRequest, Error> {
    if video_id.trim().is_empty() {
        return Err(Error::InvalidArgument("video id must not be empty".to_string()));
    }
    let body = json!({
        "context": client_context(identity),
        "videoId": video_id,
    });
    Ok(api_request(config, identity, body))
}

/// Build the request for the page identified by a continuation token.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `token` is empty.
pub fn continuation_request(
    config: &ExtractorConfig,
    identity: &ClientIdentity,
    token: &str,
) -> Result<ApiRequest, Error> {
    if token.trim().is_empty() {
        return Err(Error::InvalidArgument(
            "continuation token must not be empty".to_string(),
        ));
    }
    let body = json!({
        "context": client_context(identity),
        "continuation": token,
    });
    Ok(api_request(config, identity, body))
}

fn client_context(identity: &ClientIdentity) -> serde_json::Value {
    json!({
        "client": {
            "clientName": CLIENT_NAME,
            "clientVersion": identity.version,
            "hl": "en-GB",
            "gl": "GB",
        }
    })
}

fn api_request(
    config: &ExtractorConfig,
    identity: &ClientIdentity,
    body: serde_json::Value,
) -> ApiRequest {
    let url = format!(
        "{}{}?key={}&prettyPrint=false",
        config.base_url, API_PATH, identity.key
    );
    ApiRequest::post(url, body)
        .header("Content-Type", "application/json")
        .header("X-YouTube-Client-Name", CLIENT_NAME_HEADER)
        .header("X-YouTube-Client-Version", identity.version.clone())
        .header("Origin", config.base_url.clone())
        .header("Referer", format!("{}/", config.base_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Method;

    fn identity() -> ClientIdentity {
        ClientIdentity {
            version: "2.20260115.01.00".to_string(),
            key: "AIzaTestKey123".to_string(),
        }
    }

    #[test]
    fn test_initial_request_shape() {
        let config = ExtractorConfig::default();
        let request = initial_request(&config, &identity(), "D00Au7k3i6o").unwrap();

        assert_eq!(request.method, Method::Post);
        assert!(request.url.contains("/youtubei/v1/next"));
        assert!(request.url.contains("key=AIzaTestKey123"));

        let body = request.body.unwrap();
        assert_eq!(body["videoId"], "D00Au7k3i6o");
        assert_eq!(body["context"]["client"]["clientVersion"], "2.20260115.01.00");
        assert!(body.get("continuation").is_none());
    }

    #[test]
    fn test_continuation_request_threads_token_unmodified() {
        let config = ExtractorConfig::default();
        let token = "EiYSC0QwMEF1N2szaTZv==";
        let request = continuation_request(&config, &identity(), token).unwrap();

        let body = request.body.unwrap();
        assert_eq!(body["continuation"], token);
        assert!(body.get("videoId").is_none());
    }

    #[test]
    fn test_identity_headers_present() {
        let config = ExtractorConfig::default();
        let request = initial_request(&config, &identity(), "abc").unwrap();
        let version = request
            .headers
            .iter()
            .find(|(name, _)| name == "X-YouTube-Client-Version")
            .map(|(_, value)| value.as_str());
        assert_eq!(version, Some("2.20260115.01.00"));
    }

    #[test]
    fn test_empty_arguments_rejected() {
        let config = ExtractorConfig::default();
        assert!(initial_request(&config, &identity(), "").is_err());
        assert!(continuation_request(&config, &identity(), "  ").is_err());
    }
}
