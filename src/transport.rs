//! HTTP transport boundary.
//!
//! The extraction engine never talks to the network directly; it hands
//! [`ApiRequest`] values to a [`Transport`]. The default implementation is a
//! thin reqwest wrapper. Retry policy, if any, belongs to the caller or a
//! wrapping transport, not to the engine.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ExtractorConfig;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },
}

/// HTTP method for an [`ApiRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully built request, ready to hand to a [`Transport`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// JSON body, present on POST requests only.
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn post(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Narrow interface the engine uses to reach the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the raw response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent or the response status
    /// is not successful. Failures are non-retriable at this layer.
    async fn send(&self, request: &ApiRequest) -> Result<Vec<u8>, TransportError>;
}

/// Default transport built on reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport using the configured user agent and timeout.
    #[must_use]
    pub fn new(config: &ExtractorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("Failed to build HTTP client");
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Vec<u8>, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| TransportError::Request {
            url: request.url.clone(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: request.url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| TransportError::Request {
            url: request.url.clone(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }
}
