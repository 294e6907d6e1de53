use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::types::Method;

/// One outgoing call, fully resolved
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// Raw response; status classification happens in the client
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Wire seam between the resource client and the network. Implementations
/// only fail with `ApiError::Network` (nothing came back); any response,
/// whatever its status, is returned as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// reqwest-backed transport. No retries: every call is one round trip.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    log_requests: bool,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            log_requests: true,
        })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            log_requests: true,
        }
    }

    /// Timeout and request logging taken from the API settings
    pub fn from_api_config(api: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self::new(api.timeout())?.with_request_logging(api.enable_request_logging))
    }

    /// Method, path, status and elapsed time of each call at debug level
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    pub fn logs_requests(&self) -> bool {
        self.log_requests
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let started = Instant::now();
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, request.url.clone());
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        if self.log_requests {
            tracing::debug!(
                "{} {} -> {} ({} ms)",
                request.method,
                request.url.path(),
                status,
                started.elapsed().as_millis()
            );
        }

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn request_logging_follows_configuration() {
        let transport = ReqwestTransport::new(Duration::from_secs(1)).unwrap();
        assert!(transport.logs_requests());
        assert!(!transport.with_request_logging(false).logs_requests());

        let production = ClientConfig::production();
        let transport = ReqwestTransport::from_api_config(&production.api).unwrap();
        assert!(!transport.logs_requests());

        let development = ClientConfig::development();
        assert!(ReqwestTransport::from_api_config(&development.api).unwrap().logs_requests());
    }
}
