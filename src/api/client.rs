use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use url::Url;

use super::endpoints;
use super::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::auth::{Credential, Session};
use crate::config::{normalize_base, ClientConfig};
use crate::error::ApiError;
use crate::types::Method;

/// Thin HTTP wrapper over the resource API.
///
/// Attaches the session's current access token to every protected call but
/// never refreshes it; a 401 comes back as [`ApiError::Unauthorized`] so the
/// caller can force re-authentication.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: Session,
    base: Url,
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct RefreshedAccess {
    access: String,
}

#[derive(Debug, Serialize)]
struct UserCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, session: Session) -> Result<Self, ApiError> {
        let base = Url::parse(&normalize_base(base_url))?;
        Ok(Self {
            transport,
            session,
            base,
        })
    }

    /// Client over the reqwest transport using the configured API root and timeout
    pub fn from_config(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::from_api_config(&config.api)?;
        Self::new(&config.api.base_url, Arc::new(transport), session)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    /// Authenticated round trip. An empty success body yields `Value::Null`.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.send(method, path, body, self.session.access_token()).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        bearer: Option<String>,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        let response = self
            .transport
            .send(HttpRequest {
                method,
                url,
                bearer,
                body,
            })
            .await
            .map_err(|e| {
                tracing::warn!("{} {} failed: {}", method, path, e);
                e
            })?;

        if !response.is_success() {
            let err = ApiError::from_response(response.status, &response.body);
            tracing::debug!("{} {} rejected: {}", method, path, err);
            return Err(err);
        }

        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.request(Method::Get, path, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = encode(body)?;
        self.request(Method::Post, path, Some(body)).await
    }

    pub async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = encode(body)?;
        self.request(Method::Put, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(Method::Delete, path, None).await.map(|_| ())
    }

    /// Exchange username/password for a credential pair. The caller decides
    /// whether to install it into the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ApiError> {
        let body = encode(&UserCredentials { username, password })?;
        let value = self.send(Method::Post, endpoints::TOKEN, Some(body), None).await?;
        let pair: TokenPair = serde_json::from_value(value)?;
        Ok(Credential::new(pair.access, pair.refresh))
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Value, ApiError> {
        let body = encode(&UserCredentials { username, password })?;
        self.send(Method::Post, endpoints::REGISTER, Some(body), None).await
    }

    /// Obtain a new access token; nothing is stored here
    pub async fn refresh_access(&self, refresh_token: &str) -> Result<String, ApiError> {
        let body = json!({ "refresh": refresh_token });
        let value = self.send(Method::Post, endpoints::TOKEN_REFRESH, Some(body), None).await?;
        let refreshed: RefreshedAccess = serde_json::from_value(value)?;
        Ok(refreshed.access)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}
