//! Client for the external image/bucket provisioning endpoint.
//!
//! The collaborator takes a single JSON body
//! `{image?, name, category?, option: "category"|"product", httpMethod: "POST"|"DELETE"}`
//! and answers `{"message": ...}` on success or `{"error": ...}` otherwise.
//! It is independent of the resource API and never sees the session token.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use super::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::types::Method;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionTarget {
    /// A category's storage bucket
    Category,
    /// A product's image object inside its category bucket
    Product,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProvisionMethod {
    Post,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub option: ProvisionTarget,
    #[serde(rename = "httpMethod")]
    pub http_method: ProvisionMethod,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProvisionError {
    #[error("provisioning rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("provisioning unreachable: {0}")]
    Transport(#[from] ApiError),

    #[error("{0}")]
    Precondition(String),
}

#[derive(Clone)]
pub struct ProvisioningClient {
    transport: Arc<dyn Transport>,
    url: Url,
}

impl ProvisioningClient {
    pub fn new(url: &str, transport: Arc<dyn Transport>) -> Result<Self, ApiError> {
        Ok(Self {
            transport,
            url: Url::parse(url)?,
        })
    }

    /// `None` when no provisioning endpoint is configured
    pub fn from_config(config: &ClientConfig) -> Result<Option<Self>, ApiError> {
        let Some(url) = &config.provisioning.url else {
            return Ok(None);
        };
        let transport = ReqwestTransport::new(std::time::Duration::from_secs(config.provisioning.timeout_secs))?
            .with_request_logging(config.api.enable_request_logging);
        Self::new(url, Arc::new(transport)).map(Some)
    }

    pub async fn create_bucket(&self, category: &str) -> Result<String, ProvisionError> {
        self.send(ProvisionRequest {
            image: None,
            name: category.to_string(),
            category: None,
            option: ProvisionTarget::Category,
            http_method: ProvisionMethod::Post,
        })
        .await
    }

    pub async fn delete_bucket(&self, category: &str) -> Result<String, ProvisionError> {
        self.send(ProvisionRequest {
            image: None,
            name: category.to_string(),
            category: None,
            option: ProvisionTarget::Category,
            http_method: ProvisionMethod::Delete,
        })
        .await
    }

    /// `image` is the base64-encoded file content
    pub async fn upload_image(&self, category: &str, product: &str, image: &str) -> Result<String, ProvisionError> {
        self.send(ProvisionRequest {
            image: Some(image.to_string()),
            name: product.to_string(),
            category: Some(category.to_string()),
            option: ProvisionTarget::Product,
            http_method: ProvisionMethod::Post,
        })
        .await
    }

    pub async fn delete_image(&self, category: &str, product: &str) -> Result<String, ProvisionError> {
        self.send(ProvisionRequest {
            image: None,
            name: product.to_string(),
            category: Some(category.to_string()),
            option: ProvisionTarget::Product,
            http_method: ProvisionMethod::Delete,
        })
        .await
    }

    /// Returns the collaborator's success message
    pub async fn send(&self, request: ProvisionRequest) -> Result<String, ProvisionError> {
        tracing::debug!(
            "Provisioning {:?} {:?} for '{}'",
            request.http_method,
            request.option,
            request.name
        );

        let body = serde_json::to_value(&request).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let response = self
            .transport
            .send(HttpRequest {
                method: Method::Post,
                url: self.url.clone(),
                bearer: None,
                body: Some(body),
            })
            .await?;

        let parsed: Option<Value> = serde_json::from_slice(&response.body).ok();
        let field = |key: &str| {
            parsed
                .as_ref()
                .and_then(|v| v.get(key))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        if response.is_success() {
            Ok(field("message").unwrap_or_else(|| "ok".to_string()))
        } else {
            let message = field("error").unwrap_or_else(|| String::from_utf8_lossy(&response.body).trim().to_string());
            tracing::warn!("Provisioning request for '{}' failed: {} {}", request.name, response.status, message);
            Err(ProvisionError::Rejected {
                status: response.status,
                message,
            })
        }
    }
}
