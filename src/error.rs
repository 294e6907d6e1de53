// Resource client error types
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response reached the client (connect failure, timeout)
    Network,
    /// HTTP 401 - credential missing, expired or rejected
    Unauthorized,
    /// HTTP 4xx other than 401, usually with field detail
    Validation,
    /// HTTP 5xx or an unreadable success body
    Server,
}

/// Failure of a single resource client round trip
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unauthorized: {}", .detail.as_deref().unwrap_or("credentials rejected"))]
    Unauthorized { detail: Option<String> },

    #[error("request rejected ({status}): {}", summarize(.detail, .field_errors))]
    Validation {
        status: u16,
        detail: Option<String>,
        field_errors: BTreeMap<String, Vec<String>>,
    },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn summarize(detail: &Option<String>, field_errors: &BTreeMap<String, Vec<String>>) -> String {
    if let Some(detail) = detail {
        return detail.clone();
    }
    match first_field_error(field_errors) {
        Some(msg) => msg,
        None => "no detail provided".to_string(),
    }
}

fn first_field_error(field_errors: &BTreeMap<String, Vec<String>>) -> Option<String> {
    field_errors
        .iter()
        .find_map(|(field, msgs)| msgs.first().map(|m| format!("{}: {}", field, m)))
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ApiError::Validation { .. } | ApiError::InvalidRequest(_) => ErrorKind::Validation,
            ApiError::Server { .. } | ApiError::InvalidResponse(_) => ErrorKind::Server,
        }
    }

    /// HTTP status, when a response was received
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Network(_) | ApiError::InvalidResponse(_) | ApiError::InvalidRequest(_) => None,
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Validation { status, .. } => Some(*status),
            ApiError::Server { status, .. } => Some(*status),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "NETWORK_ERROR",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Server { .. } => "SERVER_ERROR",
            ApiError::InvalidResponse(_) => "INVALID_RESPONSE",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            ApiError::Validation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    /// Text shown to the operator: the server's own message for rejected
    /// requests, otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation { detail, field_errors, .. } => detail
                .clone()
                .or_else(|| first_field_error(field_errors))
                .unwrap_or_else(|| fallback.to_string()),
            ApiError::Unauthorized { detail: Some(detail) } => detail.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Classify a non-success HTTP response
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed: Option<Value> = serde_json::from_slice(body).ok();
        let detail = parsed
            .as_ref()
            .and_then(|v| v.get("detail"))
            .and_then(Value::as_str)
            .map(str::to_string);

        match status {
            401 => ApiError::Unauthorized { detail },
            400..=499 => ApiError::Validation {
                status,
                detail,
                field_errors: parsed.as_ref().map(collect_field_errors).unwrap_or_default(),
            },
            _ => {
                let message = detail.unwrap_or_else(|| {
                    let text = String::from_utf8_lossy(body);
                    let text = text.trim();
                    if text.is_empty() {
                        format!("HTTP {}", status)
                    } else {
                        text.chars().take(200).collect()
                    }
                });
                tracing::error!("Server error {}: {}", status, message);
                ApiError::Server { status, message }
            }
        }
    }
}

/// Field errors arrive as `{"field": ["msg", ...]}` or `{"field": "msg"}`
fn collect_field_errors(body: &Value) -> BTreeMap<String, Vec<String>> {
    let mut out = BTreeMap::new();
    let Some(obj) = body.as_object() else {
        return out;
    };

    for (field, value) in obj {
        if field == "detail" {
            continue;
        }
        let msgs: Vec<String> = match value {
            Value::String(s) => vec![s.clone()],
            Value::Array(items) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
            _ => Vec::new(),
        };
        if !msgs.is_empty() {
            out.insert(field.clone(), msgs);
        }
    }
    out
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if err.is_timeout() {
            ApiError::Network(format!("request timed out: {}", err))
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidRequest(format!("bad url: {}", err))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::InvalidResponse(err.to_string())
    }
}
