use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub provisioning: ProvisioningConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Versioned API root, always ending in a slash
    pub base_url: String,
    pub timeout_secs: u64,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Image/bucket management endpoint. `None` disables the provisioning hooks.
    pub url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub notification_ms: u64,
    pub page_size: usize,
    pub low_stock_threshold: i64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl UiConfig {
    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("STOCKROOM_API_URL") {
            self.api.base_url = normalize_base(&v);
        }
        if let Ok(v) = env::var("STOCKROOM_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("STOCKROOM_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        if let Ok(v) = env::var("STOCKROOM_PROVISION_URL") {
            let v = v.trim();
            self.provisioning.url = if v.is_empty() { None } else { Some(v.to_string()) };
        }
        if let Ok(v) = env::var("STOCKROOM_PROVISION_TIMEOUT_SECS") {
            self.provisioning.timeout_secs = v.parse().unwrap_or(self.provisioning.timeout_secs);
        }

        if let Ok(v) = env::var("STOCKROOM_NOTIFY_MS") {
            self.ui.notification_ms = v.parse().unwrap_or(self.ui.notification_ms);
        }
        if let Ok(v) = env::var("STOCKROOM_PAGE_SIZE") {
            self.ui.page_size = v.parse().ok().filter(|n: &usize| *n > 0).unwrap_or(self.ui.page_size);
        }
        if let Ok(v) = env::var("STOCKROOM_LOW_STOCK") {
            self.ui.low_stock_threshold = v.parse().unwrap_or(self.ui.low_stock_threshold);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8000/api/".to_string(),
                timeout_secs: 30,
                enable_request_logging: true,
            },
            provisioning: ProvisioningConfig {
                url: None,
                timeout_secs: 30,
            },
            ui: UiConfig {
                notification_ms: 5000,
                page_size: 10,
                low_stock_threshold: 10,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.example.com/api/".to_string(),
                timeout_secs: 15,
                enable_request_logging: true,
            },
            provisioning: ProvisioningConfig {
                url: None,
                timeout_secs: 15,
            },
            ui: UiConfig {
                notification_ms: 5000,
                page_size: 25,
                low_stock_threshold: 10,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://app.example.com/api/".to_string(),
                timeout_secs: 10,
                enable_request_logging: false,
            },
            provisioning: ProvisioningConfig {
                url: None,
                timeout_secs: 10,
            },
            ui: UiConfig {
                notification_ms: 5000,
                page_size: 25,
                low_stock_threshold: 10,
            },
        }
    }
}

/// Joining relative paths onto a base without a trailing slash drops its last segment.
pub fn normalize_base(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<ClientConfig> = Lazy::new(ClientConfig::from_env);

pub fn config() -> &'static ClientConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = ClientConfig::development();
        assert_eq!(config.api.base_url, "http://localhost:8000/api/");
        assert_eq!(config.ui.notification_ms, 5000);
        assert!(config.provisioning.url.is_none());
    }

    #[test]
    fn test_default_production_config() {
        let config = ClientConfig::production();
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.ui.page_size, 25);
    }

    #[test]
    fn normalizes_base_url() {
        assert_eq!(normalize_base("http://h/api"), "http://h/api/");
        assert_eq!(normalize_base(" http://h/api/ "), "http://h/api/");
    }
}
