use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

use super::decode_claims;
use crate::api::ApiClient;
use crate::types::lock;

/// Outcome of a single guard check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Authorization {
    Authorized,
    Unauthorized,
}

/// `Checking` is the only transient state; every check ends in one of the
/// other two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GuardState {
    Checking,
    Authorized,
    Unauthorized,
}

impl From<Authorization> for GuardState {
    fn from(value: Authorization) -> Self {
        match value {
            Authorization::Authorized => GuardState::Authorized,
            Authorization::Unauthorized => GuardState::Unauthorized,
        }
    }
}

/// Decides whether the stored credential may reach protected views.
///
/// A check makes at most one refresh attempt and never retries. Failures are
/// not reported to the operator; the caller redirects to login instead.
pub struct SessionGuard {
    client: ApiClient,
    state: Mutex<GuardState>,
}

impl SessionGuard {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Mutex::new(GuardState::Unauthorized),
        }
    }

    pub fn state(&self) -> GuardState {
        *lock(&self.state)
    }

    pub fn is_authorized(&self) -> bool {
        self.state() == GuardState::Authorized
    }

    pub async fn authorize(&self) -> Authorization {
        self.authorize_at(Utc::now()).await
    }

    /// Check against an explicit clock
    pub async fn authorize_at(&self, now: DateTime<Utc>) -> Authorization {
        *lock(&self.state) = GuardState::Checking;
        let outcome = self.check(now).await;
        *lock(&self.state) = outcome.into();
        outcome
    }

    async fn check(&self, now: DateTime<Utc>) -> Authorization {
        let session = self.client.session();

        let Some(access) = session.access_token() else {
            tracing::debug!("No stored credential");
            return Authorization::Unauthorized;
        };

        match decode_claims(&access) {
            Ok(claims) if !claims.is_expired_at(now) => return Authorization::Authorized,
            Ok(claims) => tracing::debug!("Access token expired at {}", claims.exp),
            Err(e) => tracing::debug!("Access token unreadable: {}", e),
        }

        let Some(refresh) = session.refresh_token() else {
            return self.reject("no refresh token");
        };

        match self.client.refresh_access(&refresh).await {
            Ok(access) => {
                if let Err(e) = session.replace_access(access) {
                    tracing::warn!("Refreshed access token could not be persisted: {}", e);
                }
                tracing::debug!("Access token refreshed");
                Authorization::Authorized
            }
            Err(e) => self.reject(&e.to_string()),
        }
    }

    fn reject(&self, reason: &str) -> Authorization {
        tracing::warn!("Session refresh failed: {}", reason);
        if let Err(e) = self.client.session().clear() {
            tracing::warn!("Failed to clear stored credential: {}", e);
        }
        Authorization::Unauthorized
    }
}
