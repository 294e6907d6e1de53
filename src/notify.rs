//! Single-slot notification surface.
//!
//! At most one notification is visible. A new one replaces the current one
//! (last write wins). Each notification gets a generation number; the
//! auto-dismiss timer only clears the slot if that generation is still the
//! visible one, so a manual dismiss or a replacement turns the timer into a
//! no-op.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::types::lock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Default)]
struct Slot {
    visible: Option<Notification>,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    slot: Arc<Mutex<Slot>>,
    duration: Duration,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            duration,
        }
    }

    /// Show `message`, replacing whatever is visible. When called inside a
    /// tokio runtime the notification dismisses itself after the configured
    /// duration. Returns the notification's generation.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let notification = Notification {
            message: message.into(),
            severity,
        };
        tracing::debug!("Notification [{}]: {}", notification.severity, notification.message);

        let generation = {
            let mut slot = lock(&self.slot);
            slot.generation += 1;
            slot.visible = Some(notification);
            slot.generation
        };

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let notifier = self.clone();
            handle.spawn(async move {
                tokio::time::sleep(notifier.duration).await;
                notifier.expire(generation);
            });
        }

        generation
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Success)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Warning)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.notify(message, Severity::Error)
    }

    /// Close the visible notification, if any
    pub fn dismiss(&self) -> Option<Notification> {
        let mut slot = lock(&self.slot);
        let dismissed = slot.visible.take();
        if dismissed.is_some() {
            slot.generation += 1;
        }
        dismissed
    }

    /// Timer path: clears only if `generation` is still showing
    pub fn expire(&self, generation: u64) -> bool {
        let mut slot = lock(&self.slot);
        if slot.generation == generation && slot.visible.is_some() {
            slot.visible = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<Notification> {
        lock(&self.slot).visible.clone()
    }
}
