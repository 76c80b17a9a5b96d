//! User-facing notices for transaction outcomes.
//!
//! The coordinator emits exactly one [`Notice`] per terminal outcome. How it
//! is rendered (toast, log line, status bar) is up to the [`Notifier`].

use async_trait::async_trait;
use gauge_domain::GaugeError;
use gauge_domain::enums::ActionKind;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{info, warn};

/// Outcome class of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    /// The action finalized successfully.
    Success,
    /// The action failed at some stage.
    Failure,
}

/// A message to show the user after a mutating action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    /// Success or failure.
    pub level: NoticeLevel,
    /// Action the notice is about.
    pub action: ActionKind,
    /// Display text.
    pub message: String,
    /// Transaction hash, set on success.
    pub reference: Option<String>,
    /// When the notice was raised.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Notice {
    /// Success notice carrying the finalized transaction hash.
    #[must_use]
    pub fn success(action: ActionKind, hash: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            action,
            message: format!("{} confirmed", capitalize(action.describe())),
            reference: Some(hash.to_string()),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Failure notice naming the action and the reason.
    #[must_use]
    pub fn failure(action: ActionKind, error: &GaugeError) -> Self {
        Self {
            level: NoticeLevel::Failure,
            action,
            message: format!("Failed to {}: {error}", action.describe()),
            reference: None,
            timestamp: chrono::Utc::now(),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Receives transaction notices.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers a notice.
    async fn notify(&self, notice: Notice);
}

/// Writes notices to the log.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(
                action = %notice.action,
                reference = notice.reference.as_deref().unwrap_or_default(),
                "{}",
                notice.message
            ),
            NoticeLevel::Failure => warn!(action = %notice.action, "{}", notice.message),
        }
    }
}

/// Keeps notices in memory until drained.
#[derive(Debug, Default)]
pub struct QueueNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl QueueNotifier {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns all queued notices, oldest first.
    pub fn drain(&self) -> Vec<Notice> {
        let mut notices = self
            .notices
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        std::mem::take(&mut *notices)
    }
}

#[async_trait]
impl Notifier for QueueNotifier {
    async fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(notice);
    }
}
