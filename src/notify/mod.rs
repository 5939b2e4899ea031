//! Transient status notifications.
//!
//! Every notification removes itself after a fixed lifetime: it stays fully visible
//! for `visible`, is marked as fading, and is removed `fade` later. Each entry runs
//! its own timer, so any number of them can be on screen at once.

mod board;

pub use board::{NotificationBoard, NotificationEntry};

use crate::model::{now_rfc3339, Notification, NotificationConfig, ProgressEvent, Severity};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Destination for notification lifecycle updates.
pub trait NotificationSink: Send + Sync {
    fn push_notification(&self, notification: &Notification);
    fn fade_notification(&self, id: u64);
    fn remove_notification(&self, id: u64);
}

impl NotificationSink for mpsc::UnboundedSender<ProgressEvent> {
    fn push_notification(&self, notification: &Notification) {
        let _ = self.send(ProgressEvent::Notification(notification.clone()));
    }

    fn fade_notification(&self, id: u64) {
        let _ = self.send(ProgressEvent::NotificationFading { id });
    }

    fn remove_notification(&self, id: u64) {
        let _ = self.send(ProgressEvent::NotificationRemoved { id });
    }
}

/// Creates notifications and schedules their removal. Clones share the id sequence.
#[derive(Clone)]
pub struct NotificationEmitter {
    cfg: NotificationConfig,
    sink: Option<Arc<dyn NotificationSink>>,
    next_id: Arc<AtomicU64>,
}

impl NotificationEmitter {
    pub fn new(cfg: NotificationConfig) -> Self {
        Self {
            cfg,
            sink: None,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Show `message` and schedule its removal. Returns the new id, or `None`
    /// when no sink is attached. Must be called from within a Tokio runtime.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> Option<u64> {
        let sink = self.sink.clone()?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            message: message.into(),
            severity,
            issued_at: now_rfc3339(),
        };
        debug!(
            id,
            severity = severity.as_str(),
            message = %notification.message,
            "notification shown"
        );
        sink.push_notification(&notification);

        let visible = self.cfg.visible;
        let fade = self.cfg.fade;
        tokio::spawn(async move {
            tokio::time::sleep(visible).await;
            sink.fade_notification(id);
            tokio::time::sleep(fade).await;
            sink.remove_notification(id);
            debug!(id, "notification removed");
        });

        Some(id)
    }

    /// [`notify`](Self::notify) with the default severity.
    pub fn info(&self, message: impl Into<String>) -> Option<u64> {
        self.notify(message, Severity::default())
    }
}
