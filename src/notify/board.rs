use super::NotificationSink;
use crate::model::Notification;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEntry {
    pub notification: Notification,
    pub fading: bool,
}

/// Ordered display list of live notifications, oldest first.
///
/// Entries are only ever appended at the end; removal keeps the order of the rest.
#[derive(Debug, Clone, Default)]
pub struct NotificationBoard {
    entries: Arc<Mutex<Vec<NotificationEntry>>>,
}

impl NotificationBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<NotificationEntry>> {
        // Entries are plain data; a panic elsewhere cannot leave them half-written.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Vec<NotificationEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.lock().iter().any(|e| e.notification.id == id)
    }

    pub fn is_fading(&self, id: u64) -> bool {
        self.lock()
            .iter()
            .any(|e| e.notification.id == id && e.fading)
    }
}

impl NotificationSink for NotificationBoard {
    fn push_notification(&self, notification: &Notification) {
        self.lock().push(NotificationEntry {
            notification: notification.clone(),
            fading: false,
        });
    }

    fn fade_notification(&self, id: u64) {
        if let Some(entry) = self.lock().iter_mut().find(|e| e.notification.id == id) {
            entry.fading = true;
        }
    }

    fn remove_notification(&self, id: u64) {
        self.lock().retain(|e| e.notification.id != id);
    }
}
