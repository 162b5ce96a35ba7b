use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    /// Stays visible until dismissed
    Blocking,
    /// Expires after the store's TTL
    Transient,
}

#[derive(Clone, Debug)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: Instant,
}

struct Inner {
    entries: VecDeque<Notification>,
    next_id: u64,
}

/// User-visible toasts.
///
/// Cloning shares the same queue, so the chat session and the shell can both
/// hold a handle.
#[derive(Clone)]
pub struct NotificationStore {
    inner: Arc<Mutex<Inner>>,
    ttl: Duration,
    max_entries: usize,
}

impl NotificationStore {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: VecDeque::new(),
                next_id: 0,
            })),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn push(
        &self,
        level: NotificationLevel,
        kind: NotificationKind,
        message: impl Into<String>,
    ) -> u64 {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push_back(Notification {
            id,
            level,
            kind,
            message: message.into(),
            created_at: Instant::now(),
        });

        // FIFO eviction when exceeding max
        while inner.entries.len() > self.max_entries {
            inner.entries.pop_front();
        }

        id
    }

    pub fn blocking_error(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Error, NotificationKind::Blocking, message)
    }

    pub fn transient_error(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Error, NotificationKind::Transient, message)
    }

    pub fn transient_info(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Info, NotificationKind::Transient, message)
    }

    /// Drop transient entries older than the TTL
    pub fn expire(&self, now: Instant) {
        let ttl = self.ttl;
        self.inner.lock().entries.retain(|n| {
            n.kind == NotificationKind::Blocking || now.duration_since(n.created_at) < ttl
        });
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|n| n.id != id);
        inner.entries.len() != before
    }

    /// Dismiss the newest entry, if any
    pub fn dismiss_latest(&self) -> Option<Notification> {
        self.inner.lock().entries.pop_back()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.inner.lock().entries.back().cloned()
    }

    /// Whether a blocking notification is currently shown
    pub fn has_blocking(&self) -> bool {
        self.inner
            .lock()
            .entries
            .iter()
            .any(|n| n.kind == NotificationKind::Blocking)
    }

    pub fn all(&self) -> Vec<Notification> {
        self.inner.lock().entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
