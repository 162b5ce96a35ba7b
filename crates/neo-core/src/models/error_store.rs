use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorLevel {
    Warning,
    Error,
}

/// A WARN or ERROR event captured by `ErrorCollectorLayer`
#[derive(Clone, Debug)]
pub struct ErrorEntry {
    pub timestamp: SystemTime,
    pub level: ErrorLevel,
    pub message: String,
    pub target: String,
    pub fields: HashMap<String, String>,
}

/// Most recent warnings and errors, oldest evicted first.
///
/// Filled from the collector's channel on every host tick.
#[derive(Clone)]
pub struct ErrorStore {
    entries: Arc<Mutex<VecDeque<ErrorEntry>>>,
    capacity: usize,
}

impl ErrorStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    /// Move everything the collector layer has queued into the store
    pub fn drain_from(&self, receiver: &Receiver<ErrorEntry>) -> usize {
        let mut entries = self.entries.lock();
        let mut drained = 0;
        while let Ok(entry) = receiver.try_recv() {
            if entries.len() == self.capacity {
                entries.pop_front();
            }
            entries.push_back(entry);
            drained += 1;
        }
        drained
    }

    pub fn error_count(&self) -> usize {
        self.count(ErrorLevel::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(ErrorLevel::Warning)
    }

    pub fn latest(&self) -> Option<ErrorEntry> {
        self.entries.lock().back().cloned()
    }

    fn count(&self, level: ErrorLevel) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == level)
            .count()
    }
}
