use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How a reply ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyStatus {
    Completed,
    Failed(String),
}

struct ActiveReply {
    generation: u64,
    task: JoinHandle<()>,
    started_at: Instant,
}

/// Tracks the one in-flight reply task.
///
/// Every reply gets a generation number. Outcomes are only applied when
/// [`ReplyManager::finish`] confirms the generation is still the active
/// one, so results from cancelled or replaced tasks are dropped.
pub struct ReplyManager {
    active: Option<ActiveReply>,
    next_generation: u64,
}

impl Default for ReplyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyManager {
    pub fn new() -> Self {
        Self {
            active: None,
            next_generation: 1,
        }
    }

    pub fn next_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    /// Track `task` as the active reply.
    /// If another reply is still running it is cancelled first.
    pub fn register(&mut self, generation: u64, task: JoinHandle<()>) {
        if let Some(existing) = self.active.take() {
            existing.task.abort();
            debug!(
                generation = existing.generation,
                "Cancelled existing reply before registering new one"
            );
        }
        debug!(generation, "Reply registered");
        self.active = Some(ActiveReply {
            generation,
            task,
            started_at: Instant::now(),
        });
    }

    /// Mark `generation` finished. Returns false for stale generations,
    /// whose outcome must be ignored.
    pub fn finish(&mut self, generation: u64, status: ReplyStatus) -> bool {
        match self.active.as_ref() {
            Some(active) if active.generation == generation => {}
            _ => {
                debug!(generation, "Ignoring outcome of stale reply");
                return false;
            }
        }

        if let Some(active) = self.active.take() {
            let elapsed_ms = active.started_at.elapsed().as_millis() as u64;
            match status {
                ReplyStatus::Failed(reason) => {
                    warn!(generation, elapsed_ms, reason = %reason, "Reply failed")
                }
                ReplyStatus::Completed => debug!(generation, elapsed_ms, "Reply finished"),
            }
        }
        true
    }

    /// Abort the active reply. Returns true if one was running.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        active.task.abort();
        debug!(generation = active.generation, "Reply cancelled");
        true
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|active| active.generation)
    }
}

impl Drop for ReplyManager {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.task.abort();
        }
    }
}
