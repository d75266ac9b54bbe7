use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Scheduled status polls, keyed by job id. At most one armed poll exists
/// per id; arming an id that already has one replaces it instead of stacking
/// a second timer. Entries stay armed until cancelled or re-armed, so the
/// caller decides after each poll whether the chain continues.
#[derive(Debug)]
pub struct PollSchedule {
    interval: Duration,
    due_at: HashMap<String, Instant>,
}

impl PollSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            due_at: HashMap::new(),
        }
    }

    /// Arm (or re-arm) a poll for `id`, due one interval after `now`.
    pub fn schedule(&mut self, id: String, now: Instant) {
        self.due_at.insert(id, now + self.interval);
    }

    pub fn cancel(&mut self, id: &str) -> bool {
        self.due_at.remove(id).is_some()
    }

    pub fn is_scheduled(&self, id: &str) -> bool {
        self.due_at.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.due_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.due_at.is_empty()
    }

    /// Ids whose poll is due at `now`, sorted for determinism.
    pub fn due(&self, now: Instant) -> Vec<String> {
        let mut due: Vec<String> = self
            .due_at
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(id, _)| id.clone())
            .collect();
        due.sort();
        due
    }
}
