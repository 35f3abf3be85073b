use serde::{Deserialize, Serialize};

use crate::types::SessionInstant;

/// Replicated session clock plus the schedule of the global step loop.
///
/// Time only moves when the transport says so (a delivered command or an
/// advance), so every replica runs its steps at identical session times.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaClock {
    now: SessionInstant,
    next_step: SessionInstant,
    step_interval_ms: u64,
}

impl ReplicaClock {
    pub fn new(step_interval_ms: u64) -> Self {
        let step_interval_ms = step_interval_ms.max(1);
        Self {
            now: SessionInstant::ZERO,
            next_step: SessionInstant::ZERO + step_interval_ms,
            step_interval_ms,
        }
    }

    pub fn now(&self) -> SessionInstant {
        self.now
    }

    pub fn next_step(&self) -> SessionInstant {
        self.next_step
    }

    /// Pops the next step due at or before `target`, moving `now` onto it.
    /// Call repeatedly until `None`, then [`settle`](Self::settle).
    pub fn pop_due_step(&mut self, target: SessionInstant) -> Option<SessionInstant> {
        if self.next_step > target {
            return None;
        }
        let due = self.next_step;
        self.now = self.now.max(due);
        self.next_step = due + self.step_interval_ms;
        Some(due)
    }

    /// Moves `now` to `target`; never backwards
    pub fn settle(&mut self, target: SessionInstant) {
        self.now = self.now.max(target);
    }
}
