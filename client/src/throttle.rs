use std::{collections::HashMap, time::Duration};

use tandem_shared::{AttributeMap, Value};

/// Rate limit for high-frequency attributes on the outgoing path.
///
/// Each throttled attribute publishes at most once per interval; values
/// written inside a closed window replace each other and the latest one is
/// released by [`poll_due`](Self::poll_due) when the window reopens. Time
/// is the participant's local clock, never the replicated one.
///
/// Consecutive sends of one attribute are at least `interval` apart, so a
/// half-open span `[t, t + 1s)` holds at most `1s / interval` of them. A
/// closed span `[t, t + 1s]` can hold one more.
#[derive(Clone, Debug)]
pub struct AttributeThrottle {
    interval: Duration,
    throttled: Vec<String>,
    last_sent: HashMap<String, Duration>,
    pending: AttributeMap,
}

impl AttributeThrottle {
    pub fn new(interval: Duration, throttled: Vec<String>) -> Self {
        Self {
            interval,
            throttled,
            last_sent: HashMap::new(),
            pending: AttributeMap::new(),
        }
    }

    pub fn is_throttled(&self, attribute: &str) -> bool {
        self.throttled.iter().any(|name| name == attribute)
    }

    /// Returns the value if it may be published right now
    pub fn offer(&mut self, attribute: &str, value: Value, now: Duration) -> Option<Value> {
        if self.is_window_open(attribute, now) {
            self.pending.shift_remove(attribute);
            self.last_sent.insert(attribute.to_string(), now);
            Some(value)
        } else {
            self.pending.insert(attribute.to_string(), value);
            None
        }
    }

    /// Pending values whose window has reopened, as one delta
    pub fn poll_due(&mut self, now: Duration) -> AttributeMap {
        let due: Vec<String> = self
            .pending
            .keys()
            .filter(|attribute| self.is_window_open(attribute, now))
            .cloned()
            .collect();

        let mut output = AttributeMap::new();
        for attribute in due {
            if let Some(value) = self.pending.shift_remove(&attribute) {
                self.last_sent.insert(attribute.clone(), now);
                output.insert(attribute, value);
            }
        }
        output
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.last_sent.clear();
        self.pending.clear();
    }

    /// A window reopens exactly `interval` after the last send
    fn is_window_open(&self, attribute: &str, now: Duration) -> bool {
        match self.last_sent.get(attribute) {
            Some(last_sent) => now.saturating_sub(*last_sent) >= self.interval,
            None => true,
        }
    }
}
