//! Cooldown tracker: last activation time per action.

use std::collections::BTreeMap;

use super::ActionId;

/// Per-agent reuse bookkeeping.
///
/// Invariant: a recorded timestamp never moves backwards.
#[derive(Debug, Clone, Default)]
pub struct CooldownTracker {
    last_used: BTreeMap<ActionId, f64>,
}

impl CooldownTracker {
    /// Usable if never activated, or `reuse_time` has passed since the last activation.
    pub fn is_reuse_elapsed(&self, id: ActionId, reuse_time: f32, now: f64) -> bool {
        match self.last_used.get(&id) {
            None => true,
            Some(last) => now - last >= reuse_time as f64,
        }
    }

    /// Record an activation. Older timestamps are ignored.
    pub fn record(&mut self, id: ActionId, now: f64) {
        let last = self.last_used.entry(id).or_insert(now);
        if now > *last {
            *last = now;
        }
    }

    pub fn last_used(&self, id: ActionId) -> Option<f64> {
        self.last_used.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_used_is_ready() {
        let tracker = CooldownTracker::default();
        assert!(tracker.is_reuse_elapsed(ActionId::Fireball, 5.0, 0.0));
        assert_eq!(tracker.last_used(ActionId::Fireball), None);
    }

    #[test]
    fn test_cooldown_window() {
        let mut tracker = CooldownTracker::default();
        tracker.record(ActionId::Slash, 2.0);

        assert!(!tracker.is_reuse_elapsed(ActionId::Slash, 1.0, 2.5));
        // Boundary is inclusive
        assert!(tracker.is_reuse_elapsed(ActionId::Slash, 1.0, 3.0));
        // Other actions are independent
        assert!(tracker.is_reuse_elapsed(ActionId::Fireball, 5.0, 2.5));
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let mut tracker = CooldownTracker::default();
        tracker.record(ActionId::Slash, 4.0);
        tracker.record(ActionId::Slash, 3.0);
        assert_eq!(tracker.last_used(ActionId::Slash), Some(4.0));

        tracker.record(ActionId::Slash, 6.5);
        assert_eq!(tracker.last_used(ActionId::Slash), Some(6.5));
    }
}
