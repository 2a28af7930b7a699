//! Status transitions with generation stamps.
//!
//! Each transition bumps the generation. A scheduled revert carries the
//! generation it was scheduled for and only lands if nothing has happened
//! since, so the most recently scheduled revert always decides when the
//! status returns to idle.

use super::types::UploadStatus;

pub type Generation = u64;

#[derive(Debug, Default)]
pub struct StatusTracker {
    status: UploadStatus,
    generation: Generation,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Move to `status` and return the generation a revert must match
    pub fn transition(&mut self, status: UploadStatus) -> Generation {
        self.status = status;
        self.generation += 1;
        self.generation
    }

    /// Return to idle if no transition happened after `generation`.
    ///
    /// Returns whether the status changed.
    pub fn revert_if_current(&mut self, generation: Generation) -> bool {
        if generation != self.generation || self.status == UploadStatus::Idle {
            return false;
        }
        self.status = UploadStatus::Idle;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_applies_to_latest_transition() {
        let mut tracker = StatusTracker::new();
        let generation = tracker.transition(UploadStatus::Success);

        assert!(tracker.revert_if_current(generation));
        assert_eq!(tracker.status(), UploadStatus::Idle);
    }

    #[test]
    fn test_stale_revert_is_ignored() {
        let mut tracker = StatusTracker::new();
        let success = tracker.transition(UploadStatus::Success);
        let error = tracker.transition(UploadStatus::Error);

        assert!(!tracker.revert_if_current(success));
        assert_eq!(tracker.status(), UploadStatus::Error);

        assert!(tracker.revert_if_current(error));
        assert_eq!(tracker.status(), UploadStatus::Idle);
    }

    #[test]
    fn test_double_revert_reports_no_change() {
        let mut tracker = StatusTracker::new();
        let generation = tracker.transition(UploadStatus::Error);

        assert!(tracker.revert_if_current(generation));
        assert!(!tracker.revert_if_current(generation));
    }
}
