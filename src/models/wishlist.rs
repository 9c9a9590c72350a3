use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WishlistEntry {
    pub user_id: String,
    pub item_id: String,
    pub created_at: DateTime<Utc>,
}

/// Client-side state of a single heart button.
///
/// Clicks while a request is in flight are ignored, so repeated clicks
/// never queue up conflicting toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WishlistToggle {
    saved: bool,
    pending: bool,
}

impl WishlistToggle {
    pub fn new(saved: bool) -> Self {
        WishlistToggle {
            saved,
            pending: false,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Flips the displayed state optimistically. Returns false when a
    /// toggle is already running and the click should be dropped.
    pub fn begin(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.saved = !self.saved;
        self.pending = true;
        true
    }

    /// Adopts the state reported by the server.
    pub fn settle(&mut self, saved: bool) {
        self.saved = saved;
        self.pending = false;
    }

    /// Undoes the optimistic flip after a failed request.
    pub fn fail(&mut self) {
        if self.pending {
            self.saved = !self.saved;
            self.pending = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_toggles_restore_initial_state() {
        let mut toggle = WishlistToggle::new(false);
        assert!(toggle.begin());
        toggle.settle(true);
        assert!(toggle.is_saved());
        assert!(toggle.begin());
        toggle.settle(false);
        assert!(!toggle.is_saved());
    }

    #[test]
    fn clicks_while_pending_are_ignored() {
        let mut toggle = WishlistToggle::new(true);
        assert!(toggle.begin());
        assert!(!toggle.begin());
        assert!(!toggle.begin());
        assert!(!toggle.is_saved());
        toggle.settle(false);
        assert!(!toggle.is_pending());
    }

    #[test]
    fn failure_reverts() {
        let mut toggle = WishlistToggle::new(false);
        toggle.begin();
        toggle.fail();
        assert!(!toggle.is_saved());
        assert!(!toggle.is_pending());
        toggle.fail();
        assert!(!toggle.is_saved());
    }
}
