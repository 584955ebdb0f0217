use std::time::{Duration, Instant};

use crate::ident::NormalizedId;

/// Rejects repeated identical decodes inside a cooldown window.
///
/// A held-steady camera re-decodes the same printed code on consecutive
/// ticks; without suppression every one of those would reach the lookup
/// endpoint. The window is deliberately short: a different session later
/// must be able to accept the same code again.
///
/// State belongs to one session and is discarded with it.
pub struct DuplicateGuard {
    cooldown: Duration,
    last_value: Option<NormalizedId>,
    last_at: Option<Instant>,
}

impl DuplicateGuard {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_value: None,
            last_at: None,
        }
    }

    /// Accept or reject a candidate. On accept, the candidate and the
    /// current instant are recorded. The check and the record happen in one
    /// synchronous call; callers must not await between decode and this
    /// decision.
    pub fn accept(&mut self, candidate: &NormalizedId) -> bool {
        self.accept_at(candidate, Instant::now())
    }

    fn accept_at(&mut self, candidate: &NormalizedId, now: Instant) -> bool {
        if let (Some(last), Some(at)) = (&self.last_value, self.last_at) {
            if last == candidate && now.duration_since(at) < self.cooldown {
                return false;
            }
        }

        self.last_value = Some(candidate.clone());
        self.last_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::normalize;

    fn id(s: &str) -> NormalizedId {
        normalize(s).unwrap()
    }

    #[test]
    fn rejects_repeat_inside_window() {
        let mut guard = DuplicateGuard::new(Duration::from_millis(1000));
        let t0 = Instant::now();

        assert!(guard.accept_at(&id("396A0C84B8914D2"), t0));
        assert!(!guard.accept_at(&id("396A0C84B8914D2"), t0 + Duration::from_millis(100)));
        assert!(!guard.accept_at(&id("396A0C84B8914D2"), t0 + Duration::from_millis(999)));
    }

    #[test]
    fn accepts_repeat_after_window() {
        let mut guard = DuplicateGuard::new(Duration::from_millis(1000));
        let t0 = Instant::now();

        assert!(guard.accept_at(&id("396A0C84B8914D2"), t0));
        assert!(guard.accept_at(&id("396A0C84B8914D2"), t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn different_value_passes_immediately() {
        let mut guard = DuplicateGuard::new(Duration::from_millis(1000));
        let t0 = Instant::now();

        assert!(guard.accept_at(&id("AAAA11112222BBBB"), t0));
        assert!(guard.accept_at(&id("CCCC33334444DDDD"), t0 + Duration::from_millis(10)));
    }

    #[test]
    fn rejection_keeps_the_original_timestamp() {
        // The window is measured from the last *accepted* scan, so a stream
        // of rejected repeats cannot extend it forever.
        let mut guard = DuplicateGuard::new(Duration::from_millis(1000));
        let t0 = Instant::now();

        assert!(guard.accept_at(&id("396A0C84B8914D2"), t0));
        assert!(!guard.accept_at(&id("396A0C84B8914D2"), t0 + Duration::from_millis(900)));
        assert!(guard.accept_at(&id("396A0C84B8914D2"), t0 + Duration::from_millis(1100)));
    }
}
