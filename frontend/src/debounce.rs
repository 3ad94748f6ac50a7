//! Scroll rate limiter
//!
//! A host-agnostic debounce state machine. The owner asks it what to do on
//! every trigger and reports back when the scheduled call elapses; the owner
//! is responsible for the actual timer (see [`Timer::ScrollDebounce`]).
//!
//! [`Timer::ScrollDebounce`]: crate::page::Timer::ScrollDebounce

/// What the caller has to do after a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    /// Run the wrapped callback right now (leading edge).
    pub fire_now: bool,
    /// Previously scheduled call to cancel.
    pub cancel: Option<u64>,
    /// Token of the call to schedule `wait_ms` from now.
    pub schedule: u64,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    wait_ms: u32,
    immediate: bool,
    pending: Option<u64>,
    issued: u64,
}

impl Debouncer {
    pub fn new(wait_ms: u32, immediate: bool) -> Self {
        Self {
            wait_ms,
            immediate,
            pending: None,
            issued: 0,
        }
    }

    pub fn wait_ms(&self) -> u32 {
        self.wait_ms
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }

    pub fn trigger(&mut self) -> Trigger {
        let fire_now = self.immediate && self.pending.is_none();
        self.issued += 1;
        let cancel = self.pending.replace(self.issued);
        Trigger {
            fire_now,
            cancel,
            schedule: self.issued,
        }
    }

    /// Report that the call scheduled under `token` elapsed.
    ///
    /// Returns whether the wrapped callback should run (trailing edge). Tokens
    /// that were superseded are ignored.
    pub fn elapsed(&mut self, token: u64) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        !self.immediate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_fires_once_per_burst() {
        let mut debouncer = Debouncer::new(10, true);
        assert!(debouncer.is_idle());

        let first = debouncer.trigger();
        assert!(first.fire_now);
        assert_eq!(first.cancel, None);

        let second = debouncer.trigger();
        assert!(!second.fire_now);
        assert_eq!(second.cancel, Some(first.schedule));

        let third = debouncer.trigger();
        assert!(!third.fire_now);

        // Superseded timers never fire anything
        assert!(!debouncer.elapsed(first.schedule));
        assert!(!debouncer.elapsed(second.schedule));
        assert!(!debouncer.is_idle());

        // The surviving timer only clears the pending marker
        assert!(!debouncer.elapsed(third.schedule));
        assert!(debouncer.is_idle());

        assert!(debouncer.trigger().fire_now);
    }

    #[test]
    fn test_trailing_mode_fires_after_silence() {
        let mut debouncer = Debouncer::new(25, false);
        assert_eq!(debouncer.wait_ms(), 25);

        let first = debouncer.trigger();
        assert!(!first.fire_now);
        let second = debouncer.trigger();
        assert!(!second.fire_now);

        assert!(!debouncer.elapsed(first.schedule));
        assert!(debouncer.elapsed(second.schedule));
        assert!(debouncer.is_idle());

        // Same token twice is a no-op
        assert!(!debouncer.elapsed(second.schedule));
    }
}
