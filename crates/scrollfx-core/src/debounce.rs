use std::time::Duration;

use tokio::time::Instant;

/// Collapses a burst of notifications into one, fired after a quiet period
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    /// Record a notification; pushes the deadline back
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once per burst, when the quiet period has elapsed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_fires_once() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(20));
        assert!(!debouncer.fire(start));

        debouncer.poke(start);
        debouncer.poke(start + Duration::from_millis(10));
        assert!(!debouncer.fire(start + Duration::from_millis(25)));
        assert!(debouncer.fire(start + Duration::from_millis(30)));
        assert!(!debouncer.fire(start + Duration::from_millis(60)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(20));
        debouncer.poke(start);
        debouncer.cancel();
        assert!(!debouncer.fire(start + Duration::from_secs(1)));
    }
}
