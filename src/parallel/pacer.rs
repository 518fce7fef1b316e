//! Shared backoff gate for rate limiting

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Gate that every dispatch passes through
///
/// When any task hits the remote rate limit it pushes the resume deadline
/// forward; all subsequent dispatches wait until that deadline has passed.
#[derive(Debug, Default)]
pub struct Pacer {
    resume_at: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold dispatches for at least `delay` from now
    pub fn back_off(&self, delay: Duration) {
        let until = Instant::now() + delay;
        let mut resume_at = self.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
        *resume_at = Some(match *resume_at {
            Some(current) if current > until => current,
            _ => until,
        });
    }

    /// Remaining backoff, if any
    pub fn remaining(&self) -> Option<Duration> {
        let resume_at = *self.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
        resume_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .filter(|left| !left.is_zero())
    }

    /// Resolve once no backoff is pending
    pub async fn wait(&self) {
        loop {
            let deadline = *self.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
            match deadline {
                Some(deadline) if deadline > Instant::now() => {
                    tokio::time::sleep_until(deadline).await;
                }
                _ => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_without_backoff_is_immediate() {
        let pacer = Pacer::new();
        let started = std::time::Instant::now();
        pacer.wait().await;
        assert!(started.elapsed() < Duration::from_millis(20));
        assert!(pacer.remaining().is_none());
    }

    #[tokio::test]
    async fn test_backoff_only_extends() {
        let pacer = Pacer::new();
        pacer.back_off(Duration::from_millis(60));
        pacer.back_off(Duration::from_millis(5));
        assert!(pacer.remaining().unwrap() > Duration::from_millis(30));

        let started = std::time::Instant::now();
        pacer.wait().await;
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
