use std::time::Duration;

/// Linear retry pacing: `wait(attempt) = min(attempt * base, max)`.
///
/// Attempt `0` always waits zero, so the first retry is immediate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BackoffPolicy {
    base: Duration,
    max: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    pub fn from_millis(base_ms: u64, max_ms: u64) -> Self {
        Self::new(Duration::from_millis(base_ms), Duration::from_millis(max_ms))
    }

    /// Time to sleep after the failed attempt with index `attempt`.
    pub fn wait(&self, attempt: usize) -> Duration {
        let factor = u32::try_from(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::BackoffPolicy;

    #[test]
    fn wait_is_linear_and_capped() {
        let policy = BackoffPolicy::from_millis(100, 300);

        assert_eq!(policy.wait(0), Duration::ZERO);
        assert_eq!(policy.wait(1), Duration::from_millis(100));
        assert_eq!(policy.wait(2), Duration::from_millis(200));
        assert_eq!(policy.wait(3), Duration::from_millis(300));
        assert_eq!(policy.wait(10), Duration::from_millis(300));
    }

    #[test]
    fn huge_attempt_saturates_at_max() {
        let policy = BackoffPolicy::from_millis(u64::MAX / 2, 5_000);
        assert_eq!(policy.wait(usize::MAX), Duration::from_millis(5_000));
    }

    #[test]
    fn zero_base_never_waits() {
        let policy = BackoffPolicy::from_millis(0, 1_000);
        assert_eq!(policy.wait(7), Duration::ZERO);
    }
}
