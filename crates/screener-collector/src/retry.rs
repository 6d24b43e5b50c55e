//! 재시도 정책과 무작위 대기.
//!
//! 불안정한 원본 사이트에 동시에 재요청이 몰리지 않도록 대기 시간을 구간 안에서 무작위로 뽑습니다.

use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;

/// 무작위 대기 구간 `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayWindow {
    pub min: Duration,
    pub max: Duration,
}

impl DelayWindow {
    /// 대기 없음
    pub const ZERO: Self = Self {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    /// 초 단위 구간. `min > max`이면 두 값을 맞바꿉니다.
    pub fn from_secs(min: u64, max: u64) -> Self {
        Self::new(Duration::from_secs(min), Duration::from_secs(max))
    }

    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// 구간 안의 대기 시간을 밀리초 단위로 뽑습니다.
    pub fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if min == max {
            return self.min;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// 작업 재시도 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 첫 시도 이후 최대 재시도 횟수
    pub max_retries: u32,
    /// 재시도 전 대기 구간
    pub delay: DelayWindow,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: DelayWindow::from_secs(40, 240),
        }
    }
}

impl RetryPolicy {
    /// 대기 없이 재시도하는 정책.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            delay: DelayWindow::ZERO,
        }
    }

    /// `attempt`번째 시도가 `error`로 실패했을 때 다시 시도할지 결정합니다.
    pub fn should_retry(&self, attempt: u32, error: &JobError) -> bool {
        error.is_retryable() && attempt <= self.max_retries
    }

    /// 다음 재시도까지의 대기 시간.
    pub fn next_delay(&self) -> Duration {
        self.delay.sample()
    }
}

/// 취소 가능한 대기. 대기를 끝까지 마치면 `true`, 취소되면 `false`.
pub async fn sleep_or_cancel(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }

    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_sample_in_range() {
        let window = DelayWindow::from_secs(40, 240);
        for _ in 0..100 {
            let delay = window.sample();
            assert!(delay >= Duration::from_secs(40));
            assert!(delay <= Duration::from_secs(240));
        }
        assert_eq!(DelayWindow::ZERO.sample(), Duration::ZERO);
        assert_eq!(DelayWindow::from_secs(9, 3), DelayWindow::from_secs(3, 9));
    }

    #[test]
    fn test_retry_ceiling() {
        let policy = RetryPolicy::default();
        let transient = JobError::Transient("timeout".into());

        assert!(policy.should_retry(1, &transient));
        assert!(policy.should_retry(3, &transient));
        assert!(!policy.should_retry(4, &transient));
        assert!(!policy.should_retry(1, &JobError::Fetch("404".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_or_cancel() {
        let cancel = CancellationToken::new();
        assert!(sleep_or_cancel(Duration::from_secs(60), &cancel).await);

        cancel.cancel();
        assert!(!sleep_or_cancel(Duration::from_secs(60), &cancel).await);
        assert!(!sleep_or_cancel(Duration::ZERO, &cancel).await);
    }
}
