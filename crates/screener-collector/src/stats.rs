//! 단계별 수집 통계.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::pipeline::WorkState;

/// 파이프라인 단계 통계
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    /// 총 작업 수
    pub total: usize,
    /// 성공 (Done)
    pub done: usize,
    /// 재시도 소진 또는 영구 실패 (Failed)
    pub failed: usize,
    /// 재시도 횟수 (첫 시도 제외)
    pub retried: usize,
    /// 페이지 구조 불일치로 빈 결과 처리
    pub empty: usize,
    /// 중복으로 버린 결과
    pub duplicates: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl StageStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 종료 상태의 작업 하나를 반영합니다.
    pub fn record(&mut self, state: &WorkState) {
        self.total += 1;
        match state {
            WorkState::Done { attempts, empty } => {
                self.done += 1;
                self.retried += attempts.saturating_sub(1) as usize;
                if *empty {
                    self.empty += 1;
                }
            }
            WorkState::Failed { attempts, .. } => {
                self.failed += 1;
                self.retried += attempts.saturating_sub(1) as usize;
            }
            _ => {}
        }
    }

    /// 다른 통계를 합산합니다 (소요 시간은 더 긴 쪽).
    pub fn merge(&mut self, other: &StageStats) {
        self.total += other.total;
        self.done += other.done;
        self.failed += other.failed;
        self.retried += other.retried;
        self.empty += other.empty;
        self.duplicates += other.duplicates;
        self.elapsed = self.elapsed.max(other.elapsed);
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.done as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, stage: &str) {
        tracing::info!(
            stage = stage,
            total = self.total,
            done = self.done,
            failed = self.failed,
            retried = self.retried,
            empty = self.empty,
            duplicates = self.duplicates,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "단계 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_terminal_states() {
        let mut stats = StageStats::new();
        stats.record(&WorkState::Done { attempts: 1, empty: false });
        stats.record(&WorkState::Done { attempts: 3, empty: true });
        stats.record(&WorkState::Failed { attempts: 4, reason: "timeout".into() });

        assert_eq!(stats.total, 3);
        assert_eq!(stats.done, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.retried, 5);
        assert_eq!(stats.empty, 1);
        assert!((stats.success_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_merge() {
        let mut a = StageStats { total: 2, done: 2, elapsed: Duration::from_secs(3), ..Default::default() };
        let b = StageStats { total: 1, failed: 1, duplicates: 4, elapsed: Duration::from_secs(5), ..Default::default() };
        a.merge(&b);

        assert_eq!((a.total, a.done, a.failed, a.duplicates), (3, 2, 1, 4));
        assert_eq!(a.elapsed, Duration::from_secs(5));
    }
}
