//! 작업 상태 머신.

/// 파이프라인 작업 하나의 상태.
///
/// `Queued → Fetching → Extracted → Done` 또는 `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkState {
    /// 대기 중
    Queued,
    /// 조회 중 (1부터 시작하는 시도 번호)
    Fetching { attempt: u32 },
    /// 추출 완료, 다음 단계로 전달 전
    Extracted { attempts: u32, empty: bool },
    /// 완료
    Done { attempts: u32, empty: bool },
    /// 재시도 소진 또는 영구 실패
    Failed { attempts: u32, reason: String },
}

impl WorkState {
    /// 종료 상태인지 확인합니다.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Failed { .. })
    }

    /// 지금까지의 시도 횟수.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Queued => 0,
            Self::Fetching { attempt } => *attempt,
            Self::Extracted { attempts, .. }
            | Self::Done { attempts, .. }
            | Self::Failed { attempts, .. } => *attempts,
        }
    }

    /// 새 시도를 시작합니다. 종료 상태는 바뀌지 않습니다.
    pub fn begin_attempt(self) -> Self {
        match self {
            Self::Queued => Self::Fetching { attempt: 1 },
            Self::Fetching { attempt } => Self::Fetching { attempt: attempt + 1 },
            other => other,
        }
    }

    /// 조회/추출 성공.
    pub fn extracted(self, empty: bool) -> Self {
        match self {
            Self::Fetching { attempt } => Self::Extracted {
                attempts: attempt,
                empty,
            },
            other => other,
        }
    }

    /// 결과를 다음 단계로 넘겼습니다.
    pub fn complete(self) -> Self {
        match self {
            Self::Extracted { attempts, empty } => Self::Done { attempts, empty },
            other => other,
        }
    }

    /// 실패로 종료합니다.
    pub fn fail(self, reason: impl Into<String>) -> Self {
        if self.is_terminal() {
            return self;
        }
        Self::Failed {
            attempts: self.attempts(),
            reason: reason.into(),
        }
    }
}
