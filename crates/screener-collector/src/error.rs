//! 에러 타입 정의.

use std::fmt;

use screener_core::ConfigError;
use screener_data::{ExtractionError, FetchError, PersistenceError};
use screener_notification::PublishError;
use screener_ranking::RankingError;
use serde::{Deserialize, Serialize};

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 저장소 에러
    Persistence(PersistenceError),
    /// 설정 에러
    Config(String),
    /// 수집 자체가 불가능한 조회 실패 (디렉터리 페이지 등)
    Collection(String),
    /// 랭킹 엔진 구성 에러
    Ranking(RankingError),
    /// 발행 에러
    Publish(PublishError),
    /// 실행 취소
    Cancelled,
    /// 일반 에러
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persistence(e) => write!(f, "Persistence error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Collection(msg) => write!(f, "Collection error: {}", msg),
            Self::Ranking(e) => write!(f, "Ranking error: {}", e),
            Self::Publish(e) => write!(f, "Publish error: {}", e),
            Self::Cancelled => write!(f, "Run cancelled"),
            Self::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for CollectorError {}

impl From<PersistenceError> for CollectorError {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}

impl From<ConfigError> for CollectorError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RankingError> for CollectorError {
    fn from(err: RankingError) -> Self {
        Self::Ranking(err)
    }
}

impl From<PublishError> for CollectorError {
    fn from(err: PublishError) -> Self {
        Self::Publish(err)
    }
}

impl From<FetchError> for CollectorError {
    fn from(err: FetchError) -> Self {
        Self::Collection(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CollectorError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Other(err)
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;

/// 파이프라인 작업 단위 에러.
///
/// 원격 실행기와 주고받을 수 있도록 직렬화 가능한 형태로 유지합니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum JobError {
    /// 타임아웃, 연결 실패, 5xx, 429
    #[error("일시적 조회 실패: {0}")]
    Transient(String),

    /// 재시도해도 같은 결과가 예상되는 조회 실패 (4xx)
    #[error("조회 실패: {0}")]
    Fetch(String),

    /// 예상한 페이지 구조가 없음
    #[error("페이지 구조 불일치: {0}")]
    Extraction(String),

    /// 실행 취소
    #[error("작업 취소")]
    Cancelled,
}

impl JobError {
    /// 재시도 대상인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl From<FetchError> for JobError {
    fn from(err: FetchError) -> Self {
        if err.is_transient() {
            Self::Transient(err.to_string())
        } else {
            Self::Fetch(err.to_string())
        }
    }
}

impl From<ExtractionError> for JobError {
    fn from(err: ExtractionError) -> Self {
        Self::Extraction(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_error_classification() {
        let timeout: JobError = FetchError::Timeout { url: "http://x".into() }.into();
        assert!(timeout.is_retryable());

        let server: JobError = FetchError::Status { url: "http://x".into(), status: 503 }.into();
        assert!(server.is_retryable());

        let missing: JobError = FetchError::Status { url: "http://x".into(), status: 404 }.into();
        assert!(!missing.is_retryable());

        let drift: JobError = ExtractionError::NoData { page: "통계" }.into();
        assert!(!drift.is_retryable());
        assert!(!JobError::Cancelled.is_retryable());
    }

    #[test]
    fn test_job_error_serialization() {
        let json = serde_json::to_string(&JobError::Transient("timeout".into())).unwrap();
        assert_eq!(json, r#"{"kind":"transient","detail":"timeout"}"#);

        let back: JobError = serde_json::from_str(r#"{"kind":"cancelled"}"#).unwrap();
        assert_eq!(back, JobError::Cancelled);
    }
}
