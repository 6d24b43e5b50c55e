//! 데이터 모듈 에러 타입.
//!
//! - [`FetchError`]: 문서 조회 실패 (일시적 실패는 재시도 대상)
//! - [`ExtractionError`]: 예상한 페이지 구조가 없음 (빈 결과로 취급)
//! - [`PersistenceError`]: 저장 실패 (해당 항목만 실패)

use thiserror::Error;

/// 문서 조회 에러.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 요청 실패 (연결, TLS 등)
    #[error("HTTP 요청 실패: {0}")]
    Http(#[from] reqwest::Error),

    /// 요청 타임아웃
    #[error("요청 타임아웃: {url}")]
    Timeout { url: String },

    /// Rate limit 초과 (HTTP 429)
    #[error("Rate limit 초과: {url}")]
    RateLimited { url: String },

    /// 성공이 아닌 HTTP 상태 코드
    #[error("HTTP {status}: {url}")]
    Status { url: String, status: u16 },

    /// 기타 전송 계층 에러
    #[error("전송 실패: {0}")]
    Transport(String),
}

impl FetchError {
    /// 재시도하면 성공할 수 있는 일시적 실패인지 확인합니다.
    ///
    /// 4xx 응답(429 제외)은 같은 요청을 반복해도 결과가 같으므로 제외합니다.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
        }
    }
}

/// 페이지 구조 추출 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// 예상한 테이블/셀 구조가 없음
    #[error("{page} 페이지 구조를 찾을 수 없음: {detail}")]
    MissingStructure { page: &'static str, detail: String },

    /// 구조는 있으나 추출된 항목이 없음
    #[error("{page} 페이지에 데이터 없음")]
    NoData { page: &'static str },
}

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(#[from] sqlx::Error),

    /// 연결 실패
    #[error("데이터베이스 연결 실패: {0}")]
    Connection(String),

    /// tickers 테이블에 없는 종목
    #[error("등록되지 않은 종목: {0}")]
    UnknownTicker(String),

    /// 스키마 초기화 실패
    #[error("스키마 초기화 실패: {0}")]
    Migration(String),

    /// 테스트/대체 저장소에서 주입된 실패
    #[error("저장 실패: {0}")]
    Rejected(String),
}
