//! 스크리너 공통 에러 타입.

use thiserror::Error;

/// 필드 값 정규화 에러.
///
/// 정규화 실패는 레코드 전체를 중단시키지 않습니다.
/// [`crate::normalize`]는 이 에러를 받아 원본 문자열을 그대로 보존합니다.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    /// 숫자로 해석할 수 없는 값
    #[error("숫자 파싱 실패: {0}")]
    Unparsable(String),

    /// 배율 적용 중 오버플로우
    #[error("값 범위 초과: {0}")]
    Overflow(String),
}

/// 설정/카탈로그 로드 에러.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 설정 파일 또는 환경 변수 로드 실패
    #[error("설정 로드 실패: {0}")]
    Load(#[from] config::ConfigError),

    /// 필드 카탈로그 파싱 실패
    #[error("필드 카탈로그 파싱 실패: {0}")]
    Catalog(#[from] toml::de::Error),

    /// 카탈로그 내용이 잘못됨 (중복 라벨/컬럼 등)
    #[error("잘못된 필드 카탈로그: {0}")]
    InvalidCatalog(String),

    /// 파일 I/O 에러
    #[error("파일 읽기 실패: {0}")]
    Io(#[from] std::io::Error),
}
