//! 랭킹 에러 타입.

use thiserror::Error;

/// 랭킹 엔진 구성 오류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankingError {
    /// 등록되지 않은 전략 이름
    #[error("알 수 없는 랭킹 전략: {name} (사용 가능: {available})")]
    UnknownStrategy { name: String, available: String },

    /// 선정 종목 수가 0
    #[error("선정 종목 수는 1 이상이어야 합니다")]
    InvalidTopN,
}

/// 랭킹 결과 타입.
pub type RankingResult<T> = Result<T, RankingError>;
