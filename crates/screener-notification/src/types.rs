//! 발행 trait 및 에러 타입.

use async_trait::async_trait;

/// 발행 작업용 Result 타입.
pub type PublishResult<T> = Result<T, PublishError>;

/// 발행 에러.
///
/// 발행은 파이프라인의 마지막 단계이므로 모든 변형이 실행 전체의 실패가 됩니다.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("발행할 종목이 없습니다")]
    EmptySelection,

    #[error("메시지가 너무 깁니다: {length}자 (최대 {max_length}자)")]
    MessageTooLong { length: usize, max_length: usize },

    #[error("메시지 전송 실패: {0}")]
    SendFailed(String),

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// 메시지 발행 채널 trait.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// 완성된 메시지를 발행합니다.
    async fn publish(&self, message: &str) -> PublishResult<()>;

    /// 채널 이름을 반환합니다.
    fn name(&self) -> &str;
}
