//! 로그 발행 채널 (dry run).

use async_trait::async_trait;
use std::sync::Mutex;
use tracing::info;

use crate::types::{MessagePublisher, PublishResult};

/// 메시지를 외부로 보내지 않고 로그에 남기는 발행 채널.
///
/// 발행한 메시지는 [`messages`](Self::messages)로 다시 확인할 수 있습니다.
#[derive(Debug, Default)]
pub struct LogPublisher {
    published: Mutex<Vec<String>>,
}

impl LogPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 지금까지 발행한 메시지 목록.
    pub fn messages(&self) -> Vec<String> {
        self.published
            .lock()
            .map(|published| published.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl MessagePublisher for LogPublisher {
    async fn publish(&self, message: &str) -> PublishResult<()> {
        info!(length = message.chars().count(), "[dry-run] {}", message);
        if let Ok(mut published) = self.published.lock() {
            published.push(message.to_string());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
