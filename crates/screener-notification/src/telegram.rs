//! 텔레그램 발행 채널.
//!
//! Telegram Bot API의 `sendMessage`로 선정 메시지를 전송합니다.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::types::{MessagePublisher, PublishError, PublishResult};

/// 기본 Bot API 주소
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// 요청 한도 초과 시 기본 대기 시간(초)
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// 텔레그램 발행 설정.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// @BotFather에서 받은 봇 토큰
    pub bot_token: String,
    /// 메시지를 보낼 채팅 ID
    pub chat_id: String,
    /// Bot API 주소
    pub api_base: String,
    /// 요청 타임아웃
    pub timeout: Duration,
}

impl TelegramConfig {
    /// 새 텔레그램 설정을 생성합니다.
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`가 모두 있어야 하며,
    /// `TELEGRAM_API_BASE`로 API 주소를 바꿀 수 있습니다.
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok()?;
        let mut config = Self::new(bot_token, chat_id);

        if let Ok(api_base) = std::env::var("TELEGRAM_API_BASE") {
            config.api_base = api_base;
        }

        Some(config)
    }

    /// API 주소를 변경합니다.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn validate(&self) -> PublishResult<()> {
        if self.bot_token.trim().is_empty() {
            return Err(PublishError::InvalidConfig("봇 토큰이 비어 있습니다".to_string()));
        }
        if self.chat_id.trim().is_empty() {
            return Err(PublishError::InvalidConfig("채팅 ID가 비어 있습니다".to_string()));
        }
        Ok(())
    }
}

/// 텔레그램 발행 채널.
pub struct TelegramPublisher {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramPublisher {
    /// 새 텔레그램 발행 채널을 생성합니다.
    pub fn new(config: TelegramConfig) -> PublishResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    /// 환경 변수에서 발행 채널을 생성합니다.
    pub fn from_env() -> PublishResult<Self> {
        let config = TelegramConfig::from_env().ok_or_else(|| {
            PublishError::InvalidConfig(
                "TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID 환경 변수가 필요합니다".to_string(),
            )
        })?;
        Self::new(config)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl MessagePublisher for TelegramPublisher {
    async fn publish(&self, message: &str) -> PublishResult<()> {
        let params = serde_json::json!({
            "chat_id": self.config.chat_id,
            "text": message,
            "disable_web_page_preview": true,
        });

        debug!(chat_id = %self.config.chat_id, "텔레그램 메시지 전송");

        let response = self.client.post(self.endpoint()).json(&params).send().await?;

        if response.status().is_success() {
            info!("텔레그램 메시지 전송 완료");
            return Ok(());
        }

        let status = response.status();
        if status.as_u16() == 429 {
            warn!("텔레그램 요청 한도 초과");
            return Err(PublishError::RateLimited(DEFAULT_RETRY_AFTER_SECS));
        }

        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "텔레그램 메시지 전송 실패");
        Err(PublishError::SendFailed(format!("HTTP {}: {}", status, body)))
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
