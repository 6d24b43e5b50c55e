//! # Screener Notification
//!
//! 선정된 종목 목록을 길이 제한 메시지로 렌더링하고 외부 채널에 발행합니다.
//!
//! 지원 채널:
//! - Telegram
//! - 로그 (dry run)
//!
//! 메시지 형식은 `"{prefix}: $SYM1 $SYM2 ..."`이며, 길이 제한을 넘으면
//! 맨 뒤(가장 낮은 순위) 종목부터 하나씩 빼면서 다시 렌더링합니다.

pub mod log;
pub mod message;
pub mod telegram;
pub mod types;

pub use log::LogPublisher;
pub use message::{fit_message, publish_selection, render_message};
pub use telegram::{TelegramConfig, TelegramPublisher};
pub use types::{MessagePublisher, PublishError, PublishResult};
