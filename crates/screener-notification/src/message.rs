//! 선정 메시지 렌더링.

use screener_core::PublishConfig;
use tracing::{debug, info};

use crate::types::{MessagePublisher, PublishError, PublishResult};

/// `"{prefix}: $SYM1 $SYM2 ..."` 형식으로 렌더링합니다.
///
/// ```
/// use screener_notification::render_message;
///
/// assert_eq!(render_message("MF", &["CF", "AGU"]), "MF: $CF $AGU");
/// ```
pub fn render_message<S: AsRef<str>>(prefix: &str, symbols: &[S]) -> String {
    let body = symbols
        .iter()
        .map(|s| format!("${}", s.as_ref()))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}: {}", prefix, body)
}

/// 길이 제한 안에 들어오는 가장 긴 앞부분으로 메시지를 만듭니다.
///
/// 제한을 넘으면 마지막 종목을 하나씩 빼고 다시 렌더링합니다. 종목 중간에서 자르지 않습니다.
/// 종목이 없거나 첫 종목 하나만으로도 제한을 넘으면 에러입니다.
pub fn fit_message<S: AsRef<str>>(
    prefix: &str,
    symbols: &[S],
    max_length: usize,
) -> PublishResult<String> {
    if symbols.is_empty() {
        return Err(PublishError::EmptySelection);
    }

    let mut count = symbols.len();
    loop {
        let message = render_message(prefix, &symbols[..count]);
        let length = message.chars().count();

        if length <= max_length {
            if count < symbols.len() {
                debug!(kept = count, dropped = symbols.len() - count, "메시지 길이 제한으로 종목 축소");
            }
            return Ok(message);
        }

        if count == 1 {
            return Err(PublishError::MessageTooLong { length, max_length });
        }
        count -= 1;
    }
}

/// 선정 종목을 메시지로 만들어 발행하고, 발행한 메시지를 반환합니다.
pub async fn publish_selection<S: AsRef<str>>(
    publisher: &dyn MessagePublisher,
    config: &PublishConfig,
    symbols: &[S],
) -> PublishResult<String> {
    let message = fit_message(&config.prefix, symbols, config.max_length)?;
    publisher.publish(&message).await?;

    info!(channel = publisher.name(), message = %message, "선정 종목 발행 완료");
    Ok(message)
}
