//! 수집기 로그 설정.
//!
//! 레벨은 CLI `--log-level`(또는 `RUST_LOG`)로, 출력 형식은 `LOG_FORMAT`
//! (`pretty`, `json`, `compact`)으로 정합니다.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// 로그 수집기로 보내는 한 줄 JSON
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("알 수 없는 로그 형식: {}", other)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 필터 지시어 (예: "info", "screener_collector=debug")
    pub level: String,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            format: LogFormat::default(),
        }
    }

    /// `LOG_FORMAT`이 올바른 값이면 형식을 바꿉니다.
    pub fn with_env_format(self) -> Self {
        self.with_format_var(std::env::var("LOG_FORMAT").ok().as_deref())
    }

    fn with_format_var(mut self, value: Option<&str>) -> Self {
        if let Some(format) = value.and_then(|v| v.parse().ok()) {
            self.format = format;
        }
        self
    }
}

/// 전역 subscriber를 설치합니다. `RUST_LOG`가 있으면 `config.level`보다 우선합니다.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let output = match config.format {
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Json => fmt::layer().json().flatten_event(true).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    };

    tracing_subscriber::registry().with(output).with(filter).try_init()?;

    tracing::debug!(format = ?config.format, level = %config.level, "로깅 초기화 완료");
    Ok(())
}

/// 파이프라인 단계 이름을 담은 span.
#[macro_export]
macro_rules! stage_span {
    ($stage:expr) => {
        tracing::info_span!("stage", stage = %$stage)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!(" JSON ".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_format_var_overrides_only_valid_values() {
        let config = LogConfig::new("debug");
        assert_eq!(config.format, LogFormat::Pretty);

        let config = config.with_format_var(Some("json"));
        assert_eq!(config.format, LogFormat::Json);

        let config = config.with_format_var(Some("xml")).with_format_var(None);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "debug");
    }
}
