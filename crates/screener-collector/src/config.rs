//! 환경변수 기반 설정 모듈.

use std::time::Duration;

use crate::retry::{DelayWindow, RetryPolicy};
use crate::Result;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 데이터베이스 URL (dry run에서는 없어도 됨)
    pub database_url: Option<String>,
    /// HTTP 요청 타임아웃
    pub http_timeout: Duration,
    /// 파이프라인 설정
    pub pipeline: PipelineConfig,
    /// 재시도 정책
    pub retry: RetryPolicy,
}

/// 파이프라인 설정
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// 업종 → 종목 단계 동시 작업 수
    pub ticker_parallelism: usize,
    /// 종목 통계 단계 동시 작업 수
    pub keystats_parallelism: usize,
    /// 단계 간 채널 용량
    pub channel_capacity: usize,
    /// 한 번에 실행기로 보낼 작업 수
    pub chunk_size: usize,
    /// 청크가 다 차지 않았을 때 추가 작업을 기다리는 시간
    pub idle_grace: Duration,
    /// 각 청크 실행 전 무작위 대기 구간
    pub dispatch_jitter: DelayWindow,
    /// 원격 실행기 주소 (없으면 로컬 실행)
    pub remote_endpoint: Option<String>,
}

/// 원격 실행기 기본 청크 크기
pub const DEFAULT_REMOTE_CHUNK_SIZE: usize = 75;

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ticker_parallelism: 4,
            keystats_parallelism: 10,
            channel_capacity: 256,
            chunk_size: 1,
            idle_grace: Duration::from_millis(500),
            dispatch_jitter: DelayWindow::from_secs(20, 120),
            remote_endpoint: None,
        }
    }
}

impl PipelineConfig {
    /// 지연 없이 동작하는 설정 (테스트, 로컬 디버깅용).
    pub fn immediate() -> Self {
        Self {
            idle_grace: Duration::from_millis(10),
            dispatch_jitter: DelayWindow::ZERO,
            ..Default::default()
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            http_timeout: Duration::from_secs(10),
            pipeline: PipelineConfig::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = PipelineConfig::default();
        let remote_endpoint = std::env::var("PIPELINE_REMOTE_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let default_chunk = if remote_endpoint.is_some() {
            DEFAULT_REMOTE_CHUNK_SIZE
        } else {
            defaults.chunk_size
        };

        let pipeline = PipelineConfig {
            ticker_parallelism: env_var_parse("PIPELINE_TICKER_PARALLELISM", defaults.ticker_parallelism),
            keystats_parallelism: env_var_parse(
                "PIPELINE_KEYSTATS_PARALLELISM",
                defaults.keystats_parallelism,
            ),
            channel_capacity: env_var_parse("PIPELINE_CHANNEL_CAPACITY", defaults.channel_capacity),
            chunk_size: env_var_parse("PIPELINE_CHUNK_SIZE", default_chunk),
            idle_grace: Duration::from_millis(env_var_parse("PIPELINE_IDLE_GRACE_MS", 500)),
            dispatch_jitter: DelayWindow::from_secs(
                env_var_parse("PIPELINE_JITTER_MIN_SECS", 20),
                env_var_parse("PIPELINE_JITTER_MAX_SECS", 120),
            ),
            remote_endpoint,
        };

        let retry = RetryPolicy {
            max_retries: env_var_parse("RETRY_MAX", 3),
            delay: DelayWindow::from_secs(
                env_var_parse("RETRY_MIN_DELAY_SECS", 40),
                env_var_parse("RETRY_MAX_DELAY_SECS", 240),
            ),
        };

        let config = Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            http_timeout: Duration::from_secs(env_var_parse("HTTP_TIMEOUT_SECS", 10)),
            pipeline,
            retry,
        };
        config.validate()?;

        Ok(config)
    }

    /// 설정 값 검증
    pub fn validate(&self) -> Result<()> {
        let pipeline = &self.pipeline;
        if pipeline.ticker_parallelism == 0 || pipeline.keystats_parallelism == 0 {
            return Err(crate::CollectorError::Config(
                "동시 작업 수는 1 이상이어야 합니다".to_string(),
            ));
        }
        if pipeline.chunk_size == 0 || pipeline.channel_capacity == 0 {
            return Err(crate::CollectorError::Config(
                "청크 크기와 채널 용량은 1 이상이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }

    /// 데이터베이스 URL 조회 (없으면 설정 에러)
    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url.as_deref().ok_or_else(|| {
            crate::CollectorError::Config(
                "DATABASE_URL 환경변수가 설정되지 않았습니다".to_string(),
            )
        })
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CollectorConfig::default();

        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.pipeline.ticker_parallelism, 4);
        assert_eq!(config.pipeline.keystats_parallelism, 10);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.delay, DelayWindow::from_secs(40, 240));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_parallelism() {
        let mut config = CollectorConfig::default();
        config.pipeline.keystats_parallelism = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_database_url() {
        let config = CollectorConfig::default();
        assert!(config.require_database_url().is_err());

        let config = CollectorConfig {
            database_url: Some("postgres://localhost/screener".to_string()),
            ..Default::default()
        };
        assert_eq!(config.require_database_url().unwrap(), "postgres://localhost/screener");
    }
}
