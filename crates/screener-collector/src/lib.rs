//! Magic Formula 스크리너 수집 파이프라인.
//!
//! 이 crate는 다음을 제공합니다:
//! - 업종 → 종목 → 통계 수집 파이프라인 (청크, 재시도, 동시성 제한, 중복 제거, 단일 저장 워커)
//! - 작업 실행기 (프로세스 내 실행, HTTP 작업 서비스 위임)
//! - `fetch` / `predict` / `rank` 실행 흐름과 `screener` CLI

pub mod config;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod retry;
pub mod stats;
pub mod workflow;

pub use config::{CollectorConfig, PipelineConfig};
pub use error::{CollectorError, JobError, Result};
pub use executor::{JobExecutor, JobOutcome, LocalExecutor, RemoteExecutor, StageJob, StageOutput};
pub use pipeline::{discover_industries, HarvestReport, Harvester, WorkState};
pub use retry::{DelayWindow, RetryPolicy};
pub use stats::StageStats;
pub use workflow::{RunOutcome, Workflow, EXIT_FAILURE, EXIT_FETCH_FAILURE, EXIT_NOTHING_ELIGIBLE, EXIT_SUCCESS};
