//! 수집 파이프라인.
//!
//! ```text
//! 업종 목록 ─▶ [종목 단계] ─▶ 종목 수집기 ─▶ [통계 단계] ─▶ 레코드 수집기
//!                               │                            │
//!                               └──────▶ 영속화 워커 ◀───────┘
//! ```
//!
//! 단계 사이는 용량이 제한된 채널로 연결되어 하류가 밀리면 상류가 대기합니다.
//! 두 단계는 동시에 실행되므로 종목 단계가 끝나기 전에 통계 단계가 시작될 수 있습니다.
//! 저장은 단일 워커가 순서대로 처리합니다.

mod dedup;
mod discovery;
mod sink;
mod stage;
mod state;

pub use dedup::{collect_first_seen, FirstSeen};
pub use discovery::discover_industries;
pub use sink::{PersistCommand, PersistStats};
pub use stage::{Stage, StageLimits};
pub use state::WorkState;

use std::sync::Arc;

use screener_core::{FundamentalsRow, IndustryRef, TickerRecord};
use screener_data::FundamentalsStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, Instrument};

use crate::config::PipelineConfig;
use crate::executor::{JobExecutor, StageJob};
use crate::retry::RetryPolicy;
use crate::stats::StageStats;
use stage::{run_stage, StageContext};

/// 수집 실행 결과.
#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    /// 입력 업종 수
    pub industries: usize,
    /// 중복 제거된 종목 (처음 발견 순)
    pub tickers: Vec<TickerRecord>,
    /// 중복 제거된 통계 레코드
    pub rows: Vec<FundamentalsRow>,
    /// 종목 단계 통계
    pub ticker_stage: StageStats,
    /// 통계 단계 통계
    pub keystats_stage: StageStats,
    /// 저장 통계
    pub persisted: PersistStats,
    /// 취소로 중단되었는지 여부
    pub cancelled: bool,
}

impl HarvestReport {
    /// 레코드를 하나도 얻지 못했고 그 원인이 작업 실패인지 여부.
    ///
    /// 수집이 정상적으로 끝났지만 비어 있는 경우(업종 없음, 빈 페이지)와 구분합니다.
    pub fn collection_failed(&self) -> bool {
        self.rows.is_empty() && (self.ticker_stage.failed > 0 || self.keystats_stage.failed > 0)
    }

    /// 단계별 요약 로그 출력
    pub fn log_summary(&self) {
        self.ticker_stage.log_summary(Stage::Tickers.as_str());
        self.keystats_stage.log_summary(Stage::KeyStats.as_str());
        self.persisted.tickers.log_summary("persist_tickers");
        self.persisted.fundamentals.log_summary("persist_fundamentals");
        info!(
            industries = self.industries,
            tickers = self.tickers.len(),
            rows = self.rows.len(),
            cancelled = self.cancelled,
            "수집 완료"
        );
    }
}

/// 업종 목록에서 시작해 종목과 통계를 수집/저장하는 오케스트레이터.
pub struct Harvester {
    executor: Arc<dyn JobExecutor>,
    store: Arc<dyn FundamentalsStore>,
    config: PipelineConfig,
    retry: RetryPolicy,
    cancel: CancellationToken,
}

impl Harvester {
    pub fn new(
        executor: Arc<dyn JobExecutor>,
        store: Arc<dyn FundamentalsStore>,
        config: PipelineConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            executor,
            store,
            config,
            retry,
            cancel: CancellationToken::new(),
        }
    }

    /// 외부 취소 토큰을 사용합니다.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 실행 취소 토큰
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn context(&self, stage: Stage) -> StageContext {
        StageContext {
            stage,
            executor: self.executor.clone(),
            retry: self.retry,
            jitter: self.config.dispatch_jitter,
            cancel: self.cancel.clone(),
        }
    }

    fn limits(&self, parallelism: usize) -> StageLimits {
        StageLimits {
            parallelism,
            chunk_size: self.config.chunk_size,
            idle_grace: self.config.idle_grace,
        }
    }

    /// 파이프라인을 끝까지 실행합니다.
    ///
    /// 항목별 실패는 통계에만 반영되며 실행 전체를 중단시키지 않습니다.
    pub async fn run(&self, industries: Vec<IndustryRef>) -> HarvestReport {
        let capacity = self.config.channel_capacity.max(1);
        let industry_count = industries.len();

        let (industry_tx, industry_rx) = mpsc::channel(capacity);
        let (ticker_out_tx, ticker_out_rx) = mpsc::channel(capacity);
        let (keystats_tx, keystats_rx) = mpsc::channel(capacity);
        let (row_out_tx, row_out_rx) = mpsc::channel(capacity);
        let (persist_tx, persist_rx) = mpsc::channel(capacity);

        info!(industries = industry_count, "수집 시작");

        let feeder = tokio::spawn(async move {
            for industry in industries {
                if industry_tx.send(StageJob::ListTickers { industry }).await.is_err() {
                    break;
                }
            }
        });

        let ticker_stage = tokio::spawn(
            run_stage(
                self.context(Stage::Tickers),
                industry_rx,
                ticker_out_tx,
                self.limits(self.config.ticker_parallelism),
            )
            .instrument(screener_core::stage_span!(Stage::Tickers)),
        );
        let ticker_collector = tokio::spawn(sink::collect_tickers(
            ticker_out_rx,
            persist_tx.clone(),
            keystats_tx,
        ));
        let keystats_stage = tokio::spawn(
            run_stage(
                self.context(Stage::KeyStats),
                keystats_rx,
                row_out_tx,
                self.limits(self.config.keystats_parallelism),
            )
            .instrument(screener_core::stage_span!(Stage::KeyStats)),
        );
        let row_collector = tokio::spawn(sink::collect_rows(row_out_rx, persist_tx));
        let persister = tokio::spawn(sink::persist_worker(self.store.clone(), persist_rx));

        joined(feeder, "feeder").await;
        let mut ticker_stage = joined(ticker_stage, "ticker_stage").await;
        let (tickers, ticker_duplicates) = joined(ticker_collector, "ticker_collector").await;
        let mut keystats_stage = joined(keystats_stage, "keystats_stage").await;
        let (rows, row_duplicates) = joined(row_collector, "row_collector").await;
        let persisted = joined(persister, "persister").await;

        ticker_stage.duplicates += ticker_duplicates;
        keystats_stage.duplicates += row_duplicates;

        HarvestReport {
            industries: industry_count,
            tickers,
            rows,
            ticker_stage,
            keystats_stage,
            persisted,
            cancelled: self.cancel.is_cancelled(),
        }
    }
}

async fn joined<T: Default>(handle: JoinHandle<T>, task: &str) -> T {
    match handle.await {
        Ok(value) => value,
        Err(e) => {
            error!(task = task, error = %e, "파이프라인 태스크 비정상 종료");
            T::default()
        }
    }
}
