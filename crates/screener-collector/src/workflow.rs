//! 명령 단위 실행 흐름.
//!
//! - `fetch`: 업종 탐색 → 수집/저장
//! - `predict`: 수집/저장 → 랭킹 → 발행
//! - `rank`: 저장된 스냅샷 → 랭킹 → 발행

use std::sync::Arc;

use screener_core::{FundamentalsRow, ScreenerConfig};
use screener_data::{DocumentFetcher, FundamentalsStore};
use screener_notification::{publish_selection, MessagePublisher};
use screener_ranking::RankingEngine;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::CollectorConfig;
use crate::error::{CollectorError, Result};
use crate::executor::JobExecutor;
use crate::pipeline::{discover_industries, HarvestReport, Harvester};

/// 성공 종료 코드
pub const EXIT_SUCCESS: i32 = 0;
/// 발행 실패 또는 수집 불가
pub const EXIT_FAILURE: i32 = 1;
/// 적격 종목 없음 (발행하지 않음)
pub const EXIT_NOTHING_ELIGIBLE: i32 = 2;
/// `fetch` 명령의 예기치 못한 내부 실패
pub const EXIT_FETCH_FAILURE: i32 = 69;

/// 랭킹/발행 명령 결과.
#[derive(Debug)]
pub enum RunOutcome {
    /// 발행 완료
    Published {
        message: String,
        ranked: Vec<String>,
    },
    /// 적격 종목이 없어 발행하지 않음
    NothingEligible,
    /// 수집 불가, 저장소 오류, 발행 실패
    Failed(CollectorError),
}

impl RunOutcome {
    /// 프로세스 종료 코드
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Published { .. } => EXIT_SUCCESS,
            Self::NothingEligible => EXIT_NOTHING_ELIGIBLE,
            Self::Failed(_) => EXIT_FAILURE,
        }
    }
}

/// 수집, 랭킹, 발행을 묶는 실행기.
pub struct Workflow {
    settings: ScreenerConfig,
    collector: CollectorConfig,
    fetcher: Arc<dyn DocumentFetcher>,
    executor: Arc<dyn JobExecutor>,
    store: Arc<dyn FundamentalsStore>,
    cancel: CancellationToken,
}

impl Workflow {
    pub fn new(
        settings: ScreenerConfig,
        collector: CollectorConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        executor: Arc<dyn JobExecutor>,
        store: Arc<dyn FundamentalsStore>,
    ) -> Self {
        Self {
            settings,
            collector,
            fetcher,
            executor,
            store,
            cancel: CancellationToken::new(),
        }
    }

    /// 외부 취소 토큰을 사용합니다.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 업종을 탐색하고 종목/통계를 수집해 저장합니다.
    ///
    /// 취소되면 부분 결과를 버리고 [`CollectorError::Cancelled`]를 반환합니다.
    /// 작업 실패로 레코드를 하나도 얻지 못하면 [`CollectorError::Collection`]을 반환합니다.
    pub async fn harvest(&self) -> Result<HarvestReport> {
        let industries = discover_industries(
            self.fetcher.as_ref(),
            &self.settings.source,
            &self.settings.discovery,
            &self.collector.retry,
            &self.cancel,
        )
        .await?;

        let harvester = Harvester::new(
            self.executor.clone(),
            self.store.clone(),
            self.collector.pipeline.clone(),
            self.collector.retry,
        )
        .with_cancellation(self.cancel.clone());

        let report = harvester.run(industries).await;
        report.log_summary();

        if report.cancelled {
            warn!("수집이 취소되어 결과를 사용하지 않음");
            return Err(CollectorError::Cancelled);
        }
        if report.collection_failed() {
            return Err(CollectorError::Collection(format!(
                "수집된 레코드 없음: 종목 단계 실패 {}, 통계 단계 실패 {}",
                report.ticker_stage.failed, report.keystats_stage.failed
            )));
        }
        Ok(report)
    }

    /// 수집한 스냅샷을 랭킹하고 발행합니다.
    pub async fn predict(
        &self,
        engine: &RankingEngine,
        publisher: &dyn MessagePublisher,
    ) -> RunOutcome {
        match self.harvest().await {
            Ok(report) => self.select_and_publish(&report.rows, engine, publisher).await,
            Err(e) => {
                error!(error = %e, "수집 실패");
                RunOutcome::Failed(e)
            }
        }
    }

    /// 저장소의 스냅샷을 랭킹하고 발행합니다.
    pub async fn rank_persisted(
        &self,
        engine: &RankingEngine,
        publisher: &dyn MessagePublisher,
    ) -> RunOutcome {
        match self.store.load_fundamentals().await {
            Ok(rows) => {
                info!(rows = rows.len(), "저장된 스냅샷 로드");
                self.select_and_publish(&rows, engine, publisher).await
            }
            Err(e) => {
                error!(error = %e, "스냅샷 로드 실패");
                RunOutcome::Failed(e.into())
            }
        }
    }

    /// 랭킹 상위 종목을 발행합니다. 적격 종목이 없으면 발행하지 않습니다.
    pub async fn select_and_publish(
        &self,
        rows: &[FundamentalsRow],
        engine: &RankingEngine,
        publisher: &dyn MessagePublisher,
    ) -> RunOutcome {
        let ranked = engine.rank(rows);
        if ranked.is_empty() {
            info!(strategy = engine.strategy_name(), rows = rows.len(), "적격 종목 없음, 발행 생략");
            return RunOutcome::NothingEligible;
        }

        let symbols: Vec<String> = ranked.iter().map(|r| r.symbol().to_string()).collect();
        match publish_selection(publisher, &self.settings.publish, &symbols).await {
            Ok(message) => RunOutcome::Published {
                message,
                ranked: symbols,
            },
            Err(e) => {
                error!(channel = publisher.name(), error = %e, "발행 실패");
                RunOutcome::Failed(e.into())
            }
        }
    }
}
