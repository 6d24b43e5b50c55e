//! 단계 결과 수집과 단일 영속화 워커.

use std::sync::Arc;

use screener_core::{FundamentalsRow, TickerRecord};
use screener_data::FundamentalsStore;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::dedup::FirstSeen;
use super::WorkState;
use crate::executor::{StageJob, StageOutput};
use crate::stats::StageStats;

/// 영속화 워커로 보내는 쓰기 명령.
#[derive(Debug)]
pub enum PersistCommand {
    /// 종목 차원 upsert
    Tickers(Vec<TickerRecord>),
    /// 통계 레코드 upsert
    Fundamentals(Box<FundamentalsRow>),
}

/// 영속화 결과 통계
#[derive(Debug, Clone, Default)]
pub struct PersistStats {
    pub tickers: StageStats,
    pub fundamentals: StageStats,
}

/// 종목 목록 결과를 심볼 기준으로 중복 제거합니다.
///
/// 새 종목은 통계 단계로 넘기기 전에 먼저 영속화 큐에 넣습니다
/// (통계 upsert가 종목 행을 참조하므로).
pub async fn collect_tickers(
    mut results: mpsc::Receiver<StageOutput>,
    persist: mpsc::Sender<PersistCommand>,
    next: mpsc::Sender<StageJob>,
) -> (Vec<TickerRecord>, usize) {
    let mut seen = FirstSeen::new();
    let mut discovered = Vec::new();
    let mut forwarding = true;

    while let Some(output) = results.recv().await {
        let StageOutput::Tickers(tickers) = output else {
            warn!("종목 단계에서 예상하지 못한 결과");
            continue;
        };

        let fresh: Vec<TickerRecord> = tickers
            .into_iter()
            .filter(|ticker| {
                let new = seen.insert(ticker.symbol.clone());
                if !new {
                    debug!(ticker = %ticker.symbol, industry = %ticker.industry, "중복 종목 무시");
                }
                new
            })
            .collect();
        if fresh.is_empty() {
            continue;
        }

        if persist.send(PersistCommand::Tickers(fresh.clone())).await.is_err() {
            error!("영속화 워커가 종료되어 종목을 저장하지 못함");
        }

        for ticker in &fresh {
            if !forwarding {
                break;
            }
            let job = StageJob::FetchKeyStats {
                ticker: ticker.clone(),
            };
            if next.send(job).await.is_err() {
                warn!("통계 단계가 종료되어 종목 전달 중단");
                forwarding = false;
            }
        }

        discovered.extend(fresh);
    }

    (discovered, seen.duplicates())
}

/// 통계 레코드를 종목 기준으로 중복 제거하고 영속화 큐에 넣습니다.
pub async fn collect_rows(
    mut results: mpsc::Receiver<StageOutput>,
    persist: mpsc::Sender<PersistCommand>,
) -> (Vec<FundamentalsRow>, usize) {
    let mut seen = FirstSeen::new();
    let mut rows = Vec::new();

    while let Some(output) = results.recv().await {
        let StageOutput::Fundamentals(row) = output else {
            warn!("통계 단계에서 예상하지 못한 결과");
            continue;
        };

        if !seen.insert(row.ticker.clone()) {
            debug!(ticker = %row.ticker, "중복 통계 레코드 무시");
            continue;
        }

        if persist
            .send(PersistCommand::Fundamentals(Box::new(row.clone())))
            .await
            .is_err()
        {
            error!(ticker = %row.ticker, "영속화 워커가 종료되어 통계를 저장하지 못함");
        }
        rows.push(row);
    }

    (rows, seen.duplicates())
}

/// 모든 쓰기를 순서대로 처리하는 단일 워커.
///
/// 쓰기 실패는 해당 항목에만 영향을 주며 다음 명령은 계속 처리합니다.
pub async fn persist_worker(
    store: Arc<dyn FundamentalsStore>,
    mut commands: mpsc::Receiver<PersistCommand>,
) -> PersistStats {
    let mut stats = PersistStats::default();

    while let Some(command) = commands.recv().await {
        match command {
            PersistCommand::Tickers(batch) => match store.upsert_tickers(&batch).await {
                Ok(written) => {
                    debug!(count = written, "종목 저장");
                    for _ in &batch {
                        stats.tickers.record(&written_state());
                    }
                }
                Err(e) => {
                    error!(count = batch.len(), error = %e, "종목 저장 실패");
                    for _ in &batch {
                        stats.tickers.record(&failed_state(&e));
                    }
                }
            },
            PersistCommand::Fundamentals(row) => match store.upsert_fundamentals(&row).await {
                Ok(()) => stats.fundamentals.record(&written_state()),
                Err(e) => {
                    warn!(ticker = %row.ticker, error = %e, "통계 저장 실패");
                    stats.fundamentals.record(&failed_state(&e));
                }
            },
        }
    }

    stats
}

fn written_state() -> WorkState {
    WorkState::Done {
        attempts: 1,
        empty: false,
    }
}

fn failed_state(error: &impl std::fmt::Display) -> WorkState {
    WorkState::Failed {
        attempts: 1,
        reason: error.to_string(),
    }
}
