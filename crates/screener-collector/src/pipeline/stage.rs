//! 청크 단위 단계 실행.
//!
//! 입력 채널에서 작업을 모아 청크를 만들고, 세마포어로 동시 실행 수를 제한하며
//! 실행기에 넘깁니다. 재시도 대상 실패는 무작위 대기 후 같은 청크 안에서 다시 실행합니다.
//!
//! 세마포어 슬롯은 실행기 호출 동안에만 잡습니다. 분산 대기와 재시도 대기 중인 청크는
//! 슬롯을 쓰지 않습니다.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Semaphore, SemaphorePermit};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::WorkState;
use crate::error::JobError;
use crate::executor::{JobExecutor, JobOutcome, StageJob, StageOutput};
use crate::retry::{sleep_or_cancel, DelayWindow, RetryPolicy};
use crate::stats::StageStats;

/// 파이프라인 단계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// 업종 → 종목 목록
    Tickers,
    /// 종목 → 통계 레코드
    KeyStats,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tickers => "tickers",
            Self::KeyStats => "keystats",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 단계 실행 한도.
#[derive(Debug, Clone, Copy)]
pub struct StageLimits {
    pub parallelism: usize,
    pub chunk_size: usize,
    pub idle_grace: Duration,
}

/// 청크 태스크가 공유하는 실행 컨텍스트.
#[derive(Clone)]
pub struct StageContext {
    pub stage: Stage,
    pub executor: Arc<dyn JobExecutor>,
    pub retry: RetryPolicy,
    pub jitter: DelayWindow,
    pub cancel: CancellationToken,
}

/// 입력 채널이 닫히고 실행 중인 청크가 모두 끝날 때까지 단계를 실행합니다.
///
/// 청크가 다 차지 않아도 `idle_grace` 동안 새 작업이 없으면 모인 작업을 내보냅니다.
/// 취소되면 새 청크를 만들지 않고 실행 중인 청크만 마칩니다.
pub async fn run_stage(
    ctx: StageContext,
    mut input: mpsc::Receiver<StageJob>,
    output: mpsc::Sender<StageOutput>,
    limits: StageLimits,
) -> StageStats {
    let started = Instant::now();
    let chunk_size = limits.chunk_size.max(1);
    let semaphore = Arc::new(Semaphore::new(limits.parallelism.max(1)));
    let mut tasks: JoinSet<StageStats> = JoinSet::new();
    let mut stats = StageStats::new();
    let mut pending: Vec<StageJob> = Vec::with_capacity(chunk_size);
    let mut open = true;

    info!(
        stage = %ctx.stage,
        executor = ctx.executor.name(),
        parallelism = limits.parallelism,
        chunk_size = chunk_size,
        "단계 시작"
    );

    loop {
        if open && pending.len() < chunk_size {
            tokio::select! {
                biased;
                _ = ctx.cancel.cancelled() => {
                    warn!(stage = %ctx.stage, queued = pending.len(), "취소 요청, 새 작업 수신 중단");
                    open = false;
                    for _ in pending.drain(..) {
                        stats.record(&WorkState::Queued.fail(JobError::Cancelled.to_string()));
                    }
                    continue;
                }
                received = tokio::time::timeout(limits.idle_grace, input.recv()) => match received {
                    Ok(Some(job)) => {
                        pending.push(job);
                        continue;
                    }
                    Ok(None) => open = false,
                    Err(_) if pending.is_empty() => continue,
                    Err(_) => {}
                },
            }
        }

        if pending.is_empty() {
            if open {
                continue;
            }
            break;
        }

        let take = pending.len().min(chunk_size);
        let chunk: Vec<StageJob> = pending.drain(..take).collect();

        let chunk_ctx = ctx.clone();
        let chunk_output = output.clone();
        let slots = semaphore.clone();
        tasks.spawn(async move { run_chunk(&chunk_ctx, chunk, &chunk_output, &slots).await });

        while let Some(joined) = tasks.try_join_next() {
            absorb(&mut stats, joined, ctx.stage);
        }
    }

    // 더 받을 작업이 없으므로 상류 송신자를 즉시 실패시킵니다.
    drop(input);
    drop(output);

    while let Some(joined) = tasks.join_next().await {
        absorb(&mut stats, joined, ctx.stage);
    }

    stats.elapsed = started.elapsed();
    stats
}

fn absorb(
    stats: &mut StageStats,
    joined: Result<StageStats, tokio::task::JoinError>,
    stage: Stage,
) {
    match joined {
        Ok(chunk_stats) => stats.merge(&chunk_stats),
        Err(e) => error!(stage = %stage, error = %e, "청크 태스크 비정상 종료"),
    }
}

struct Tracked {
    job: StageJob,
    state: WorkState,
}

/// 청크 하나를 실행합니다. 재시도 대상 실패만 모아 다시 실행합니다.
///
/// 분산 대기 후 `slots`에서 슬롯을 얻어 실행기를 호출하고, 호출이 끝나면 바로 반납합니다.
pub async fn run_chunk(
    ctx: &StageContext,
    jobs: Vec<StageJob>,
    output: &mpsc::Sender<StageOutput>,
    slots: &Semaphore,
) -> StageStats {
    let mut stats = StageStats::new();
    let mut pending: Vec<Tracked> = jobs
        .into_iter()
        .map(|job| Tracked {
            job,
            state: WorkState::Queued,
        })
        .collect();

    if !sleep_or_cancel(ctx.jitter.sample(), &ctx.cancel).await {
        for tracked in pending {
            stats.record(&tracked.state.fail(JobError::Cancelled.to_string()));
        }
        return stats;
    }

    while !pending.is_empty() {
        let Some(permit) = acquire_slot(ctx, slots).await else {
            for tracked in pending {
                stats.record(&tracked.state.fail(JobError::Cancelled.to_string()));
            }
            return stats;
        };

        for tracked in pending.iter_mut() {
            tracked.state = std::mem::replace(&mut tracked.state, WorkState::Queued).begin_attempt();
        }

        let outcomes = execute(ctx, &pending).await;
        drop(permit);
        let mut retry = Vec::new();

        for (mut tracked, outcome) in pending.into_iter().zip(outcomes) {
            let key = tracked.job.key();
            let state = std::mem::replace(&mut tracked.state, WorkState::Queued);

            match outcome {
                Ok(result) => {
                    let empty = matches!(&result, StageOutput::Tickers(tickers) if tickers.is_empty());
                    let state = state.extracted(empty);
                    let state = if output.send(result).await.is_ok() {
                        state.complete()
                    } else {
                        state.fail("출력 채널 닫힘")
                    };
                    stats.record(&state);
                }
                Err(JobError::Extraction(detail)) => {
                    warn!(stage = %ctx.stage, key = %key, detail = %detail, "페이지 구조 불일치, 빈 결과로 처리");
                    stats.record(&state.extracted(true).complete());
                }
                Err(err) if ctx.retry.should_retry(state.attempts(), &err) => {
                    warn!(
                        stage = %ctx.stage,
                        key = %key,
                        attempt = state.attempts(),
                        error = %err,
                        "일시적 실패, 재시도 예정"
                    );
                    tracked.state = state;
                    retry.push(tracked);
                }
                Err(err) => {
                    warn!(
                        stage = %ctx.stage,
                        key = %key,
                        attempts = state.attempts(),
                        error = %err,
                        "작업 실패, 이번 실행에서 제외"
                    );
                    stats.record(&state.fail(err.to_string()));
                }
            }
        }

        if retry.is_empty() {
            break;
        }

        if !sleep_or_cancel(ctx.retry.next_delay(), &ctx.cancel).await {
            for tracked in retry {
                stats.record(&tracked.state.fail(JobError::Cancelled.to_string()));
            }
            break;
        }
        pending = retry;
    }

    stats
}

/// 실행 슬롯을 기다립니다. 취소되거나 세마포어가 닫히면 `None`.
async fn acquire_slot<'a>(ctx: &StageContext, slots: &'a Semaphore) -> Option<SemaphorePermit<'a>> {
    tokio::select! {
        biased;
        _ = ctx.cancel.cancelled() => {
            debug!(stage = %ctx.stage, "취소 요청, 슬롯 대기 중단");
            None
        }
        permit = slots.acquire() => permit.ok(),
    }
}

/// 실행기 호출. 청크 전체 실패나 결과 개수 불일치는 작업별 실패로 펼칩니다.
async fn execute(ctx: &StageContext, pending: &[Tracked]) -> Vec<JobOutcome> {
    let jobs: Vec<StageJob> = pending.iter().map(|t| t.job.clone()).collect();
    let count = jobs.len();

    match ctx.executor.execute(jobs).await {
        Ok(outcomes) if outcomes.len() == count => outcomes,
        Ok(outcomes) => {
            let err = JobError::Transient(format!(
                "결과 개수 불일치: 요청 {}, 응답 {}",
                count,
                outcomes.len()
            ));
            vec![Err(err); count]
        }
        Err(err) => {
            debug!(stage = %ctx.stage, count = count, error = %err, "청크 실행 실패");
            vec![Err(err); count]
        }
    }
}
