//! 작업 실행기.
//!
//! 파이프라인은 작업을 어디서 실행하는지 알지 못합니다. 작업 묶음(청크)을 [`JobExecutor`]에
//! 넘기고 작업별 결과를 같은 순서로 돌려받습니다.
//!
//! - [`LocalExecutor`]: 현재 프로세스에서 조회/추출
//! - [`RemoteExecutor`]: HTTP 작업 서비스에 청크를 위임

mod local;
mod remote;

pub use local::LocalExecutor;
pub use remote::RemoteExecutor;

use async_trait::async_trait;
use screener_core::{FundamentalsRow, IndustryRef, TickerRecord};
use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// 파이프라인 작업.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageJob {
    /// 업종 페이지에서 종목 목록 추출
    ListTickers { industry: IndustryRef },
    /// 종목 통계 페이지에서 통계 레코드 추출
    FetchKeyStats { ticker: TickerRecord },
}

impl StageJob {
    /// 로그/중복 제거용 키 (업종 ID 또는 심볼)
    pub fn key(&self) -> String {
        match self {
            Self::ListTickers { industry } => industry.id.to_string(),
            Self::FetchKeyStats { ticker } => ticker.symbol.clone(),
        }
    }
}

/// 작업 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum StageOutput {
    /// 업종에서 발견한 종목 (빈 업종이면 빈 목록)
    Tickers(Vec<TickerRecord>),
    /// 종목 통계 레코드
    Fundamentals(FundamentalsRow),
}

/// 작업 하나의 결과.
pub type JobOutcome = Result<StageOutput, JobError>;

/// 작업 실행기 trait.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// 작업 묶음을 실행합니다.
    ///
    /// 반환 목록은 `jobs`와 길이와 순서가 같아야 합니다.
    /// 묶음 전체가 실패하면(전송 실패 등) `Err`를 반환하며, 재시도 대상이면 묶음 전체를 다시 실행합니다.
    async fn execute(&self, jobs: Vec<StageJob>) -> Result<Vec<JobOutcome>, JobError>;

    /// 실행기 이름
    fn name(&self) -> &str;
}
