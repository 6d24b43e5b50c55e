//! 랭킹 엔진.
//!
//! 1. 스냅샷을 심볼 순으로 정렬 (도착 순서와 무관한 결정적 결과)
//! 2. 전략의 적격성 필터 적용
//! 3. 적격 레코드에만 순위 부여
//! 4. (pe_rank, return_rank) 오름차순 안정 정렬
//! 5. 상위 N개 선정

use screener_core::{FundamentalsRow, RankedRow, RankingConfig};
use tracing::{debug, info};

use crate::error::{RankingError, RankingResult};
use crate::strategies::{strategy_by_name, RankingStrategy};

/// 스냅샷 랭킹 엔진.
pub struct RankingEngine {
    strategy: Box<dyn RankingStrategy>,
    top_n: usize,
}

impl std::fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RankingEngine")
            .field("strategy", &self.strategy.name())
            .field("top_n", &self.top_n)
            .finish()
    }
}

impl RankingEngine {
    /// 전략과 선정 종목 수로 엔진을 생성합니다.
    pub fn new(strategy: Box<dyn RankingStrategy>, top_n: usize) -> RankingResult<Self> {
        if top_n == 0 {
            return Err(RankingError::InvalidTopN);
        }
        Ok(Self { strategy, top_n })
    }

    /// 설정의 기본 전략으로 엔진을 생성합니다.
    pub fn from_config(config: &RankingConfig) -> RankingResult<Self> {
        Self::with_strategy(&config.strategy, config)
    }

    /// 이름으로 선택한 전략으로 엔진을 생성합니다.
    pub fn with_strategy(name: &str, config: &RankingConfig) -> RankingResult<Self> {
        Self::new(strategy_by_name(name, config)?, config.top_n)
    }

    /// 선정 종목 수를 변경합니다.
    pub fn with_top_n(self, top_n: usize) -> RankingResult<Self> {
        Self::new(self.strategy, top_n)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// 스냅샷 전체를 랭킹해 상위 N개를 반환합니다.
    ///
    /// 적격 종목이 없으면 빈 목록입니다 (에러 아님).
    /// 같은 심볼이 여러 번 있으면 첫 레코드만 사용합니다.
    pub fn rank(&self, rows: &[FundamentalsRow]) -> Vec<RankedRow> {
        let mut snapshot: Vec<FundamentalsRow> = rows.to_vec();
        // 안정 정렬이어야 같은 심볼 중 먼저 들어온 레코드가 앞에 남습니다.
        snapshot.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        snapshot.dedup_by(|later, first| later.ticker == first.ticker);

        let total = snapshot.len();
        let eligible: Vec<FundamentalsRow> = snapshot
            .into_iter()
            .filter(|row| {
                let ok = self.strategy.is_eligible(row);
                if !ok {
                    debug!(ticker = %row.ticker, strategy = self.strategy.name(), "랭킹 대상 아님");
                }
                ok
            })
            .collect();
        let eligible_count = eligible.len();

        let mut ranked = self.strategy.score(eligible);
        ranked.sort_by_key(|r| (r.pe_rank, r.return_rank));
        ranked.truncate(self.top_n);

        info!(
            strategy = self.strategy.name(),
            total,
            eligible = eligible_count,
            selected = ranked.len(),
            "랭킹 완료"
        );

        ranked
    }
}
