//! # Screener Ranking
//!
//! 수집된 통계 스냅샷에 적격성 필터와 2팩터 순위를 적용해 상위 N개 종목을 선정합니다.
//!
//! - [`competition_rank`]: 동순위 규칙(min/max)을 지원하는 경쟁 순위
//! - [`RankingStrategy`]: 적격성 판단 + 순위 부여 전략
//!   - [`MagicFormula`]: ROA + P/E
//!   - [`ReturnOnCapitalYield`]: 자본수익률 + P/E + 배당수익률
//! - [`RankingEngine`]: 스냅샷 → 필터 → 순위 → 정렬 → 상위 N개
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use screener_ranking::RankingEngine;
//!
//! let engine = RankingEngine::from_config(&config.ranking)?;
//! let top = engine.rank(&rows);
//! ```

pub mod engine;
pub mod error;
pub mod rank;
pub mod strategies;

pub use engine::RankingEngine;
pub use error::{RankingError, RankingResult};
pub use rank::{competition_rank, SortOrder, TieMethod};
pub use strategies::{
    strategy_by_name, MagicFormula, RankingStrategy, ReturnOnCapitalYield, MAGIC_FORMULA,
    RETURN_ON_CAPITAL_YIELD, STRATEGY_NAMES,
};
