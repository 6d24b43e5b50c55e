//! 랭킹 전략.
//!
//! 전략은 두 가지를 결정합니다:
//! 1. 어떤 레코드가 순위 후보인지 (적격성 필터)
//! 2. 적격 레코드에 어떤 순위를 부여하는지
//!
//! 최종 정렬과 상위 N개 선정은 [`RankingEngine`](crate::RankingEngine)이 담당합니다.

mod magic_formula;
mod return_on_capital_yield;

pub use magic_formula::MagicFormula;
pub use return_on_capital_yield::ReturnOnCapitalYield;

use screener_core::{ExclusionConfig, FundamentalsRow, RankedRow, RankingConfig};

use crate::error::{RankingError, RankingResult};

/// Magic Formula 전략 이름
pub const MAGIC_FORMULA: &str = "magic_formula";

/// 자본수익률/배당수익률 전략 이름
pub const RETURN_ON_CAPITAL_YIELD: &str = "return_on_capital_yield";

/// 등록된 전략 이름 목록
pub const STRATEGY_NAMES: [&str; 2] = [MAGIC_FORMULA, RETURN_ON_CAPITAL_YIELD];

/// 통계 컬럼명.
pub(crate) mod columns {
    pub const TRAILING_PE: &str = "trailing_pe";
    pub const RETURN_ON_ASSETS: &str = "roa_ttm";
    pub const MARKET_CAP: &str = "market_cap";
    pub const EBITDA: &str = "ebita_ttm";
    pub const PRICE_TO_BOOK: &str = "price_per_book_mrq";
    pub const DIVIDEND_YIELD: &str = "trailing_annual_div_yield";
}

/// 랭킹 전략 트레이트.
pub trait RankingStrategy: Send + Sync {
    /// 전략 이름 (설정/CLI에서 선택하는 키)
    fn name(&self) -> &'static str;

    /// 레코드가 순위 후보인지 확인합니다.
    fn is_eligible(&self, row: &FundamentalsRow) -> bool;

    /// 적격 레코드 전체에 순위를 부여합니다.
    ///
    /// 반환 순서는 입력 순서와 같습니다. 부적격 레코드가 섞여 있으면 버립니다.
    fn score(&self, eligible: Vec<FundamentalsRow>) -> Vec<RankedRow>;
}

/// 이름으로 전략을 생성합니다.
pub fn strategy_by_name(
    name: &str,
    config: &RankingConfig,
) -> RankingResult<Box<dyn RankingStrategy>> {
    match name {
        MAGIC_FORMULA => Ok(Box::new(MagicFormula::new(config.magic_formula.clone()))),
        RETURN_ON_CAPITAL_YIELD => Ok(Box::new(ReturnOnCapitalYield::new(
            config.return_on_capital_yield.clone(),
        ))),
        other => Err(RankingError::UnknownStrategy {
            name: other.to_string(),
            available: STRATEGY_NAMES.join(", "),
        }),
    }
}

fn is_excluded(exclusions: &ExclusionConfig, row: &FundamentalsRow) -> bool {
    exclusions.excludes(&row.sector, &row.industry, row.description.as_deref())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_by_name() {
        let config = RankingConfig::default();

        assert_eq!(strategy_by_name(MAGIC_FORMULA, &config).unwrap().name(), MAGIC_FORMULA);
        assert_eq!(
            strategy_by_name(RETURN_ON_CAPITAL_YIELD, &config).unwrap().name(),
            RETURN_ON_CAPITAL_YIELD
        );

        match strategy_by_name("greenblatt", &config) {
            Err(RankingError::UnknownStrategy { name, available }) => {
                assert_eq!(name, "greenblatt");
                assert!(available.contains(MAGIC_FORMULA));
            }
            other => panic!("unexpected: {:?}", other.map(|s| s.name())),
        }
    }
}
