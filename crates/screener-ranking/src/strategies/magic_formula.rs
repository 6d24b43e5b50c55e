//! Magic Formula (ROA + P/E).
//!
//! # 적격성
//!
//! - ROA ≥ `min_return_on_assets` (기본 0.25)
//! - P/E ≥ `min_pe` (기본 5), 항상 > 0
//! - 시가총액 ≥ `min_market_cap` (기본 3천만)
//! - 섹터/업종/설명이 제외 규칙에 걸리지 않음
//!
//! # 순위
//!
//! - P/E 오름차순, 동순위는 최소 순위
//! - ROA 내림차순, 동순위는 최소 순위

use rust_decimal::Decimal;
use screener_core::{FundamentalsRow, MagicFormulaConfig, RankedRow};

use super::{columns, is_excluded, RankingStrategy, MAGIC_FORMULA};
use crate::rank::{competition_rank, SortOrder, TieMethod};

/// Magic Formula 전략.
#[derive(Debug, Clone, Default)]
pub struct MagicFormula {
    config: MagicFormulaConfig,
}

struct Metrics {
    pe: Decimal,
    roa: Decimal,
}

impl MagicFormula {
    pub fn new(config: MagicFormulaConfig) -> Self {
        Self { config }
    }

    fn metrics(&self, row: &FundamentalsRow) -> Option<Metrics> {
        let pe = row.decimal(columns::TRAILING_PE)?;
        let roa = row.decimal(columns::RETURN_ON_ASSETS)?;
        let market_cap = row.decimal(columns::MARKET_CAP)?;

        let eligible = roa >= self.config.min_return_on_assets
            && pe >= self.config.min_pe
            && pe > Decimal::ZERO
            && market_cap >= self.config.min_market_cap
            && !is_excluded(&self.config.exclusions, row);

        eligible.then_some(Metrics { pe, roa })
    }
}

impl RankingStrategy for MagicFormula {
    fn name(&self) -> &'static str {
        MAGIC_FORMULA
    }

    fn is_eligible(&self, row: &FundamentalsRow) -> bool {
        self.metrics(row).is_some()
    }

    fn score(&self, eligible: Vec<FundamentalsRow>) -> Vec<RankedRow> {
        let scored: Vec<(FundamentalsRow, Metrics)> = eligible
            .into_iter()
            .filter_map(|row| self.metrics(&row).map(|m| (row, m)))
            .collect();

        let pe: Vec<Decimal> = scored.iter().map(|(_, m)| m.pe).collect();
        let roa: Vec<Decimal> = scored.iter().map(|(_, m)| m.roa).collect();
        let pe_ranks = competition_rank(&pe, SortOrder::Ascending, TieMethod::Min);
        let roa_ranks = competition_rank(&roa, SortOrder::Descending, TieMethod::Min);

        scored
            .into_iter()
            .zip(pe_ranks.into_iter().zip(roa_ranks))
            .map(|((row, _), (pe_rank, return_rank))| RankedRow {
                row,
                pe_rank,
                return_rank,
                yield_rank: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::row;
    use rust_decimal_macros::dec;
    use screener_core::FieldValue;

    fn stock(ticker: &str, cap: Decimal, pe: Decimal, roa: Decimal) -> FundamentalsRow {
        row(
            ticker,
            &[
                (columns::MARKET_CAP, cap),
                (columns::TRAILING_PE, pe),
                (columns::RETURN_ON_ASSETS, roa),
            ],
        )
    }

    #[test]
    fn test_market_cap_floor() {
        let strategy = MagicFormula::default();

        let a = stock("A", dec!(10000000), dec!(6), dec!(0.3));
        let b = stock("B", dec!(40000000), dec!(6), dec!(0.3));

        assert!(!strategy.is_eligible(&a));
        assert!(strategy.is_eligible(&b));
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let strategy = MagicFormula::default();

        assert!(strategy.is_eligible(&stock("EDGE", dec!(30000000), dec!(5), dec!(0.25))));
        assert!(!strategy.is_eligible(&stock("LOWPE", dec!(90000000), dec!(4.99), dec!(0.4))));
        assert!(!strategy.is_eligible(&stock("LOWROA", dec!(90000000), dec!(8), dec!(0.2499))));
    }

    #[test]
    fn test_missing_or_text_fields_are_ineligible() {
        let strategy = MagicFormula::default();

        let missing = row("MISS", &[(columns::MARKET_CAP, dec!(90000000)), (columns::TRAILING_PE, dec!(8))]);
        assert!(!strategy.is_eligible(&missing));

        let text = stock("TEXT", dec!(90000000), dec!(8), dec!(0.3))
            .with_field(columns::TRAILING_PE, FieldValue::Text("NM".into()));
        assert!(!strategy.is_eligible(&text));
    }

    #[test]
    fn test_excluded_industry() {
        let strategy = MagicFormula::default();
        let mut bank = stock("BANK", dec!(90000000), dec!(8), dec!(0.3));
        bank.industry = "Money Center Banks".to_string();

        assert!(!strategy.is_eligible(&bank));
    }

    #[test]
    fn test_score_ranks() {
        let strategy = MagicFormula::default();
        let rows = vec![
            stock("A", dec!(90000000), dec!(5), dec!(0.30)),
            stock("B", dec!(90000000), dec!(5), dec!(0.50)),
            stock("C", dec!(90000000), dec!(7), dec!(0.30)),
        ];

        let ranked = strategy.score(rows);
        let ranks: Vec<(&str, u32, u32)> = ranked
            .iter()
            .map(|r| (r.symbol(), r.pe_rank, r.return_rank))
            .collect();

        assert_eq!(ranks, vec![("A", 1, 2), ("B", 1, 1), ("C", 3, 2)]);
    }
}
