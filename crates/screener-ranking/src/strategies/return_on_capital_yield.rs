//! 자본수익률 + 배당수익률 전략.
//!
//! 자본수익률(ROC) = EBITDA ÷ (시가총액 ÷ P/B), 즉 EBITDA ÷ 장부가치.
//!
//! # 적격성
//!
//! - 시가총액 ≥ `min_market_cap` (기본 5천만)
//! - `min_pe` < P/E < `max_pe` (기본 5, 25)
//! - 배당수익률 > `min_dividend_yield` (기본 0.06)
//! - ROC > 0
//! - 섹터/업종/설명이 제외 규칙에 걸리지 않음
//!
//! # 순위
//!
//! - P/E 오름차순, 동순위는 최소 순위
//! - ROC, 배당수익률 내림차순, 동순위는 최대 순위

use rust_decimal::Decimal;
use screener_core::{FundamentalsRow, RankedRow, ReturnOnCapitalYieldConfig};

use super::{columns, is_excluded, RankingStrategy, RETURN_ON_CAPITAL_YIELD};
use crate::rank::{competition_rank, SortOrder, TieMethod};

/// 자본수익률/배당수익률 전략.
#[derive(Debug, Clone, Default)]
pub struct ReturnOnCapitalYield {
    config: ReturnOnCapitalYieldConfig,
}

struct Metrics {
    pe: Decimal,
    roc: Decimal,
    dividend_yield: Decimal,
}

impl ReturnOnCapitalYield {
    pub fn new(config: ReturnOnCapitalYieldConfig) -> Self {
        Self { config }
    }

    fn metrics(&self, row: &FundamentalsRow) -> Option<Metrics> {
        let market_cap = row.decimal(columns::MARKET_CAP)?;
        let pe = row.decimal(columns::TRAILING_PE)?;
        let dividend_yield = row.decimal(columns::DIVIDEND_YIELD)?;
        let roc = return_on_capital(row)?;

        let eligible = market_cap >= self.config.min_market_cap
            && pe > self.config.min_pe
            && pe < self.config.max_pe
            && dividend_yield > self.config.min_dividend_yield
            && roc > Decimal::ZERO
            && !is_excluded(&self.config.exclusions, row);

        eligible.then_some(Metrics {
            pe,
            roc,
            dividend_yield,
        })
    }
}

/// EBITDA ÷ (시가총액 ÷ P/B). 0으로 나누게 되면 None.
fn return_on_capital(row: &FundamentalsRow) -> Option<Decimal> {
    let ebitda = row.decimal(columns::EBITDA)?;
    let market_cap = row.decimal(columns::MARKET_CAP)?;
    let price_to_book = row.decimal(columns::PRICE_TO_BOOK)?;

    let book_value = market_cap.checked_div(price_to_book)?;
    ebitda.checked_div(book_value)
}

impl RankingStrategy for ReturnOnCapitalYield {
    fn name(&self) -> &'static str {
        RETURN_ON_CAPITAL_YIELD
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
        let roc: Vec<Decimal> = scored.iter().map(|(_, m)| m.roc).collect();
        let yields: Vec<Decimal> = scored.iter().map(|(_, m)| m.dividend_yield).collect();

        let pe_ranks = competition_rank(&pe, SortOrder::Ascending, TieMethod::Min);
        let roc_ranks = competition_rank(&roc, SortOrder::Descending, TieMethod::Max);
        let yield_ranks = competition_rank(&yields, SortOrder::Descending, TieMethod::Max);

        scored
            .into_iter()
            .enumerate()
            .map(|(i, (row, _))| RankedRow {
                row,
                pe_rank: pe_ranks[i],
                return_rank: roc_ranks[i],
                yield_rank: Some(yield_ranks[i]),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::test_support::row;
    use rust_decimal_macros::dec;

    fn stock(ticker: &str, pe: Decimal, ebitda: Decimal, dividend_yield: Decimal) -> FundamentalsRow {
        row(
            ticker,
            &[
                (columns::MARKET_CAP, dec!(1000000000)),
                (columns::PRICE_TO_BOOK, dec!(2)),
                (columns::TRAILING_PE, pe),
                (columns::EBITDA, ebitda),
                (columns::DIVIDEND_YIELD, dividend_yield),
            ],
        )
    }

    #[test]
    fn test_return_on_capital() {
        // 장부가치 = 10억 / 2 = 5억, ROC = 1억 / 5억
        let r = stock("ROC", dec!(10), dec!(100000000), dec!(0.07));
        assert_eq!(return_on_capital(&r), Some(dec!(0.2)));

        let zero_pb = r.with_field(columns::PRICE_TO_BOOK, screener_core::FieldValue::Number(dec!(0)));
        assert_eq!(return_on_capital(&zero_pb), None);
    }

    #[test]
    fn test_eligibility_bounds_are_exclusive() {
        let strategy = ReturnOnCapitalYield::default();

        assert!(strategy.is_eligible(&stock("OK", dec!(10), dec!(100000000), dec!(0.07))));
        assert!(!strategy.is_eligible(&stock("PE5", dec!(5), dec!(100000000), dec!(0.07))));
        assert!(!strategy.is_eligible(&stock("PE25", dec!(25), dec!(100000000), dec!(0.07))));
        assert!(!strategy.is_eligible(&stock("YLD", dec!(10), dec!(100000000), dec!(0.06))));
        assert!(!strategy.is_eligible(&stock("LOSS", dec!(10), dec!(-100000000), dec!(0.07))));
    }

    #[test]
    fn test_banned_description() {
        let strategy = ReturnOnCapitalYield::default();
        let mut adr = stock("TEF", dec!(10), dec!(100000000), dec!(0.07));
        adr.description = Some("Telefonica S.A.".to_string());

        assert!(!strategy.is_eligible(&adr));
    }

    #[test]
    fn test_score_uses_max_ties_for_return() {
        let strategy = ReturnOnCapitalYield::default();
        let rows = vec![
            stock("A", dec!(8), dec!(100000000), dec!(0.08)),
            stock("B", dec!(12), dec!(100000000), dec!(0.07)),
            stock("C", dec!(8), dec!(50000000), dec!(0.08)),
        ];

        let ranked = strategy.score(rows);
        let ranks: Vec<(&str, u32, u32, Option<u32>)> = ranked
            .iter()
            .map(|r| (r.symbol(), r.pe_rank, r.return_rank, r.yield_rank))
            .collect();

        assert_eq!(
            ranks,
            vec![("A", 1, 2, Some(2)), ("B", 3, 2, Some(3)), ("C", 1, 3, Some(2))]
        );
    }
}
