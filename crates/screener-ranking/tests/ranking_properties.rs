//! 랭킹 속성 테스트
//!
//! 경쟁 순위의 동순위 규칙과 엔진 선정 결과의 결정성을 임의 입력에 대해 검증합니다.

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use screener_core::{FieldValue, FundamentalsRow, RankingConfig, TickerRecord};
use screener_ranking::{competition_rank, RankingEngine, SortOrder, TieMethod};

fn decimals(max_len: usize) -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((0i64..40).prop_map(|v| Decimal::new(v, 1)), 0..max_len)
}

fn stock(ticker: String, pe: Decimal, roa: Decimal) -> FundamentalsRow {
    let record = TickerRecord::new(ticker, "Technology", "Application Software");
    let refreshed_at = Utc.with_ymd_and_hms(2012, 4, 15, 0, 0, 0).unwrap();
    FundamentalsRow::for_ticker(&record, refreshed_at)
        .with_field("market_cap", FieldValue::Number(Decimal::new(100_000_000, 0)))
        .with_field("trailing_pe", FieldValue::Number(pe))
        .with_field("roa_ttm", FieldValue::Number(roa))
}

proptest! {
    #[test]
    fn min_rank_counts_strictly_better_values(values in decimals(30)) {
        let ranks = competition_rank(&values, SortOrder::Ascending, TieMethod::Min);

        for (i, value) in values.iter().enumerate() {
            let better = values.iter().filter(|v| *v < value).count() as u32;
            prop_assert_eq!(ranks[i], better + 1);
        }
    }

    #[test]
    fn max_rank_counts_better_or_equal_values(values in decimals(30)) {
        let ranks = competition_rank(&values, SortOrder::Descending, TieMethod::Max);

        for (i, value) in values.iter().enumerate() {
            let better_or_equal = values.iter().filter(|v| *v >= value).count() as u32;
            prop_assert_eq!(ranks[i], better_or_equal);
        }
    }

    #[test]
    fn selection_is_bounded_and_sorted(
        metrics in prop::collection::vec((50i64..300, 20i64..90), 0..40),
        top_n in 1usize..20,
    ) {
        let rows: Vec<FundamentalsRow> = metrics
            .iter()
            .enumerate()
            .map(|(i, (pe, roa))| stock(format!("T{:03}", i), Decimal::new(*pe, 1), Decimal::new(*roa, 2)))
            .collect();

        let config = RankingConfig { top_n, ..Default::default() };
        let engine = RankingEngine::from_config(&config).unwrap();
        let ranked = engine.rank(&rows);

        prop_assert!(ranked.len() <= top_n);
        for pair in ranked.windows(2) {
            prop_assert!((pair[0].pe_rank, pair[0].return_rank) <= (pair[1].pe_rank, pair[1].return_rank));
        }
        for r in &ranked {
            prop_assert!(r.row.decimal("roa_ttm").unwrap() >= Decimal::new(25, 2));
            prop_assert!(r.row.decimal("trailing_pe").unwrap() >= Decimal::new(5, 0));
        }

        let mut reversed = rows.clone();
        reversed.reverse();
        let again = engine.rank(&reversed);
        let first: Vec<&str> = ranked.iter().map(|r| r.symbol()).collect();
        let second: Vec<&str> = again.iter().map(|r| r.symbol()).collect();
        prop_assert_eq!(first, second);
    }
}
