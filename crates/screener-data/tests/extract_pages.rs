//! 페이지 추출 통합 테스트
//!
//! 실제 페이지 형태의 고정 문서를 StaticFetcher로 조회해 추출 결과를 검증합니다.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;
use screener_core::{DiscoveryConfig, FieldCatalog, FieldValue, IndustryRef, SourceConfig};
use screener_data::{
    build_fundamentals_row, extract_industries, extract_key_stats, extract_tickers,
    DocumentFetcher, FundamentalsStore, InMemoryStore, StaticFetcher,
};

const DIRECTORY: &str = include_str!("fixtures/directory.html");
const INDUSTRY_112: &str = include_str!("fixtures/industry_112.html");
const KEYSTATS_CF: &str = include_str!("fixtures/keystats_cf.html");

fn fetcher(source: &SourceConfig) -> StaticFetcher {
    StaticFetcher::new()
        .with_page(source.directory_url.clone(), DIRECTORY)
        .with_page(source.industry_url(112), INDUSTRY_112)
        .with_page(source.keystats_url("CF"), KEYSTATS_CF)
}

#[tokio::test]
async fn test_directory_to_statistics() {
    let source = SourceConfig::default();
    let fetcher = fetcher(&source);

    // 1. 업종 목록
    let directory = fetcher.fetch(&source.directory_url).await.unwrap();
    let industries = extract_industries(&directory, &DiscoveryConfig::default()).unwrap();
    assert_eq!(
        industries,
        vec![
            IndustryRef::new(112, "Agricultural Chemicals", "Basic Materials"),
            IndustryRef::new(130, "Gold", "Basic Materials"),
            IndustryRef::new(821, "Business Software & Services", "Technology"),
        ]
    );

    // 2. 종목 목록
    let page = fetcher.fetch(&source.industry_url(112)).await.unwrap();
    let tickers = extract_tickers(&page, &industries[0]).unwrap();
    let symbols: Vec<&str> = tickers.iter().map(|t| t.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AGU", "CF"]);

    let cf = &tickers[1];
    assert_eq!(cf.description.as_deref(), Some("CF Industries Holdings, Inc."));
    assert_eq!(cf.industry, "Agricultural Chemicals");
    assert_eq!(cf.sector_metrics.get("market_cap"), Some(&dec!(3028700000000)));
    assert_eq!(cf.sector_metrics.get("roe_ttm"), Some(&dec!(0.1749)));
    assert_eq!(cf.industry_metrics.get("trailing_pe"), Some(&dec!(16.7)));
    assert!(!cf.industry_metrics.contains_key("debt_to_equity_mrq"));

    // 3. 종목 통계
    let page = fetcher.fetch(&source.keystats_url("CF")).await.unwrap();
    let stats = extract_key_stats(&page).unwrap();
    assert_eq!(stats.len(), 25);

    let catalog = FieldCatalog::embedded().unwrap();
    let refreshed_at = Utc.with_ymd_and_hms(2012, 4, 15, 0, 0, 0).unwrap();
    let row = build_fundamentals_row(cf, &stats, &catalog, refreshed_at);

    assert_eq!(row.fields.len(), 25);
    assert_eq!(row.decimal("market_cap"), Some(dec!(12200000000)));
    assert_eq!(row.decimal("ent_val"), Some(dec!(11340000000)));
    assert_eq!(row.decimal("trailing_pe"), Some(dec!(8.62)));
    assert_eq!(row.decimal("roa_ttm"), Some(dec!(0.2105)));
    assert_eq!(row.decimal("ebita_ttm"), Some(dec!(3020000000)));
    assert_eq!(row.decimal("10d_avg_vol"), Some(dec!(1322410)));
    assert_eq!(row.decimal("insider_percent"), Some(dec!(0.0049)));
    assert_eq!(row.decimal("prior_m_shares_short"), Some(dec!(2130000)));
    assert_eq!(
        row.get("mrq"),
        Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2011, 12, 31).unwrap()))
    );
    assert_eq!(
        row.get("div_date"),
        Some(&FieldValue::Date(NaiveDate::from_ymd_opt(2012, 2, 29).unwrap()))
    );
    assert_eq!(row.get("last_split_factor"), Some(&FieldValue::Null));
    assert_eq!(row.get("last_split_date"), Some(&FieldValue::Null));

    // 4. 저장
    let store = InMemoryStore::new(catalog.clone());
    assert_eq!(store.upsert_tickers(&tickers).await.unwrap(), 2);
    store.upsert_fundamentals(&row).await.unwrap();

    let snapshot = store.load_fundamentals().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].ticker, "CF");
}

#[tokio::test]
async fn test_missing_page_is_permanent_failure() {
    let source = SourceConfig::default();
    let fetcher = fetcher(&source);

    let err = fetcher.fetch(&source.keystats_url("ZZZZ")).await.unwrap_err();
    assert!(!err.is_transient());
}
