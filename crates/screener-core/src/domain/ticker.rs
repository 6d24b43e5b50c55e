//! 종목 레코드.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 해외 상장 종목을 구분하는 심볼 구분자.
pub const FOREIGN_LISTING_DELIMITER: char = '.';

/// 섹터/업종 요약 행에서 추출하는 집계 지표 (페이지 열 순서와 동일).
pub const AGGREGATE_METRICS: [&str; 7] = [
    "1d_price_change",
    "market_cap",
    "trailing_pe",
    "roe_ttm",
    "trailing_annual_div_yield",
    "debt_to_equity_mrq",
    "price_per_book_mrq",
];

/// 업종 페이지에서 발견된 종목.
///
/// `symbol`이 자연키이며, 한 실행 안에서 심볼은 유일합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerRecord {
    /// 종목 심볼 (예: "AAPL")
    pub symbol: String,
    /// 섹터명
    pub sector: String,
    /// 업종명
    pub industry: String,
    /// 회사명 (업종 페이지의 첫 번째 링크 텍스트)
    #[serde(default)]
    pub description: Option<String>,
    /// 섹터 집계 지표 스냅샷
    #[serde(default)]
    pub sector_metrics: BTreeMap<String, Decimal>,
    /// 업종 집계 지표 스냅샷
    #[serde(default)]
    pub industry_metrics: BTreeMap<String, Decimal>,
}

impl TickerRecord {
    /// 새 종목 레코드를 생성합니다.
    pub fn new(
        symbol: impl Into<String>,
        sector: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            sector: sector.into(),
            industry: industry.into(),
            description: None,
            sector_metrics: BTreeMap::new(),
            industry_metrics: BTreeMap::new(),
        }
    }

    /// 회사명을 설정합니다.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// 해외 상장(구분자 포함) 심볼인지 확인합니다.
    pub fn is_foreign_listing(symbol: &str) -> bool {
        symbol.contains(FOREIGN_LISTING_DELIMITER)
    }
}
