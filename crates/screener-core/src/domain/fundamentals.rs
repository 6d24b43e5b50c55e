//! 종목 통계 레코드와 랭킹 결과.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ticker::TickerRecord;

/// 정규화된 필드 값.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// 값 없음 (빈 셀, "N/A" 등 소스가 명시적으로 값 없음을 보고)
    Null,
    /// 숫자 (배율/퍼센트 적용 완료)
    Number(Decimal),
    /// 달력 날짜
    Date(NaiveDate),
    /// 해석 불가 값 (원본 텍스트 보존)
    Text(String),
}

impl FieldValue {
    /// 숫자 값 반환.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// 날짜 값 반환.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// 텍스트 값 반환.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, ""),
            Self::Number(value) => write!(f, "{}", value.normalize()),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Text(text) => write!(f, "{}", text),
        }
    }
}

/// 통계 페이지의 정규화된 단일 필드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStat {
    /// 정규화된 라벨 (예: "Return on Assets (ttm)", "3 month Avg Vol")
    pub name: String,
    /// 정규화된 값
    pub value: FieldValue,
}

impl KeyStat {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// 종목별 통계 레코드.
///
/// 추출이 완전히 성공한 경우에만 생성되며, 영속화와 랭킹의 입력이 됩니다.
/// `fields`의 키는 필드 카탈로그의 정규 컬럼명입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsRow {
    /// 종목 심볼
    pub ticker: String,
    /// 섹터명
    pub sector: String,
    /// 업종명
    pub industry: String,
    /// 회사명
    #[serde(default)]
    pub description: Option<String>,
    /// 갱신 시각
    pub refreshed_at: DateTime<Utc>,
    /// 정규 컬럼명 → 값
    pub fields: BTreeMap<String, FieldValue>,
}

impl FundamentalsRow {
    /// 종목 레코드로부터 빈 통계 레코드를 생성합니다.
    pub fn for_ticker(ticker: &TickerRecord, refreshed_at: DateTime<Utc>) -> Self {
        Self {
            ticker: ticker.symbol.clone(),
            sector: ticker.sector.clone(),
            industry: ticker.industry.clone(),
            description: ticker.description.clone(),
            refreshed_at,
            fields: BTreeMap::new(),
        }
    }

    /// 필드 값을 설정합니다.
    pub fn with_field(mut self, column: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(column.into(), value);
        self
    }

    /// 필드 값 조회.
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// 숫자 필드 조회 (숫자가 아니거나 없으면 None).
    pub fn decimal(&self, column: &str) -> Option<Decimal> {
        self.fields.get(column).and_then(FieldValue::as_decimal)
    }
}

/// 랭킹이 부여된 통계 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    /// 원본 레코드
    pub row: FundamentalsRow,
    /// 이익수익률 대리지표(P/E) 순위 (낮을수록 우선)
    pub pe_rank: u32,
    /// 자본수익률 대리지표 순위 (높을수록 우선)
    pub return_rank: u32,
    /// 배당수익률 순위 (해당 전략에서만 부여, 정렬에는 사용하지 않음)
    #[serde(default)]
    pub yield_rank: Option<u32>,
}

impl RankedRow {
    pub fn symbol(&self) -> &str {
        &self.row.ticker
    }
}
