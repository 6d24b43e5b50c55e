//! 프로세스 내 저장소.
//!
//! 데이터베이스 없이 파이프라인을 실행하거나(`--dry-run`) 테스트할 때 사용합니다.
//! upsert 병합 규칙은 PostgreSQL 구현과 같습니다. 카탈로그에 없는 컬럼과
//! 숫자/날짜 컬럼의 텍스트 대체값은 저장하지 않습니다.

use async_trait::async_trait;
use screener_core::{FieldCatalog, FundamentalsRow, TickerRecord};
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;
use tracing::debug;

use super::{stored_value, FundamentalsStore};
use crate::error::PersistenceError;

/// 메모리 기반 저장소.
#[derive(Debug)]
pub struct InMemoryStore {
    catalog: FieldCatalog,
    tickers: RwLock<BTreeMap<String, TickerRecord>>,
    fundamentals: RwLock<BTreeMap<String, FundamentalsRow>>,
    rejected: BTreeSet<String>,
}

impl InMemoryStore {
    pub fn new(catalog: FieldCatalog) -> Self {
        Self {
            catalog,
            tickers: RwLock::default(),
            fundamentals: RwLock::default(),
            rejected: BTreeSet::new(),
        }
    }

    /// 지정한 종목의 통계 쓰기를 실패시킵니다.
    pub fn rejecting(mut self, ticker: impl Into<String>) -> Self {
        self.rejected.insert(ticker.into());
        self
    }

    /// 저장된 종목 (심볼 순).
    pub async fn tickers(&self) -> Vec<TickerRecord> {
        self.tickers.read().await.values().cloned().collect()
    }

    /// 저장된 통계 레코드 조회.
    pub async fn fundamentals(&self, ticker: &str) -> Option<FundamentalsRow> {
        self.fundamentals.read().await.get(ticker).cloned()
    }
}

#[async_trait]
impl FundamentalsStore for InMemoryStore {
    async fn upsert_tickers(&self, tickers: &[TickerRecord]) -> Result<usize, PersistenceError> {
        let mut stored = self.tickers.write().await;
        for ticker in tickers {
            stored.insert(ticker.symbol.clone(), ticker.clone());
        }
        Ok(tickers.len())
    }

    async fn upsert_fundamentals(&self, row: &FundamentalsRow) -> Result<(), PersistenceError> {
        if self.rejected.contains(&row.ticker) {
            return Err(PersistenceError::Rejected(row.ticker.clone()));
        }
        if !self.tickers.read().await.contains_key(&row.ticker) {
            return Err(PersistenceError::UnknownTicker(row.ticker.clone()));
        }

        let mut fields = BTreeMap::new();
        for (column, value) in &row.fields {
            match self.catalog.kind_of(column).and_then(|kind| stored_value(kind, value)) {
                Some(value) => {
                    fields.insert(column.clone(), value);
                }
                None => debug!(ticker = %row.ticker, column = %column, "저장하지 않는 컬럼"),
            }
        }

        let mut stored = self.fundamentals.write().await;
        match stored.get_mut(&row.ticker) {
            Some(existing) => {
                existing.refreshed_at = row.refreshed_at;
                existing.description = row.description.clone().or(existing.description.take());
                existing.fields.extend(fields);
            }
            None => {
                let mut fresh = row.clone();
                fresh.fields = fields;
                stored.insert(row.ticker.clone(), fresh);
            }
        }

        Ok(())
    }

    async fn load_fundamentals(&self) -> Result<Vec<FundamentalsRow>, PersistenceError> {
        Ok(self.fundamentals.read().await.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use screener_core::FieldValue;

    fn ticker(symbol: &str) -> TickerRecord {
        TickerRecord::new(symbol, "Technology", "Software")
    }

    #[tokio::test]
    async fn test_upsert_merges_without_truncating() {
        let store = InMemoryStore::new(FieldCatalog::embedded().unwrap());
        store.upsert_tickers(&[ticker("ACME")]).await.unwrap();

        let first = FundamentalsRow::for_ticker(&ticker("ACME"), Utc::now())
            .with_field("trailing_pe", FieldValue::Number(dec!(7.2)))
            .with_field("beta", FieldValue::Number(dec!(1.1)));
        store.upsert_fundamentals(&first).await.unwrap();

        // beta는 없고, trailing_pe는 명시적 Null
        let second = FundamentalsRow::for_ticker(&ticker("ACME"), Utc::now())
            .with_field("trailing_pe", FieldValue::Null)
            .with_field("roa_ttm", FieldValue::Number(dec!(0.3)));
        store.upsert_fundamentals(&second).await.unwrap();

        let row = store.fundamentals("ACME").await.unwrap();
        assert_eq!(row.get("trailing_pe"), Some(&FieldValue::Null));
        assert_eq!(row.decimal("beta"), Some(dec!(1.1)));
        assert_eq!(row.decimal("roa_ttm"), Some(dec!(0.3)));
    }

    #[tokio::test]
    async fn test_text_fallback_keeps_known_number() {
        let store = InMemoryStore::new(FieldCatalog::embedded().unwrap());
        store.upsert_tickers(&[ticker("ACME")]).await.unwrap();

        let first = FundamentalsRow::for_ticker(&ticker("ACME"), Utc::now())
            .with_field("beta", FieldValue::Number(dec!(1.1)));
        store.upsert_fundamentals(&first).await.unwrap();

        let garbled = FundamentalsRow::for_ticker(&ticker("ACME"), Utc::now())
            .with_field("beta", FieldValue::Text("abc".into()))
            .with_field("not_a_column", FieldValue::Number(dec!(5)));
        store.upsert_fundamentals(&garbled).await.unwrap();

        let row = store.fundamentals("ACME").await.unwrap();
        assert_eq!(row.decimal("beta"), Some(dec!(1.1)));
        assert_eq!(row.get("not_a_column"), None);
    }

    #[tokio::test]
    async fn test_unknown_ticker_rejected() {
        let store = InMemoryStore::new(FieldCatalog::embedded().unwrap());
        let row = FundamentalsRow::for_ticker(&ticker("NOPE"), Utc::now());

        let result = store.upsert_fundamentals(&row).await;
        assert!(matches!(result, Err(PersistenceError::UnknownTicker(_))));
    }
}
