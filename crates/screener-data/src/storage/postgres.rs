//! PostgreSQL 저장소.
//!
//! - `tickers`: 종목별 1행, `ticker` 유일 키, 섹터/업종 집계 지표 미러링
//! - `fundamentals`: 종목별 1행, `ticker_id` 유일 키, 카탈로그 컬럼별 1열
//!
//! 통계 upsert는 레코드에 있는 컬럼만 나열하므로 없는 필드가 기존 값을 지우지 않습니다.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use screener_core::{
    FieldCatalog, FieldKind, FieldValue, FundamentalsRow, TickerRecord, AGGREGATE_METRICS,
};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{stored_value, FundamentalsStore};
use crate::error::PersistenceError;

const SCHEMA: &str = include_str!("../../migrations/0001_schema.sql");

/// PostgreSQL 기반 저장소.
#[derive(Debug, Clone)]
pub struct PgFundamentalsStore {
    pool: PgPool,
    catalog: FieldCatalog,
}

impl PgFundamentalsStore {
    /// 데이터베이스에 연결합니다.
    ///
    /// 쓰기는 단일 워커가 수행하므로 작은 풀을 사용합니다.
    pub async fn connect(url: &str, catalog: FieldCatalog) -> Result<Self, PersistenceError> {
        info!("데이터베이스 연결 중...");

        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .connect(url)
            .await
            .map_err(|e| PersistenceError::Connection(e.to_string()))?;

        info!("데이터베이스 연결 완료");
        Ok(Self { pool, catalog })
    }

    /// 기존 연결 풀로 생성합니다.
    pub fn from_pool(pool: PgPool, catalog: FieldCatalog) -> Self {
        Self { pool, catalog }
    }

    /// 테이블이 없으면 생성합니다.
    ///
    /// 기본 카탈로그 기준 스키마이므로, 카탈로그에 컬럼을 추가하면 테이블도 함께 변경해야 합니다.
    pub async fn migrate(&self) -> Result<(), PersistenceError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::Migration(e.to_string()))?;

        debug!("스키마 확인 완료");
        Ok(())
    }

    fn decode_row(&self, row: &PgRow) -> Result<FundamentalsRow, sqlx::Error> {
        let mut fields = BTreeMap::new();

        for spec in self.catalog.fields() {
            let column = spec.column.as_str();
            let value = match spec.kind {
                FieldKind::Number => row
                    .try_get::<Option<Decimal>, _>(column)?
                    .map(FieldValue::Number),
                FieldKind::Date => row
                    .try_get::<Option<NaiveDate>, _>(column)?
                    .map(FieldValue::Date),
                FieldKind::Text => row
                    .try_get::<Option<String>, _>(column)?
                    .map(FieldValue::Text),
            };
            fields.insert(spec.column.clone(), value.unwrap_or(FieldValue::Null));
        }

        Ok(FundamentalsRow {
            ticker: row.try_get("ticker")?,
            sector: row.try_get::<Option<String>, _>("sector")?.unwrap_or_default(),
            industry: row.try_get::<Option<String>, _>("industry")?.unwrap_or_default(),
            description: row.try_get("description")?,
            refreshed_at: row.try_get::<DateTime<Utc>, _>("refreshed_at")?,
            fields,
        })
    }
}

#[async_trait]
impl FundamentalsStore for PgFundamentalsStore {
    async fn upsert_tickers(&self, tickers: &[TickerRecord]) -> Result<usize, PersistenceError> {
        if tickers.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut affected = 0;

        for ticker in tickers {
            let result = build_ticker_upsert(ticker).build().execute(&mut *tx).await?;
            if result.rows_affected() > 0 {
                affected += 1;
            }
        }

        tx.commit().await?;
        Ok(affected)
    }

    async fn upsert_fundamentals(&self, row: &FundamentalsRow) -> Result<(), PersistenceError> {
        let (mut builder, omitted) = build_fundamentals_upsert(row, &self.catalog);

        if !omitted.is_empty() {
            warn!(
                ticker = %row.ticker,
                columns = ?omitted,
                "타입이 맞지 않는 값은 저장하지 않음"
            );
        }

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(PersistenceError::UnknownTicker(row.ticker.clone()));
        }

        Ok(())
    }

    async fn load_fundamentals(&self) -> Result<Vec<FundamentalsRow>, PersistenceError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT t.ticker, t.sector, t.industry, t.description, f.refreshed_at",
        );
        for column in self.catalog.columns() {
            builder.push(", f.");
            builder.push(quote_ident(column));
        }
        builder.push(" FROM fundamentals f JOIN tickers t ON t.id = f.ticker_id ORDER BY t.ticker");

        let rows = builder.build().fetch_all(&self.pool).await?;
        let snapshot = rows
            .iter()
            .map(|row| self.decode_row(row))
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = snapshot.len(), "저장된 통계 로드 완료");
        Ok(snapshot)
    }
}

/// 바인딩할 컬럼 값.
enum Bound {
    Number(Option<Decimal>),
    Date(Option<NaiveDate>),
    Text(Option<String>),
}

fn bind_value(kind: FieldKind, value: &FieldValue) -> Option<Bound> {
    let bound = match (kind, stored_value(kind, value)?) {
        (FieldKind::Number, FieldValue::Number(n)) => Bound::Number(Some(n)),
        (FieldKind::Number, _) => Bound::Number(None),
        (FieldKind::Date, FieldValue::Date(d)) => Bound::Date(Some(d)),
        (FieldKind::Date, _) => Bound::Date(None),
        (FieldKind::Text, FieldValue::Text(t)) => Bound::Text(Some(t)),
        (FieldKind::Text, _) => Bound::Text(None),
    };
    Some(bound)
}

/// 통계 upsert 쿼리를 생성합니다.
///
/// 저장하지 않은 컬럼(카탈로그에 없거나 타입이 맞지 않는 값) 목록을 함께 반환합니다.
pub fn build_fundamentals_upsert<'a>(
    row: &'a FundamentalsRow,
    catalog: &FieldCatalog,
) -> (QueryBuilder<'a, Postgres>, Vec<&'a str>) {
    let mut columns: Vec<(&'a str, Bound)> = Vec::with_capacity(row.fields.len());
    let mut omitted = Vec::new();

    for (column, value) in &row.fields {
        let bound = catalog
            .kind_of(column)
            .and_then(|kind| bind_value(kind, value));
        match bound {
            Some(bound) => columns.push((column.as_str(), bound)),
            None => omitted.push(column.as_str()),
        }
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("INSERT INTO fundamentals (ticker_id");
    for (column, _) in &columns {
        builder.push(", ");
        builder.push(quote_ident(column));
    }
    builder.push(", refreshed_at) SELECT id");

    for (_, bound) in columns.iter() {
        builder.push(", ");
        match bound {
            Bound::Number(v) => builder.push_bind(*v),
            Bound::Date(v) => builder.push_bind(*v),
            Bound::Text(v) => builder.push_bind(v.clone()),
        };
    }

    builder.push(", ");
    builder.push_bind(row.refreshed_at);
    builder.push(" FROM tickers WHERE ticker = ");
    builder.push_bind(row.ticker.as_str());
    builder.push(" ON CONFLICT (ticker_id) DO UPDATE SET ");

    for (column, _) in &columns {
        let quoted = quote_ident(column);
        builder.push(format!("{quoted} = EXCLUDED.{quoted}, "));
    }
    builder.push("refreshed_at = EXCLUDED.refreshed_at");

    (builder, omitted)
}

/// 종목 upsert 쿼리를 생성합니다.
fn build_ticker_upsert(ticker: &TickerRecord) -> QueryBuilder<'_, Postgres> {
    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO tickers (ticker, sector, industry, description, last_seen");
    for prefix in ["sector", "industry"] {
        for metric in AGGREGATE_METRICS {
            builder.push(format!(", {}", quote_ident(&format!("{prefix}_{metric}"))));
        }
    }
    builder.push(") VALUES (");

    {
        let mut values = builder.separated(", ");
        values.push_bind(ticker.symbol.as_str());
        values.push_bind(ticker.sector.as_str());
        values.push_bind(ticker.industry.as_str());
        values.push_bind(ticker.description.as_deref());
        values.push("NOW()");
        for metric in AGGREGATE_METRICS {
            values.push_bind(ticker.sector_metrics.get(metric).copied());
        }
        for metric in AGGREGATE_METRICS {
            values.push_bind(ticker.industry_metrics.get(metric).copied());
        }
    }

    builder.push(
        ") ON CONFLICT (ticker) DO UPDATE SET \
         sector = EXCLUDED.sector, \
         industry = EXCLUDED.industry, \
         description = COALESCE(EXCLUDED.description, tickers.description), \
         last_seen = NOW()",
    );
    for prefix in ["sector", "industry"] {
        for metric in AGGREGATE_METRICS {
            let quoted = quote_ident(&format!("{prefix}_{metric}"));
            builder.push(format!(", {quoted} = EXCLUDED.{quoted}"));
        }
    }

    builder
}

/// 식별자 인용 (`52w_low` 처럼 숫자로 시작하는 컬럼명 대응).
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn catalog() -> FieldCatalog {
        FieldCatalog::embedded().unwrap()
    }

    #[test]
    fn test_fundamentals_upsert_lists_present_columns_only() {
        let ticker = TickerRecord::new("ACME", "Technology", "Software");
        let row = FundamentalsRow::for_ticker(&ticker, Utc::now())
            .with_field("trailing_pe", FieldValue::Number(dec!(7.2)))
            .with_field("52w_low", FieldValue::Null)
            .with_field("ex_div_date", FieldValue::Date(NaiveDate::from_ymd_opt(2012, 3, 9).unwrap()));

        let (builder, omitted) = build_fundamentals_upsert(&row, &catalog());
        let sql = builder.sql();

        assert!(omitted.is_empty());
        assert_eq!(
            sql,
            "INSERT INTO fundamentals (ticker_id, \"52w_low\", \"ex_div_date\", \"trailing_pe\", refreshed_at) \
             SELECT id, $1, $2, $3, $4 FROM tickers WHERE ticker = $5 \
             ON CONFLICT (ticker_id) DO UPDATE SET \
             \"52w_low\" = EXCLUDED.\"52w_low\", \
             \"ex_div_date\" = EXCLUDED.\"ex_div_date\", \
             \"trailing_pe\" = EXCLUDED.\"trailing_pe\", \
             refreshed_at = EXCLUDED.refreshed_at"
        );
        assert!(!sql.contains("beta"));
    }

    #[test]
    fn test_text_fallback_in_numeric_column_is_omitted() {
        let ticker = TickerRecord::new("ACME", "Technology", "Software");
        let row = FundamentalsRow::for_ticker(&ticker, Utc::now())
            .with_field("beta", FieldValue::Text("abc".to_string()))
            .with_field("last_split_factor", FieldValue::Text("2:1".to_string()))
            .with_field("not_a_column", FieldValue::Number(dec!(1)));

        let (builder, omitted) = build_fundamentals_upsert(&row, &catalog());

        assert_eq!(omitted, vec!["beta", "not_a_column"]);
        assert!(builder.sql().contains("\"last_split_factor\""));
        assert!(!builder.sql().contains("\"beta\""));
    }

    #[test]
    fn test_ticker_upsert_sql() {
        let ticker = TickerRecord::new("ACME", "Technology", "Software");
        let builder = build_ticker_upsert(&ticker);
        let sql = builder.sql();

        assert!(sql.starts_with("INSERT INTO tickers (ticker, sector, industry, description, last_seen, \"sector_1d_price_change\""));
        assert!(sql.contains("$1, $2, $3, $4, NOW(), $5"));
        assert!(sql.contains("ON CONFLICT (ticker) DO UPDATE SET"));
        assert!(sql.contains("\"industry_price_per_book_mrq\" = EXCLUDED.\"industry_price_per_book_mrq\""));
        // 4 + 7 + 7 바인딩
        assert!(sql.contains("$18)"));
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("52w_low"), "\"52w_low\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
