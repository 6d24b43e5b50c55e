//! 영속화 어댑터.
//!
//! 종목 차원 테이블(`tickers`)과 통계 사실 테이블(`fundamentals`)에 대한 upsert를 제공합니다.
//! 파이프라인은 단일 영속화 워커를 통해서만 쓰기를 수행합니다.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{build_fundamentals_upsert, PgFundamentalsStore};

use async_trait::async_trait;
use screener_core::{FieldKind, FieldValue, FundamentalsRow, TickerRecord};

use crate::error::PersistenceError;

/// 종목/통계 저장소.
#[async_trait]
pub trait FundamentalsStore: Send + Sync {
    /// 발견된 종목을 upsert합니다 (`last_seen` 갱신).
    ///
    /// 반영된 행 수를 반환합니다.
    async fn upsert_tickers(&self, tickers: &[TickerRecord]) -> Result<usize, PersistenceError>;

    /// 통계 레코드를 upsert합니다.
    ///
    /// 레코드에 없는 컬럼은 기존 값을 유지하고, `Null` 값은 NULL로 덮어씁니다.
    async fn upsert_fundamentals(&self, row: &FundamentalsRow) -> Result<(), PersistenceError>;

    /// 저장된 통계 스냅샷 전체를 읽습니다.
    async fn load_fundamentals(&self) -> Result<Vec<FundamentalsRow>, PersistenceError>;
}

/// 컬럼 타입에 맞춰 저장할 값을 돌려줍니다.
///
/// 숫자/날짜 컬럼에 들어온 텍스트 대체값은 `None`이며, 저장소는 해당 컬럼을 건드리지 않습니다.
/// 텍스트 컬럼은 어떤 값이든 문자열로 보존합니다.
pub(crate) fn stored_value(kind: FieldKind, value: &FieldValue) -> Option<FieldValue> {
    match (kind, value) {
        (_, FieldValue::Null) => Some(FieldValue::Null),
        (FieldKind::Number, FieldValue::Number(_))
        | (FieldKind::Date, FieldValue::Date(_))
        | (FieldKind::Text, FieldValue::Text(_)) => Some(value.clone()),
        (FieldKind::Text, other) => Some(FieldValue::Text(other.to_string())),
        (FieldKind::Number | FieldKind::Date, _) => None,
    }
}
