//! 종목 통계 페이지.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html};
use screener_core::{
    canonical_label, normalize, parse_date, FieldCatalog, FieldKind, FieldValue, FundamentalsRow,
    KeyStat, TickerRecord,
};
use tracing::{debug, trace};

use super::{full_text, leading_text, selector};
use crate::error::ExtractionError;

const PAGE: &str = "통계";

/// 통계 문서에서 라벨/값 쌍을 추출합니다.
///
/// 라벨 셀과 값 셀은 문서 순서대로 번갈아 나타납니다.
/// 값 셀에 `span`이 있으면 그 텍스트를 값으로 사용합니다.
/// 쌍이 하나도 없으면 [`ExtractionError::NoData`]를 반환합니다.
pub fn extract_key_stats(html: &str) -> Result<Vec<KeyStat>, ExtractionError> {
    let document = Html::parse_document(html);
    let (Some(cells), Some(span)) = (
        selector(
            "table.yfnc_datamodoutline1 td.yfnc_tablehead1, \
             table.yfnc_datamodoutline1 td.yfnc_tabledata1",
        ),
        selector("span"),
    ) else {
        return Err(ExtractionError::NoData { page: PAGE });
    };

    let cells: Vec<ElementRef<'_>> = document.select(&cells).collect();

    let stats: Vec<KeyStat> = cells
        .chunks_exact(2)
        .filter_map(|pair| {
            let name = canonical_label(&cell_text(pair[0]));
            if name.is_empty() {
                return None;
            }

            let raw = match pair[1].select(&span).next() {
                Some(inner) => full_text(inner),
                None => cell_text(pair[1]),
            };

            Some(KeyStat::new(name, normalize(&raw)))
        })
        .collect();

    if stats.is_empty() {
        return Err(ExtractionError::NoData { page: PAGE });
    }

    Ok(stats)
}

/// 첫 자식 요소 이전 텍스트, 없으면 전체 텍스트.
fn cell_text(cell: ElementRef<'_>) -> String {
    let text = leading_text(cell);
    if text.trim().is_empty() {
        full_text(cell)
    } else {
        text
    }
}

/// 통계 쌍을 카탈로그 컬럼으로 매핑해 레코드를 조립합니다.
///
/// - 카탈로그에 없는 라벨은 버립니다.
/// - 날짜 필드는 원본 텍스트를 날짜로 파싱하고, 실패하면 `Null`입니다.
/// - 같은 라벨이 두 번 나오면 먼저 나온 값을 유지합니다.
pub fn build_fundamentals_row(
    ticker: &TickerRecord,
    stats: &[KeyStat],
    catalog: &FieldCatalog,
    refreshed_at: DateTime<Utc>,
) -> FundamentalsRow {
    let reference = refreshed_at.date_naive();
    let mut row = FundamentalsRow::for_ticker(ticker, refreshed_at);

    for stat in stats {
        let Some(spec) = catalog.lookup(&stat.name) else {
            trace!(ticker = %ticker.symbol, label = %stat.name, "카탈로그에 없는 라벨");
            continue;
        };

        let value = match spec.kind {
            FieldKind::Number => stat.value.clone(),
            FieldKind::Date => coerce_date(&stat.value, reference),
            FieldKind::Text => match &stat.value {
                FieldValue::Number(n) => FieldValue::Text(n.to_string()),
                FieldValue::Date(d) => FieldValue::Text(d.to_string()),
                other => other.clone(),
            },
        };

        if let FieldValue::Text(text) = &value {
            if spec.kind == FieldKind::Number {
                debug!(ticker = %ticker.symbol, column = %spec.column, value = %text, "숫자 해석 실패");
            }
        }

        row.fields.entry(spec.column.clone()).or_insert(value);
    }

    row
}

fn coerce_date(value: &FieldValue, reference: chrono::NaiveDate) -> FieldValue {
    match value {
        FieldValue::Date(date) => FieldValue::Date(*date),
        FieldValue::Text(text) => parse_date(text, reference)
            .map(FieldValue::Date)
            .unwrap_or(FieldValue::Null),
        _ => FieldValue::Null,
    }
}
