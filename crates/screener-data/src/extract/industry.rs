//! 업종 페이지 (종목 목록 + 섹터/업종 집계 지표).

use rust_decimal::Decimal;
use scraper::{ElementRef, Html, Selector};
use screener_core::{normalize, IndustryRef, TickerRecord, AGGREGATE_METRICS};
use std::collections::BTreeMap;
use tracing::debug;

use super::{collapse, full_text, leading_text, selector};
use crate::error::ExtractionError;

const PAGE: &str = "업종";

struct Selectors {
    cell: Selector,
    link: Selector,
    font: Selector,
    td: Selector,
}

impl Selectors {
    fn new() -> Option<Self> {
        Some(Self {
            cell: selector(r#"table[width="100%"] td[bgcolor="ffffee"]"#)?,
            link: selector("a")?,
            font: selector("font")?,
            td: selector("td")?,
        })
    }
}

/// 업종 문서에서 종목 목록을 추출합니다.
///
/// - 처음 두 강조 셀은 섹터/업종 요약 행 (집계 지표 스냅샷)
/// - 이후 셀 중 링크가 2개 미만인 행은 데이터 행이 아니므로 건너뜀
/// - 구분자(`.`)가 포함된 심볼은 해외 상장으로 제외
///
/// 종목이 하나도 없는 업종은 에러가 아니라 빈 목록입니다.
pub fn extract_tickers(
    html: &str,
    industry: &IndustryRef,
) -> Result<Vec<TickerRecord>, ExtractionError> {
    let document = Html::parse_document(html);
    let Some(sel) = Selectors::new() else {
        return Ok(Vec::new());
    };

    let cells: Vec<ElementRef<'_>> = document.select(&sel.cell).collect();
    if cells.len() < 2 {
        return Err(ExtractionError::MissingStructure {
            page: PAGE,
            detail: format!("요약 행 없음 (industry_id={})", industry.id),
        });
    }

    let sector = cells[0]
        .select(&sel.link)
        .next()
        .map(full_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| industry.sector.clone());

    let industry_name = cells[1]
        .select(&sel.font)
        .nth(1)
        .map(|font| clean_industry_name(&leading_text(font)))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| industry.name.clone());

    let sector_metrics = aggregate_metrics(cells[0], &sel);
    let industry_metrics = aggregate_metrics(cells[1], &sel);

    let mut tickers = Vec::new();
    for cell in &cells[2..] {
        let links: Vec<ElementRef<'_>> = cell.select(&sel.link).collect();
        if links.len() < 2 {
            continue;
        }

        let symbol = full_text(links[1]);
        if symbol.is_empty() {
            continue;
        }
        if TickerRecord::is_foreign_listing(&symbol) {
            debug!(ticker = %symbol, industry_id = industry.id, "해외 상장 종목 제외");
            continue;
        }

        let mut record = TickerRecord::new(symbol, sector.clone(), industry_name.clone());
        let description = full_text(links[0]);
        if !description.is_empty() {
            record = record.with_description(description);
        }
        record.sector_metrics = sector_metrics.clone();
        record.industry_metrics = industry_metrics.clone();

        tickers.push(record);
    }

    Ok(tickers)
}

/// `"Agricultural\nChemicals ("` → `"Agricultural Chemicals"`
fn clean_industry_name(raw: &str) -> String {
    collapse(raw)
        .trim_end_matches('(')
        .trim_start_matches('(')
        .trim()
        .to_string()
}

/// 요약 셀이 속한 행에서 집계 지표를 읽습니다.
///
/// 첫 번째 셀(라벨)과 마지막 두 셀을 제외한 나머지가 [`AGGREGATE_METRICS`] 순서의 값입니다.
/// 숫자가 아닌 값은 제외합니다.
fn aggregate_metrics(cell: ElementRef<'_>, sel: &Selectors) -> BTreeMap<String, Decimal> {
    let Some(row) = cell.parent().and_then(ElementRef::wrap) else {
        return BTreeMap::new();
    };

    let tds: Vec<ElementRef<'_>> = row.select(&sel.td).collect();
    if tds.len() < 3 {
        return BTreeMap::new();
    }

    tds[1..tds.len() - 2]
        .iter()
        .zip(AGGREGATE_METRICS.iter())
        .filter_map(|(td, name)| {
            let raw = td
                .select(&sel.font)
                .next()
                .map(leading_text)
                .unwrap_or_else(|| leading_text(*td));
            normalize(&raw)
                .as_decimal()
                .map(|value| (name.to_string(), value))
        })
        .collect()
}
