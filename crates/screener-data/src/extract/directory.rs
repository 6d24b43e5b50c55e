//! 섹터/업종 디렉터리 페이지.

use scraper::Html;
use screener_core::{DiscoveryConfig, IndustryRef};
use tracing::debug;

use super::{full_text, selector};
use crate::error::ExtractionError;

const PAGE: &str = "디렉터리";

/// 링크 대상 접미사 (`112conameu.html` → 업종 ID 112)
const LINK_SUFFIX: &str = "conameu.html";

/// 이 값보다 작은 ID는 섹터 제목입니다.
const SECTOR_ID_LIMIT: u32 = 100;

/// 디렉터리 문서에서 업종 목록을 추출합니다.
///
/// 섹터 제목 링크(ID < 100)는 뒤따르는 업종들의 `sector`가 되며 결과에는 포함되지 않습니다.
/// `discovery`의 제외 업종/포함 섹터 규칙을 적용한 순서 보존 목록을 반환합니다.
pub fn extract_industries(
    html: &str,
    discovery: &DiscoveryConfig,
) -> Result<Vec<IndustryRef>, ExtractionError> {
    let document = Html::parse_document(html);
    let Some(link_selector) = selector(r#"table[width="100%"] td[bgcolor="ffffee"] > a"#) else {
        return Ok(Vec::new());
    };

    let mut matched = 0usize;
    let mut sector = String::new();
    let mut industries = Vec::new();

    for link in document.select(&link_selector) {
        matched += 1;

        let Some(id) = link.value().attr("href").and_then(parse_industry_id) else {
            continue;
        };
        let name = full_text(link);

        if id < SECTOR_ID_LIMIT {
            sector = name;
            continue;
        }

        if !discovery.accepts(&name, &sector) {
            debug!(industry_id = id, industry = %name, sector = %sector, "업종 제외");
            continue;
        }

        industries.push(IndustryRef::new(id, name, sector.clone()));
    }

    if matched == 0 {
        return Err(ExtractionError::MissingStructure {
            page: PAGE,
            detail: "업종 링크 테이블 없음".to_string(),
        });
    }

    Ok(industries)
}

/// `"112conameu.html"` → `Some(112)`
fn parse_industry_id(href: &str) -> Option<u32> {
    let file = href.trim().rsplit('/').next()?;
    file.strip_suffix(LINK_SUFFIX)?.parse().ok()
}
