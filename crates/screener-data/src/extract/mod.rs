//! 페이지 추출기.
//!
//! 조회된 HTML 문서를 구조화된 레코드로 변환합니다.
//!
//! | 페이지 | 함수 | 결과 |
//! |--------|------|------|
//! | 섹터/업종 디렉터리 | [`extract_industries`] | `Vec<IndustryRef>` |
//! | 업종 페이지 | [`extract_tickers`] | `Vec<TickerRecord>` |
//! | 종목 통계 페이지 | [`extract_key_stats`] | `Vec<KeyStat>` |
//!
//! 예상한 구조가 없으면 [`ExtractionError`](crate::ExtractionError)를 반환하며,
//! 호출자는 이를 빈 결과로 취급합니다.

mod directory;
mod industry;
mod keystats;

pub use directory::extract_industries;
pub use industry::extract_tickers;
pub use keystats::{build_fundamentals_row, extract_key_stats};

use scraper::{ElementRef, Node, Selector};

/// 셀렉터 파싱.
///
/// 셀렉터는 모두 상수 문자열이므로 실패 시 아무것도 매칭하지 않는 것으로 처리합니다.
fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// 첫 번째 자식 요소 이전의 텍스트 노드만 이어 붙입니다.
///
/// `<td>Dividend Date<sup>3</sup>:</td>` → `"Dividend Date"`
fn leading_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for child in element.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(_) => break,
            _ => {}
        }
    }
    text
}

/// 하위 텍스트 전체를 이어 붙이고 공백을 정리합니다.
fn full_text(element: ElementRef<'_>) -> String {
    collapse(&element.text().collect::<String>())
}

/// 줄바꿈/연속 공백을 공백 하나로 합칩니다.
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
