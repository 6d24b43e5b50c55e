//! 원시 텍스트 값 정규화.
//!
//! 통계 페이지의 값은 `"1.23B"`, `"45.6%"`, `"N/A"`, `"Dec 31, 2011"`처럼
//! 형식이 제각각입니다. 이 모듈은 이를 타입이 있는 [`FieldValue`]로 변환합니다.
//!
//! ## 규칙 (우선순위 순)
//! 1. 빈 문자열 → `Null`
//! 2. 끝자리 배율 접미사 `B`/`M`/`K` (대소문자 무관) → ×1e9 / ×1e6 / ×1e3, 정수로 절사
//! 3. `%` 포함 → 100으로 나눈 비율 (12.5% → 0.125)
//! 4. `n/a`, `na`, `nan` (대소문자 무관) → `Null`
//! 5. 그 외 → 쉼표 제거 후 숫자 파싱, 실패 시 원본 텍스트 보존

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::domain::FieldValue;
use crate::error::NormalizationError;

/// 값 없음을 나타내는 표기 (소문자 비교)
const NULL_MARKERS: [&str; 3] = ["n/a", "na", "nan"];

/// 날짜 파싱 형식 (시도 순서대로).
///
/// `%y`가 `%Y`보다 먼저 와야 "31-Dec-11"이 서기 11년으로 해석되지 않습니다.
const DATE_FORMATS: [&str; 7] = [
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%b %d %Y",
];

/// 원시 텍스트를 정규화합니다.
///
/// 해석할 수 없는 값은 에러 대신 원본 텍스트(`FieldValue::Text`)로 보존합니다.
/// 잘못된 필드 하나가 레코드 전체를 중단시키지 않도록 하기 위함입니다.
///
/// ```
/// use rust_decimal_macros::dec;
/// use screener_core::{normalize, FieldValue};
///
/// assert_eq!(normalize("1.5B"), FieldValue::Number(dec!(1500000000)));
/// assert_eq!(normalize("12.5%"), FieldValue::Number(dec!(0.125)));
/// assert_eq!(normalize("N/A"), FieldValue::Null);
/// ```
pub fn normalize(raw: &str) -> FieldValue {
    match try_normalize(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::trace!(raw = raw, error = %e, "정규화 실패, 원본 값 보존");
            FieldValue::Text(raw.trim().to_string())
        }
    }
}

/// 원시 텍스트를 정규화하되, 해석 실패를 에러로 반환합니다.
pub fn try_normalize(raw: &str) -> Result<FieldValue, NormalizationError> {
    let value = raw.trim();

    if value.is_empty() {
        return Ok(FieldValue::Null);
    }

    if let Some((digits, multiplier)) = split_magnitude(value) {
        let number = parse_number(digits)?;
        let scaled = number
            .checked_mul(multiplier)
            .ok_or_else(|| NormalizationError::Overflow(value.to_string()))?;
        return Ok(FieldValue::Number(scaled.trunc().normalize()));
    }

    if value.contains('%') {
        let number = parse_number(&value.replace('%', ""))?;
        return Ok(FieldValue::Number(
            (number / Decimal::ONE_HUNDRED).normalize(),
        ));
    }

    if NULL_MARKERS.contains(&value.to_lowercase().as_str()) {
        return Ok(FieldValue::Null);
    }

    parse_number(value).map(|number| FieldValue::Number(number.normalize()))
}

/// 배율 접미사 분리.
///
/// "1.23B" → ("1.23", 1_000_000_000)
fn split_magnitude(value: &str) -> Option<(&str, Decimal)> {
    let last = value.chars().last()?;
    let multiplier = match last {
        'B' | 'b' => Decimal::from(1_000_000_000i64),
        'M' | 'm' => Decimal::from(1_000_000i64),
        'K' | 'k' => Decimal::from(1_000i64),
        _ => return None,
    };

    Some((&value[..value.len() - last.len_utf8()], multiplier))
}

/// 천 단위 구분자를 제거하고 숫자를 파싱합니다.
///
/// "1,234.5" → 1234.5, "1.2e3" → 1200
fn parse_number(text: &str) -> Result<Decimal, NormalizationError> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    if cleaned.is_empty() {
        return Err(NormalizationError::Unparsable(text.to_string()));
    }

    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .map_err(|_| NormalizationError::Unparsable(text.to_string()))
}

/// 자연어 날짜 텍스트를 달력 날짜로 변환합니다.
///
/// 연도가 없는 형식("Jun 30")은 `reference`의 연도로 보완합니다.
/// 해석할 수 없으면 `None`을 반환합니다 (문자열로 전파하지 않음).
pub fn parse_date(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let text = collapse_whitespace(text);
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(&text, format) {
            return Some(date);
        }
    }

    // 연도 없는 "Mon DD"
    NaiveDate::parse_from_str(&format!("{} {}", text, reference.year()), "%b %d %Y").ok()
}

/// 통계 라벨을 정규화합니다.
///
/// - 앞뒤 공백, 콜론 제거 / 줄바꿈을 공백으로 / `%` → `Percentage`
/// - 괄호 접미사:
///   - `(ttm)`, `(mrq)`, `(yoy)`는 기간 표기이므로 그대로 유지
///   - `3 month`, `10 day`, `prior month`는 기본 이름 앞의 접두어로 이동
///   - 그 외 괄호 내용은 버리고 괄호 앞 기본 이름만 유지
///
/// ```
/// use screener_core::canonical_label;
///
/// assert_eq!(canonical_label("Return on Assets (ttm):"), "Return on Assets (ttm)");
/// assert_eq!(canonical_label("Avg Vol (3 month)"), "3 month Avg Vol");
/// assert_eq!(canonical_label("Market Cap (intraday):"), "Market Cap");
/// ```
pub fn canonical_label(raw: &str) -> String {
    let name = raw
        .trim()
        .replace(':', "")
        .replace('\n', " ")
        .replace('%', "Percentage");
    let name = collapse_whitespace(&name);

    if !name.contains('(') {
        return name;
    }

    if name.contains("(ttm)") || name.contains("(mrq)") || name.contains("(yoy)") {
        return name;
    }

    let base = name
        .trim_end_matches(')')
        .split('(')
        .next()
        .unwrap_or_default()
        .trim();

    let label = if name.contains("3 month") {
        format!("3 month {}", base)
    } else if name.contains("10 day") {
        format!("10 day {}", base)
    } else if name.contains("prior month") {
        format!("Prior Month {}", base)
    } else {
        base.to_string()
    };

    collapse_whitespace(&label)
}

/// 연속된 공백을 하나로 합치고 앞뒤 공백을 제거합니다.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
