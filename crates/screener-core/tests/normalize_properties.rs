//! 값 정규화 속성 테스트
//!
//! 배율 접미사, 퍼센트, 멱등성을 임의 입력에 대해 검증합니다.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use screener_core::{normalize, FieldValue};

fn multiplier(suffix: char) -> Decimal {
    match suffix.to_ascii_uppercase() {
        'B' => dec!(1000000000),
        'M' => dec!(1000000),
        _ => dec!(1000),
    }
}

proptest! {
    #[test]
    fn magnitude_suffix_scales_exactly(
        units in 0i64..1_000_000,
        hundredths in 0i64..100,
        negative in any::<bool>(),
        suffix in prop::sample::select(vec!['B', 'b', 'M', 'm', 'K', 'k']),
    ) {
        let sign = if negative { "-" } else { "" };
        let raw = format!("{}{}.{:02}{}", sign, units, hundredths, suffix);

        let mut base = Decimal::new(units * 100 + hundredths, 2);
        if negative {
            base = -base;
        }
        let expected = (base * multiplier(suffix)).trunc();

        prop_assert_eq!(normalize(&raw), FieldValue::Number(expected));
    }

    #[test]
    fn percentage_divides_by_hundred(cents in -10_000_000i64..10_000_000) {
        let value = Decimal::new(cents, 2);
        let plain = normalize(&value.to_string());
        let percent = normalize(&format!("{}%", value));

        let expected = plain.as_decimal().map(|v| v / dec!(100));
        prop_assert_eq!(percent.as_decimal(), expected);
    }

    #[test]
    fn normalize_is_idempotent_on_numbers(
        mantissa in -1_000_000_000i64..1_000_000_000,
        scale in 0u32..6,
        suffix in prop::sample::select(vec!["", "%", "B", "M", "K"]),
    ) {
        let raw = format!("{}{}", Decimal::new(mantissa, scale), suffix);
        let once = normalize(&raw);
        let twice = normalize(&once.to_string());

        prop_assert!(once.as_decimal().is_some());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalize_never_panics(raw in ".{0,24}") {
        let _ = normalize(&raw);
    }
}

#[test]
fn thousands_separators_are_ignored() {
    assert_eq!(normalize("1,234,567.89"), FieldValue::Number(dec!(1234567.89)));
    assert_eq!(normalize("12,345.6M"), FieldValue::Number(dec!(12345600000)));
}
