//! 도메인 모델.
//!
//! - [`IndustryRef`]: 업종 디렉터리에서 발견된 업종 참조
//! - [`TickerRecord`]: 업종 페이지에서 발견된 종목 (+ 섹터/업종 집계 지표)
//! - [`KeyStat`], [`FieldValue`]: 통계 페이지의 정규화된 단일 필드
//! - [`FundamentalsRow`], [`RankedRow`]: 종목별 통계 레코드와 랭킹 결과

pub mod fundamentals;
pub mod industry;
pub mod ticker;

pub use fundamentals::*;
pub use industry::*;
pub use ticker::*;
