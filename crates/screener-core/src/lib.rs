//! # Screener Core
//!
//! 펀더멘털 스크리너의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 수집 파이프라인과 랭킹 엔진 전반에서 사용되는 기본 타입을 제공합니다:
//! - 업종/종목/통계 도메인 모델
//! - 원시 텍스트 값 정규화 (`"1.23B"`, `"45.6%"`, `"N/A"`, 날짜)
//! - 통계 필드 카탈로그 (라벨 → 정규 컬럼)
//! - 설정 관리
//! - 로깅 인프라

pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod normalize;

pub use catalog::{FieldCatalog, FieldKind, FieldSpec};
pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use normalize::{canonical_label, normalize, parse_date, try_normalize};
