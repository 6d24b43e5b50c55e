//! 문서 조회, 페이지 추출, 영속화.
//!
//! 이 crate는 다음을 제공합니다:
//! - 문서 조회 능력 ([`DocumentFetcher`]): reqwest 기반 HTTP 구현과 고정 응답 구현
//! - 페이지 추출기: 업종 디렉터리, 업종 페이지, 종목 통계 페이지
//! - 영속화 어댑터 ([`FundamentalsStore`]): PostgreSQL 및 메모리 구현

pub mod error;
pub mod extract;
pub mod fetch;
pub mod storage;

pub use error::{ExtractionError, FetchError, PersistenceError};
pub use extract::{build_fundamentals_row, extract_industries, extract_key_stats, extract_tickers};
pub use fetch::{DocumentFetcher, HttpFetcher, StaticFetcher, DEFAULT_TIMEOUT};
pub use storage::{FundamentalsStore, InMemoryStore, PgFundamentalsStore};
