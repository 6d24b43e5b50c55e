//! 설정 관리.
//!
//! 데이터 소스 URL, 업종/섹터 제외 목록, 랭킹 임계값, 메시지 형식 등
//! 스크리너 전반의 설정을 정의합니다. 모든 항목은 기본값을 가지므로
//! 설정 파일 없이도 동작합니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::ConfigError;

/// 스크리너 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// 데이터 소스 설정
    pub source: SourceConfig,
    /// 업종 탐색 설정
    pub discovery: DiscoveryConfig,
    /// 랭킹 설정
    pub ranking: RankingConfig,
    /// 메시지 발행 설정
    pub publish: PublishConfig,
}

impl ScreenerConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값에 환경 변수(`SCREENER__RANKING__TOP_N` 등)만 적용합니다.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("SCREENER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// 데이터 소스 URL 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 섹터/업종 디렉터리 페이지
    pub directory_url: String,
    /// 업종 페이지 템플릿 (`{id}` 치환)
    pub industry_url_template: String,
    /// 종목 통계 페이지 템플릿 (`{ticker}` 치환)
    pub keystats_url_template: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            directory_url: "http://biz.yahoo.com/p/sum_conameu.html".to_string(),
            industry_url_template: "http://biz.yahoo.com/p/{id}conameu.html".to_string(),
            keystats_url_template: "http://finance.yahoo.com/q/ks?s={ticker}".to_string(),
        }
    }
}

impl SourceConfig {
    /// 업종 페이지 URL.
    pub fn industry_url(&self, industry_id: u32) -> String {
        self.industry_url_template
            .replace("{id}", &industry_id.to_string())
    }

    /// 종목 통계 페이지 URL.
    pub fn keystats_url(&self, ticker: &str) -> String {
        self.keystats_url_template.replace("{ticker}", ticker)
    }
}

/// 업종 탐색 필터.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// 제외할 업종명 (정확히 일치)
    pub excluded_industries: BTreeSet<String>,
    /// 포함할 섹터명 (없으면 전체)
    pub included_sectors: Option<BTreeSet<String>>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            excluded_industries: to_set(&MAGIC_FORMULA_EXCLUDED_INDUSTRIES),
            included_sectors: None,
        }
    }
}

impl DiscoveryConfig {
    /// 업종을 탐색 대상에 포함할지 확인합니다.
    pub fn accepts(&self, industry: &str, sector: &str) -> bool {
        if self.excluded_industries.contains(industry) {
            return false;
        }

        match &self.included_sectors {
            Some(sectors) => sectors.contains(sector),
            None => true,
        }
    }
}

/// 섹터/업종/설명 기반 제외 규칙.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExclusionConfig {
    /// 제외 섹터명
    pub sectors: BTreeSet<String>,
    /// 제외 업종명
    pub industries: BTreeSet<String>,
    /// 설명(회사명)에 포함되면 제외할 단어 (대소문자 무관)
    pub banned_terms: Vec<String>,
    /// 설명(회사명)이 이 접미사로 끝나면 제외 (대소문자 무관)
    pub banned_suffixes: Vec<String>,
}

impl ExclusionConfig {
    /// 섹터/업종/설명 중 하나라도 제외 규칙에 걸리는지 확인합니다.
    pub fn excludes(&self, sector: &str, industry: &str, description: Option<&str>) -> bool {
        if self.sectors.contains(sector) || self.industries.contains(industry) {
            return true;
        }

        let Some(description) = description else {
            return false;
        };
        let description = description.to_lowercase();

        self.banned_terms
            .iter()
            .any(|term| description.contains(&term.to_lowercase()))
            || self
                .banned_suffixes
                .iter()
                .any(|suffix| description.ends_with(&suffix.to_lowercase()))
    }
}

/// 랭킹 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RankingConfig {
    /// 선정 종목 수
    pub top_n: usize,
    /// 기본 전략 이름
    pub strategy: String,
    /// Magic Formula 전략 설정
    pub magic_formula: MagicFormulaConfig,
    /// 자본수익률/배당수익률 전략 설정
    pub return_on_capital_yield: ReturnOnCapitalYieldConfig,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: 15,
            strategy: "magic_formula".to_string(),
            magic_formula: MagicFormulaConfig::default(),
            return_on_capital_yield: ReturnOnCapitalYieldConfig::default(),
        }
    }
}

/// Magic Formula (ROA + P/E) 전략 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MagicFormulaConfig {
    /// 최소 ROA (비율, 0.25 = 25%)
    pub min_return_on_assets: Decimal,
    /// 최소 P/E (이상)
    pub min_pe: Decimal,
    /// 최소 시가총액
    pub min_market_cap: Decimal,
    /// 제외 규칙
    pub exclusions: ExclusionConfig,
}

impl Default for MagicFormulaConfig {
    fn default() -> Self {
        Self {
            min_return_on_assets: dec!(0.25),
            min_pe: dec!(5),
            min_market_cap: dec!(30000000),
            exclusions: ExclusionConfig {
                industries: to_set(&MAGIC_FORMULA_EXCLUDED_INDUSTRIES),
                ..Default::default()
            },
        }
    }
}

/// 자본수익률/배당수익률 전략 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReturnOnCapitalYieldConfig {
    /// 최소 시가총액
    pub min_market_cap: Decimal,
    /// P/E 하한 (초과)
    pub min_pe: Decimal,
    /// P/E 상한 (미만)
    pub max_pe: Decimal,
    /// 최소 배당수익률 (초과, 비율)
    pub min_dividend_yield: Decimal,
    /// 제외 규칙
    pub exclusions: ExclusionConfig,
}

impl Default for ReturnOnCapitalYieldConfig {
    fn default() -> Self {
        Self {
            min_market_cap: dec!(50000000),
            min_pe: dec!(5),
            max_pe: dec!(25),
            min_dividend_yield: dec!(0.06),
            exclusions: ExclusionConfig {
                sectors: to_set(&YIELD_EXCLUDED_SECTORS),
                industries: to_set(&YIELD_EXCLUDED_INDUSTRIES),
                banned_terms: ["energy", "financ", "invest", "bank", "banc", "equity"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                banned_suffixes: [" ads", " adr", " s.a."]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            },
        }
    }
}

/// 메시지 발행 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublishConfig {
    /// 메시지 접두어
    pub prefix: String,
    /// 메시지 최대 길이 (문자 수)
    pub max_length: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            prefix: "MF".to_string(),
            max_length: 140,
        }
    }
}

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// 금융/유틸리티/에너지 업종 (Magic Formula 대상 아님).
const MAGIC_FORMULA_EXCLUDED_INDUSTRIES: [&str; 24] = [
    "Accident & Health Insurance",
    "Asset Management",
    "Closed-End Fund - Debt",
    "Closed-End Fund - Equity",
    "Closed-End Fund - Foreign",
    "Credit Services",
    "Diversified Investments",
    "Diversified Utilities",
    "Electric Utilities",
    "Foreign Money Center Banks",
    "Foreign Regional Banks",
    "Foreign Utilities",
    "Gas Utilities",
    "Independent Oil & Gas",
    "Investment Brokerage - Regional",
    "Money Center Banks",
    "Mortgage Investment",
    "Regional - Mid-Atlantic Banks",
    "Regional - Midwest Banks",
    "Regional - Northeast Banks",
    "Regional - Pacific Banks",
    "Regional - Southeast Banks",
    "Regional - Southwest Banks",
    "Water Utilites",
];

const YIELD_EXCLUDED_SECTORS: [&str; 3] = [
    "Finance - Savings and Loans",
    "Closed-End Investment Bond Funds",
    "Banks and Finance",
];

const YIELD_EXCLUDED_INDUSTRIES: [&str; 34] = [
    // 유틸리티
    "Power Generation",
    "Electric Utilities: Central",
    // 금융
    "Savings Institutions",
    "Accident &Health Insurance",
    "Finance Companies",
    "Finance/Investors Services",
    "Commercial Banks",
    "Closed-End Fund - Foreign",
    "Closed-End Fund - Equity",
    "Water Supply",
    "Finance: Consumer Services",
    "Major Banks",
    "Investment Bankers/Brokers/Service",
    "Diversified Financial Services",
    "Savings & Loans",
    "Credit Services",
    "Diversified Investments",
    "Financial Services",
    "Banks",
    "Regional - Pacific Banks",
    "Regional - Mid-Atlantic Banks",
    "Real Estate Investment Trusts",
    "Investment Managers",
    "Life Insurance",
    "Property-Casualty Insurers",
    "Closed-End Fund - Debt",
    "Specialty Insurers",
    // 석유/가스
    "Oil & Gas Production",
    "Integrated oil Companies",
    "Oil Refining/Marketing",
    "Oil/Gas Transmission",
    "Oilfield Services/Equipment",
    "Independent Oil & Gas",
    "Natural Gas Distribution",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScreenerConfig::default();

        assert_eq!(config.ranking.top_n, 15);
        assert_eq!(config.publish.prefix, "MF");
        assert_eq!(config.publish.max_length, 140);
        assert_eq!(config.ranking.magic_formula.min_market_cap, dec!(30000000));
        assert_eq!(
            config.ranking.return_on_capital_yield.exclusions.industries.len(),
            34
        );
        assert!(config.discovery.excluded_industries.contains("Money Center Banks"));
    }

    #[test]
    fn test_url_templates() {
        let source = SourceConfig::default();
        assert_eq!(
            source.industry_url(112),
            "http://biz.yahoo.com/p/112conameu.html"
        );
        assert_eq!(
            source.keystats_url("ACME"),
            "http://finance.yahoo.com/q/ks?s=ACME"
        );
    }

    #[test]
    fn test_discovery_filter() {
        let mut discovery = DiscoveryConfig::default();
        assert!(!discovery.accepts("Money Center Banks", "Financial"));
        assert!(discovery.accepts("Semiconductor - Broad Line", "Technology"));

        discovery.included_sectors = Some(to_set(&["Technology"]));
        assert!(discovery.accepts("Semiconductor - Broad Line", "Technology"));
        assert!(!discovery.accepts("Trucking", "Services"));
    }

    #[test]
    fn test_exclusion_rules() {
        let exclusions = ReturnOnCapitalYieldConfig::default().exclusions;

        assert!(exclusions.excludes("Banks and Finance", "Anything", None));
        assert!(exclusions.excludes("Technology", "Major Banks", None));
        assert!(exclusions.excludes("Technology", "Software", Some("First Bancorp")));
        assert!(exclusions.excludes("Technology", "Software", Some("Telefonica S.A.")));
        assert!(exclusions.excludes("Technology", "Software", Some("Sony Corp ADR")));
        assert!(!exclusions.excludes("Technology", "Software", Some("Acme Widgets Inc")));
        assert!(!exclusions.excludes("Technology", "Software", None));
    }
}
