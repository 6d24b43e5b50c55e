//! 통계 필드 카탈로그.
//!
//! 통계 페이지의 정규화된 라벨을 `fundamentals` 테이블의 정규 컬럼명과
//! 필드 종류(숫자/날짜/텍스트)로 매핑합니다.
//!
//! 기본 카탈로그는 크레이트에 포함된 `fields.toml`이며,
//! 실행 시 다른 TOML 파일로 교체할 수 있습니다.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::ConfigError;

/// 크레이트에 포함된 기본 필드 카탈로그.
const EMBEDDED_CATALOG: &str = include_str!("../fields.toml");

/// 필드 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// 숫자 (정규화 결과가 숫자여야 저장)
    #[default]
    Number,
    /// 날짜 (원시 텍스트에서 날짜 파싱)
    Date,
    /// 텍스트 (원본 보존, 예: 분할 비율 "2:1")
    Text,
}

/// 카탈로그 항목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// 정규화된 라벨
    pub label: String,
    /// 정규 컬럼명
    pub column: String,
    /// 필드 종류
    #[serde(default)]
    pub kind: FieldKind,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(rename = "field", default)]
    fields: Vec<FieldSpec>,
}

/// 라벨 → 컬럼 매핑 카탈로그.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    fields: Vec<FieldSpec>,
    by_label: HashMap<String, usize>,
    by_column: HashMap<String, usize>,
}

impl FieldCatalog {
    /// 기본 내장 카탈로그를 로드합니다.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(EMBEDDED_CATALOG)
    }

    /// TOML 파일에서 카탈로그를 로드합니다.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// TOML 문자열에서 카탈로그를 파싱합니다.
    ///
    /// 라벨이나 컬럼이 중복되면 에러를 반환합니다.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_fields(file.fields)
    }

    /// 항목 목록으로 카탈로그를 생성합니다.
    pub fn from_fields(fields: Vec<FieldSpec>) -> Result<Self, ConfigError> {
        if fields.is_empty() {
            return Err(ConfigError::InvalidCatalog("항목이 없습니다".to_string()));
        }

        let mut by_label = HashMap::with_capacity(fields.len());
        let mut by_column = HashMap::with_capacity(fields.len());

        for (idx, field) in fields.iter().enumerate() {
            if field.column.trim().is_empty() {
                return Err(ConfigError::InvalidCatalog(format!(
                    "빈 컬럼명: {}",
                    field.label
                )));
            }
            if by_label.insert(field.label.clone(), idx).is_some() {
                return Err(ConfigError::InvalidCatalog(format!(
                    "중복 라벨: {}",
                    field.label
                )));
            }
            if by_column.insert(field.column.clone(), idx).is_some() {
                return Err(ConfigError::InvalidCatalog(format!(
                    "중복 컬럼: {}",
                    field.column
                )));
            }
        }

        Ok(Self {
            fields,
            by_label,
            by_column,
        })
    }

    /// 정규화된 라벨로 항목을 조회합니다.
    pub fn lookup(&self, label: &str) -> Option<&FieldSpec> {
        self.by_label.get(label).map(|&idx| &self.fields[idx])
    }

    /// 컬럼의 필드 종류를 조회합니다.
    pub fn kind_of(&self, column: &str) -> Option<FieldKind> {
        self.by_column.get(column).map(|&idx| self.fields[idx].kind)
    }

    /// 카탈로그에 정의된 컬럼인지 확인합니다.
    pub fn contains_column(&self, column: &str) -> bool {
        self.by_column.contains_key(column)
    }

    /// 전체 컬럼명 (정의 순서).
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.column.as_str())
    }

    /// 전체 항목.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// 특정 종류의 컬럼 집합.
    pub fn columns_of_kind(&self, kind: FieldKind) -> HashSet<&str> {
        self.fields
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| f.column.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog() {
        let catalog = FieldCatalog::embedded().unwrap();

        assert_eq!(catalog.len(), 57);
        assert_eq!(catalog.lookup("Trailing P/E").unwrap().column, "trailing_pe");
        assert_eq!(catalog.lookup("Return on Assets (ttm)").unwrap().column, "roa_ttm");
        assert_eq!(catalog.lookup("3 month Avg Vol").unwrap().column, "3m_avg_vol");
        assert!(catalog.lookup("Unknown Label").is_none());

        assert_eq!(catalog.kind_of("ex_div_date"), Some(FieldKind::Date));
        assert_eq!(catalog.kind_of("last_split_factor"), Some(FieldKind::Text));
        assert_eq!(catalog.kind_of("market_cap"), Some(FieldKind::Number));

        let dates = catalog.columns_of_kind(FieldKind::Date);
        assert_eq!(dates.len(), 5);
        assert!(dates.contains("mrq"));
        assert!(dates.contains("fsc_year_end"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let content = r#"
[[field]]
label = "Beta"
column = "beta"

[[field]]
label = "Beta (3y)"
column = "beta"
"#;
        let result = FieldCatalog::from_toml_str(content);
        assert!(matches!(result, Err(ConfigError::InvalidCatalog(_))));
    }

    #[test]
    fn test_kind_defaults_to_number() {
        let content = r#"
[[field]]
label = "Beta"
column = "beta"
"#;
        let catalog = FieldCatalog::from_toml_str(content).unwrap();
        assert_eq!(catalog.kind_of("beta"), Some(FieldKind::Number));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(FieldCatalog::from_toml_str("").is_err());
    }
}
