//! 업종 참조.

use serde::{Deserialize, Serialize};

/// 업종 디렉터리 페이지에서 발견된 업종.
///
/// 한 번의 수집 실행 안에서만 생성/소비되는 불변 값입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndustryRef {
    /// 데이터 소스의 업종 ID (URL에 사용)
    pub id: u32,
    /// 업종명
    pub name: String,
    /// 소속 섹터명
    pub sector: String,
}

impl IndustryRef {
    /// 새 업종 참조를 생성합니다.
    pub fn new(id: u32, name: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            sector: sector.into(),
        }
    }
}

impl std::fmt::Display for IndustryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}) #{}", self.name, self.sector, self.id)
    }
}
