//! 업종 디렉터리 조회.

use screener_core::{DiscoveryConfig, IndustryRef, SourceConfig};
use screener_data::{extract_industries, DocumentFetcher};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{CollectorError, JobError, Result};
use crate::retry::{sleep_or_cancel, RetryPolicy};

/// 디렉터리 페이지에서 수집 대상 업종을 찾습니다.
///
/// 일시적 조회 실패는 재시도합니다. 페이지 구조가 바뀌었으면 빈 목록을 반환하고,
/// 재시도를 소진하면 수집 자체가 불가능하므로 [`CollectorError::Collection`]을 반환합니다.
pub async fn discover_industries(
    fetcher: &dyn DocumentFetcher,
    source: &SourceConfig,
    discovery: &DiscoveryConfig,
    retry: &RetryPolicy,
    cancel: &CancellationToken,
) -> Result<Vec<IndustryRef>> {
    let url = &source.directory_url;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match fetcher.fetch(url).await {
            Ok(html) => {
                return Ok(match extract_industries(&html, discovery) {
                    Ok(industries) => {
                        info!(count = industries.len(), "업종 목록 수집 완료");
                        industries
                    }
                    Err(e) => {
                        warn!(url = %url, error = %e, "디렉터리 구조 불일치, 업종 없음으로 처리");
                        Vec::new()
                    }
                });
            }
            Err(e) => {
                let err = JobError::from(e);
                if !retry.should_retry(attempt, &err) {
                    return Err(CollectorError::Collection(err.to_string()));
                }
                warn!(url = %url, attempt = attempt, error = %err, "디렉터리 조회 실패, 재시도 예정");
                if !sleep_or_cancel(retry.next_delay(), cancel).await {
                    return Err(CollectorError::Cancelled);
                }
            }
        }
    }
}
