//! 프로세스 내 실행기.

use async_trait::async_trait;
use chrono::Utc;
use screener_core::{FieldCatalog, SourceConfig};
use screener_data::{build_fundamentals_row, extract_key_stats, extract_tickers, DocumentFetcher};
use std::sync::Arc;
use tracing::debug;

use super::{JobExecutor, JobOutcome, StageJob, StageOutput};
use crate::error::JobError;

/// 현재 프로세스에서 문서를 조회하고 추출하는 실행기.
///
/// 동시성은 파이프라인이 제어하므로 청크 안의 작업은 순서대로 실행합니다.
pub struct LocalExecutor {
    fetcher: Arc<dyn DocumentFetcher>,
    source: SourceConfig,
    catalog: Arc<FieldCatalog>,
}

impl LocalExecutor {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        source: SourceConfig,
        catalog: Arc<FieldCatalog>,
    ) -> Self {
        Self {
            fetcher,
            source,
            catalog,
        }
    }

    async fn run(&self, job: StageJob) -> JobOutcome {
        match job {
            StageJob::ListTickers { industry } => {
                let url = self.source.industry_url(industry.id);
                let html = self.fetcher.fetch(&url).await?;
                let tickers = extract_tickers(&html, &industry)?;
                debug!(industry_id = industry.id, count = tickers.len(), "종목 목록 추출");
                Ok(StageOutput::Tickers(tickers))
            }
            StageJob::FetchKeyStats { ticker } => {
                let url = self.source.keystats_url(&ticker.symbol);
                let html = self.fetcher.fetch(&url).await?;
                let stats = extract_key_stats(&html)?;
                let row = build_fundamentals_row(&ticker, &stats, &self.catalog, Utc::now());
                debug!(ticker = %ticker.symbol, fields = row.fields.len(), "통계 추출");
                Ok(StageOutput::Fundamentals(row))
            }
        }
    }
}

#[async_trait]
impl JobExecutor for LocalExecutor {
    async fn execute(&self, jobs: Vec<StageJob>) -> Result<Vec<JobOutcome>, JobError> {
        let mut outcomes = Vec::with_capacity(jobs.len());
        for job in jobs {
            outcomes.push(self.run(job).await);
        }
        Ok(outcomes)
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::{IndustryRef, TickerRecord};
    use screener_data::StaticFetcher;

    const KEYSTATS: &str = r#"<html><body>
<table class="yfnc_datamodoutline1"><tr><td><table>
  <tr><td class="yfnc_tablehead1">Trailing P/E (ttm, intraday):</td><td class="yfnc_tabledata1">7.20</td></tr>
</table></td></tr></table></body></html>"#;

    #[tokio::test]
    async fn test_outcomes_keep_job_order() {
        let source = SourceConfig::default();
        let fetcher = StaticFetcher::new()
            .with_page(source.keystats_url("ACME"), KEYSTATS)
            .with_page(source.industry_url(112), "<html><body>moved</body></html>");

        let executor = LocalExecutor::new(
            Arc::new(fetcher),
            source,
            Arc::new(FieldCatalog::embedded().unwrap()),
        );

        let jobs = vec![
            StageJob::FetchKeyStats { ticker: TickerRecord::new("ACME", "Technology", "Widgets") },
            StageJob::FetchKeyStats { ticker: TickerRecord::new("GONE", "Technology", "Widgets") },
            StageJob::ListTickers { industry: IndustryRef::new(112, "Agricultural Chemicals", "Basic Materials") },
        ];

        let outcomes = executor.execute(jobs).await.unwrap();
        assert_eq!(outcomes.len(), 3);

        match &outcomes[0] {
            Ok(StageOutput::Fundamentals(row)) => assert_eq!(row.ticker, "ACME"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(outcomes[1], Err(JobError::Fetch(_))));
        assert!(matches!(outcomes[2], Err(JobError::Extraction(_))));
    }
}
