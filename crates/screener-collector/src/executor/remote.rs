//! 원격 작업 서비스 실행기.
//!
//! `POST {endpoint}/jobs`로 작업 묶음을 JSON으로 보내고, 같은 순서의 결과 목록을 받습니다.
//!
//! ```text
//! 요청: {"jobs": [{"kind": "fetch_key_stats", "ticker": {...}}, ...]}
//! 응답: [{"Ok": {"kind": "fundamentals", "data": {...}}}, {"Err": {"kind": "transient", "detail": "..."}}]
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{JobExecutor, JobOutcome, StageJob};
use crate::error::JobError;

#[derive(Serialize)]
struct JobBatch<'a> {
    jobs: &'a [StageJob],
}

/// HTTP 작업 서비스에 청크를 위임하는 실행기.
pub struct RemoteExecutor {
    client: Client,
    endpoint: String,
}

impl RemoteExecutor {
    /// `timeout`은 청크 전체 처리 시간 기준입니다.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, JobError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JobError::Fetch(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    fn jobs_url(&self) -> String {
        format!("{}/jobs", self.endpoint)
    }
}

#[async_trait]
impl JobExecutor for RemoteExecutor {
    async fn execute(&self, jobs: Vec<StageJob>) -> Result<Vec<JobOutcome>, JobError> {
        let url = self.jobs_url();
        debug!(url = %url, count = jobs.len(), "원격 실행 요청");

        let response = self
            .client
            .post(&url)
            .json(&JobBatch { jobs: &jobs })
            .send()
            .await
            .map_err(|e| JobError::Transient(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = format!("{}: HTTP {}", url, status.as_u16());
            warn!(status = status.as_u16(), "원격 실행 실패");
            return Err(if status.is_server_error() || status.as_u16() == 429 {
                JobError::Transient(detail)
            } else {
                JobError::Fetch(detail)
            });
        }

        let outcomes: Vec<JobOutcome> = response
            .json()
            .await
            .map_err(|e| JobError::Transient(format!("원격 응답 해석 실패: {}", e)))?;

        if outcomes.len() != jobs.len() {
            return Err(JobError::Transient(format!(
                "원격 응답 개수 불일치: 요청 {}, 응답 {}",
                jobs.len(),
                outcomes.len()
            )));
        }

        Ok(outcomes)
    }

    fn name(&self) -> &str {
        "remote"
    }
}
