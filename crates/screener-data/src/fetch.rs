//! 문서 조회.
//!
//! 파이프라인은 `fetch(url) -> document` 능력에만 의존합니다.
//! 실제 HTTP 구현([`HttpFetcher`])과 프로세스 내 고정 응답 구현([`StaticFetcher`])을 제공합니다.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

use crate::error::FetchError;

/// 기본 요청 타임아웃
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 문서 조회 능력.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// URL의 문서 본문을 반환합니다.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// reqwest 기반 HTTP 문서 조회기.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// 주어진 타임아웃으로 생성합니다.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    /// 기존 클라이언트로 생성합니다.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify(url, e))?;
        debug!(url = url, bytes = body.len(), "문서 조회 완료");

        Ok(body)
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http(error)
    }
}

/// 고정 응답을 반환하는 문서 조회기.
///
/// 네트워크 없이 파이프라인을 실행할 때 사용합니다.
/// URL별로 지정한 횟수만큼 타임아웃을 먼저 반환하도록 설정할 수 있습니다.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
    failures: Mutex<HashMap<String, u32>>,
    calls: Mutex<HashMap<String, u32>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL에 대한 응답 문서를 등록합니다.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// URL에 대해 처음 `count`번은 타임아웃을 반환하도록 설정합니다.
    pub fn with_transient_failures(self, url: impl Into<String>, count: u32) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(url.into(), count);
        }
        self
    }

    /// URL이 조회된 횟수.
    pub fn calls(&self, url: &str) -> u32 {
        self.calls
            .lock()
            .map(|calls| calls.get(url).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(url.to_string()).or_insert(0) += 1;
        }

        let should_fail = match self.failures.lock() {
            Ok(mut failures) => match failures.get_mut(url) {
                Some(remaining) if *remaining > 0 => {
                    *remaining -= 1;
                    true
                }
                _ => false,
            },
            Err(_) => false,
        };
        if should_fail {
            return Err(FetchError::Timeout {
                url: url.to_string(),
            });
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_fetcher_returns_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/p/112conameu.html")
            .with_status(200)
            .with_body("<html><body>ok</body></html>")
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let body = fetcher
            .fetch(&format!("{}/p/112conameu.html", server.url()))
            .await
            .unwrap();

        assert!(body.contains("ok"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_fetcher_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/q/ks")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let result = fetcher.fetch(&format!("{}/q/ks?s=ACME", server.url())).await;

        let err = result.unwrap_err();
        assert!(matches!(err, FetchError::RateLimited { .. }));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_http_fetcher_not_found_is_permanent() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_static_fetcher_scripted_failures() {
        let fetcher = StaticFetcher::new()
            .with_page("http://x/a", "A")
            .with_transient_failures("http://x/a", 2);

        assert!(fetcher.fetch("http://x/a").await.is_err());
        assert!(fetcher.fetch("http://x/a").await.is_err());
        assert_eq!(fetcher.fetch("http://x/a").await.unwrap(), "A");
        assert_eq!(fetcher.calls("http://x/a"), 3);

        let missing = fetcher.fetch("http://x/b").await.unwrap_err();
        assert!(!missing.is_transient());
    }
}
