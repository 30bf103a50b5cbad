//! HTTP transport for the board page.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderValue, REFERER};

use super::error::FetchError;

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can GET a page with a `Referer` header.
///
/// Any status is returned as a response; only transport failures
/// (connect, timeout, body read) are errors here.
pub trait Transport {
    fn get(
        &self,
        url: &str,
        referer: &str,
    ) -> impl Future<Output = Result<RawResponse, FetchError>> + Send;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str, referer: &str) -> Result<RawResponse, FetchError> {
        // The site rejects requests that do not come from its own pages.
        let referer = HeaderValue::from_str(referer)
            .map_err(|_| FetchError::InvalidHeader { name: "Referer" })?;

        let response = self.http.get(url).header(REFERER, referer).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        let ok = |status| RawResponse {
            status,
            body: String::new(),
        };
        assert!(ok(200).is_success());
        assert!(ok(204).is_success());
        assert!(!ok(199).is_success());
        assert!(!ok(301).is_success());
        assert!(!ok(404).is_success());
        assert!(!ok(503).is_success());
    }

    #[test]
    fn transport_creation() {
        assert!(HttpTransport::new(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test]
    async fn rejects_invalid_referer() {
        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport
            .get("http://127.0.0.1:9/", "bad\nreferer")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidHeader { name: "Referer" }));
    }
}
