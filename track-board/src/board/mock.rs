//! Replay transport for running without network access.
//!
//! Serves a fixed status and body, typically a page captured from the live
//! site, and remembers what was requested.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use super::error::FetchError;
use super::transport::{RawResponse, Transport};

/// A request seen by [`StaticTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub referer: String,
}

/// Transport that answers every GET with the same response.
#[derive(Debug, Clone)]
pub struct StaticTransport {
    response: RawResponse,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StaticTransport {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            response: RawResponse {
                status,
                body: body.into(),
            },
            requests: Arc::default(),
        }
    }

    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// A 200 response whose body is a page saved to disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::ok(body))
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for StaticTransport {
    async fn get(&self, url: &str, referer: &str) -> Result<RawResponse, FetchError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                url: url.to_string(),
                referer: referer.to_string(),
            });
        Ok(self.response.clone())
    }
}
