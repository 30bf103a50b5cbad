//! Board fetch error types.

/// Errors from fetching the station board.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The site answered with a non-success status.
    #[error("failed to fetch board: {status}: {body}")]
    Status { status: u16, body: String },

    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured header value is not valid for HTTP.
    #[error("invalid header value for {name}")]
    InvalidHeader { name: &'static str },

    /// A captured page could not be read from disk.
    #[error("failed to read captured page {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FetchError::Status {
            status: 404,
            body: "Not Found".into(),
        };
        assert_eq!(err.to_string(), "failed to fetch board: 404: Not Found");

        let err = FetchError::InvalidHeader { name: "Referer" };
        assert_eq!(err.to_string(), "invalid header value for Referer");
    }
}
