//! Remote screenshot acquisition.
//!
//! A single `reqwest::Client` is built once at startup and shared by every
//! request; per-request work is one bounded retry loop around a plain GET.
//! Redirects are followed by the client, so only the final landed status
//! decides success.

mod retry;

pub use retry::{with_retry, RetryPolicy};

use bytes::Bytes;
use shotrelay_core::Config;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

// Some screenshot hosts reject default client signatures, so we present a
// conventional browser identity.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "image/avif,image/webp,image/apng,image/*,*/*;q=0.8";

/// Failure class callers key off when mapping to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Network,
    Timeout,
    BadStatus,
}

/// A failed fetch, tagged with its class and whether a retry makes sense.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    kind: FetchErrorKind,
    transient: bool,
    message: String,
    #[source]
    source: Option<reqwest::Error>,
}

impl FetchError {
    pub(crate) fn new(
        kind: FetchErrorKind,
        transient: bool,
        message: String,
        source: Option<reqwest::Error>,
    ) -> Self {
        Self {
            kind,
            transient,
            message,
            source,
        }
    }

    pub fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    /// Whether the failure is expected to succeed on retry without any
    /// input change (reset, timeout, temporary DNS failure, abort, hang-up).
    pub fn is_transient(&self) -> bool {
        self.transient
    }

    fn bad_status(url: &str, status: reqwest::StatusCode) -> Self {
        Self::new(
            FetchErrorKind::BadStatus,
            false,
            format!("{} answered with status {}", url, status),
            None,
        )
    }

    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::new(
                FetchErrorKind::Timeout,
                true,
                format!("timed out fetching {}", url),
                Some(err),
            );
        }
        let transient = has_transient_cause(&err);
        Self::new(
            FetchErrorKind::Network,
            transient,
            format!("network failure fetching {}: {}", url, err),
            Some(err),
        )
    }
}

/// I/O error kinds that are worth a retry. Refused connections and unknown
/// hosts are not in this set: they will not fix themselves within our
/// backoff window.
fn transient_io_kind(kind: std::io::ErrorKind) -> bool {
    matches!(
        kind,
        std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::BrokenPipe
            | std::io::ErrorKind::TimedOut
    )
}

fn has_transient_cause(err: &reqwest::Error) -> bool {
    use std::error::Error;

    let mut cause: Option<&(dyn Error + 'static)> = err.source();
    while let Some(inner) = cause {
        if let Some(io_err) = inner.downcast_ref::<std::io::Error>() {
            if transient_io_kind(io_err.kind()) {
                return true;
            }
        }
        let text = inner.to_string();
        // A bare hang-up surfaces as hyper's incomplete-message error; hyper
        // is not a direct dependency, so match on its message.
        if text.contains("connection closed before message completed") {
            return true;
        }
        // EAI_AGAIN from the resolver; NXDOMAIN renders differently and
        // stays terminal.
        if text.contains("Temporary failure in name resolution") {
            return true;
        }
        cause = inner.source();
    }
    false
}

/// Fetches remote screenshots into memory with bounded retry.
pub struct ScreenshotFetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}

impl ScreenshotFetcher {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(BROWSER_ACCEPT),
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(
                config.fetch_max_redirects,
            ))
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .pool_max_idle_per_host(config.fetch_max_idle_per_host)
            // Screenshot hosts with broken IPv6 paths stall the whole
            // request; binding the IPv4 wildcard keeps us off them.
            .local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build fetch client: {}", e))?;

        Ok(Self {
            client,
            policy: RetryPolicy {
                max_attempts: config.fetch_max_attempts,
                backoff: Duration::from_millis(config.fetch_backoff_ms),
            },
        })
    }

    /// Retrieve the image at `url` into memory, retrying transient failures
    /// per the configured policy.
    pub async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        with_retry(&self.policy, |attempt| {
            let client = self.client.clone();
            let url = url.to_string();
            async move { Self::fetch_once(&client, &url, attempt).await }
        })
        .await
    }

    async fn fetch_once(
        client: &reqwest::Client,
        url: &str,
        attempt: u32,
    ) -> Result<Bytes, FetchError> {
        tracing::debug!(url = %url, attempt, "Requesting screenshot");

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        // Redirects were already followed; anything still in 3xx means the
        // redirect budget ran dry, and that final status is what counts.
        let status = response.status();
        if !(200..400).contains(&status.as_u16()) {
            return Err(FetchError::bad_status(url, status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        tracing::debug!(url = %url, bytes = body.len(), status = %status, "Screenshot fetched");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_io_kinds() {
        assert!(transient_io_kind(std::io::ErrorKind::ConnectionReset));
        assert!(transient_io_kind(std::io::ErrorKind::ConnectionAborted));
        assert!(transient_io_kind(std::io::ErrorKind::BrokenPipe));
        assert!(transient_io_kind(std::io::ErrorKind::TimedOut));

        assert!(!transient_io_kind(std::io::ErrorKind::ConnectionRefused));
        assert!(!transient_io_kind(std::io::ErrorKind::NotFound));
        assert!(!transient_io_kind(std::io::ErrorKind::PermissionDenied));
    }

    #[test]
    fn test_bad_status_is_terminal() {
        let err = FetchError::bad_status(
            "https://example.com/shot.png",
            reqwest::StatusCode::NOT_FOUND,
        );
        assert_eq!(err.kind(), FetchErrorKind::BadStatus);
        assert!(!err.is_transient());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_error_message_carries_url() {
        let err = FetchError::new(
            FetchErrorKind::Timeout,
            true,
            "timed out fetching https://shots.example/1.png".to_string(),
            None,
        );
        assert!(err.to_string().contains("shots.example"));
        assert!(err.is_transient());
    }
}
