//! HTTP transport for guidance image requests
//!
//! The fetch pipeline talks to the network through [`ImageTransport`], a
//! narrow seam that makes the pipeline testable without a server and keeps
//! the HTTP client choice swappable. The default implementation wraps
//! `reqwest` with the crate's static `User-Agent` and the configured
//! timeouts.

use async_trait::async_trait;

use crate::config::FetchConfig;
use crate::error::{Error, Result};

/// `User-Agent` header value sent with every guidance image request
pub const USER_AGENT: &str = concat!("nav-guidance/", env!("CARGO_PKG_VERSION"));

/// Raw HTTP exchange result as seen by the fetch pipeline
///
/// Any HTTP status is a successful exchange at this level; classifying the
/// status is the pipeline's job. The body is fully read before the response
/// is handed over, so no connection or stream outlives the call.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,

    /// Human-readable status message (the canonical reason phrase; empty
    /// for codes without one)
    pub status_message: String,

    /// Response body bytes; may be empty
    pub body: Vec<u8>,
}

/// HTTP transport seam for guidance image requests
///
/// Implementations return `Ok` for every completed HTTP exchange regardless
/// of status code, and `Err` only when no response was obtained at all
/// (connect failure, timeout, unparseable URL).
#[async_trait]
pub trait ImageTransport: Send + Sync {
    /// Execute a GET request against `url`
    async fn execute(&self, url: &str) -> Result<TransportResponse>;

    /// Implementation name for log messages
    fn name(&self) -> &'static str;
}

/// Default transport backed by a shared [`reqwest::Client`]
///
/// The client is built once with the static [`USER_AGENT`] and the
/// connect/request timeouts from [`FetchConfig`], then reused across all
/// fetches for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the transport from fetch settings
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ImageTransport for ReqwestTransport {
    async fn execute(&self, url: &str) -> Result<TransportResponse> {
        let url = url::Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let status_message = status.canonical_reason().unwrap_or_default().to_string();

        // Reading the body to completion releases the connection on every
        // path; an aborted read drops the response and closes it.
        let body = response.bytes().await?.to_vec();

        tracing::debug!(
            status = status.as_u16(),
            bytes = body.len(),
            "guidance image response received"
        );

        Ok(TransportResponse {
            status: status.as_u16(),
            status_message,
            body,
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}
