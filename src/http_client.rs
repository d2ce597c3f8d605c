//! HTTP client for the feed proxy.
//!
//! Features:
//! - TLS 1.3 via rustls
//! - Brotli, Gzip, Deflate compression (auto-negotiated)
//! - Connection pooling with keep-alive
//! - Identifying user agent

use std::time::Duration;

use reqwest::{Client, Response};
use tracing::{debug, info, instrument};

use crate::VERSION;

/// HTTP client shared by the feed fetcher.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            // ═══════════════════════════════════════════════════════════════
            // CONNECTION
            // ═══════════════════════════════════════════════════════════════
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            // ═══════════════════════════════════════════════════════════════
            // TLS
            // ═══════════════════════════════════════════════════════════════
            .use_rustls_tls()
            // ═══════════════════════════════════════════════════════════════
            // COMPRESSION (auto-negotiated via Accept-Encoding)
            // ═══════════════════════════════════════════════════════════════
            .brotli(true)
            .gzip(true)
            .deflate(true)
            // ═══════════════════════════════════════════════════════════════
            // TIMEOUTS
            // ═══════════════════════════════════════════════════════════════
            .connect_timeout(Duration::from_secs(10).min(timeout))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(format!("medium-embed/{VERSION}"))
            .build()?;

        Ok(Self { client })
    }

    /// GET `url`.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> reqwest::Result<Response> {
        debug!("Sending request");
        let response = self.client.get(url).send().await?;

        info!(
            status = %response.status(),
            version = ?response.version(),
            "Response received"
        );

        Ok(response)
    }
}
