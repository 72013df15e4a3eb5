//! Pooled HTTP client for webhook delivery.
//!
//! Opening a fresh TCP/TLS connection per outbound call costs hundreds of
//! milliseconds; this client is built exactly once at process startup so
//! keep-alive connections amortize the handshake across calls. A
//! semaphore bounds the total number of requests in flight.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info_span, Instrument};

use crate::error::{NotifyError, Result};

/// Largest response body fragment kept for error logs.
const MAX_LOGGED_BODY: usize = 1024;

/// Configuration for the webhook delivery client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Fixed timeout for delivery requests.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Upper bound on concurrent outbound requests.
    pub max_connections: usize,
    /// Idle keep-alive connections retained per host after use.
    pub pool_max_idle: usize,
    /// How long an idle connection is kept before being dropped.
    pub pool_idle_timeout: Duration,
    /// Use multiplexed HTTP/2 streams (prior knowledge) for delivery.
    pub http2_prior_knowledge: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECONDS),
            user_agent: concat!("busload-notify/", env!("CARGO_PKG_VERSION")).to_string(),
            max_connections: crate::DEFAULT_MAX_CONNECTIONS,
            pool_max_idle: 8,
            pool_idle_timeout: Duration::from_secs(90),
            http2_prior_knowledge: false,
        }
    }
}

/// Outcome of one delivery attempt that reached the receiver.
#[derive(Debug, Clone)]
pub struct NotifyResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response body, truncated to a loggable size.
    pub body: String,
    /// Total duration of the request.
    pub duration: Duration,
    /// Whether the receiver accepted (2xx status).
    pub is_success: bool,
}

/// Long-lived HTTP client for webhook delivery.
///
/// Process-wide state: initialized once before any request is served and
/// dropped once at shutdown. Never construct one per call.
#[derive(Debug, Clone)]
pub struct NotifyClient {
    http: reqwest::Client,
    limiter: Arc<Semaphore>,
    config: ClientConfig,
}

impl NotifyClient {
    /// Creates the client and its connection pool.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Configuration` if the HTTP client cannot be
    /// built with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(config.pool_max_idle)
            .pool_idle_timeout(config.pool_idle_timeout);

        if config.http2_prior_knowledge {
            builder = builder.http2_prior_knowledge();
        }

        let http = builder.build().map_err(|e| {
            NotifyError::configuration(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            http,
            limiter: Arc::new(Semaphore::new(config.max_connections)),
            config,
        })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Configuration` if the HTTP client cannot be
    /// built.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Posts a JSON payload to the given URL through the pool.
    ///
    /// A non-2xx answer is still `Ok`: the response carries the status and
    /// body so the caller decides how to classify it.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::Timeout` when the fixed timeout elapses and
    /// `NotifyError::Network` for connection-level failures.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        payload: &T,
    ) -> Result<NotifyResponse> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| NotifyError::configuration("connection limiter closed"))?;

        let span = info_span!("webhook_request", url);

        async move {
            let start = std::time::Instant::now();

            let response = match self.http.post(url).json(payload).send().await {
                Ok(response) => response,
                Err(e) => {
                    if e.is_timeout() {
                        return Err(NotifyError::timeout(self.config.timeout.as_secs()));
                    }
                    return Err(NotifyError::network(e.to_string()));
                },
            };

            let duration = start.elapsed();
            let status_code = response.status().as_u16();
            let is_success = response.status().is_success();

            debug!(status = status_code, duration_ms = duration.as_millis() as u64, "response received");

            let body = match response.text().await {
                Ok(text) => truncate_body(text),
                Err(e) => format!("[failed to read response body: {e}]"),
            };

            Ok(NotifyResponse { status_code, body, duration, is_success })
        }
        .instrument(span)
        .await
    }
}

fn truncate_body(body: String) -> String {
    if body.len() > MAX_LOGGED_BODY {
        let mut end = MAX_LOGGED_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body
    }
}
