use std::time::{Duration, Instant};

use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use tokio::sync::RwLock;
use url::Url;

use super::error::TransportError;
use crate::config::ClientConfig;

/// One completed HTTP exchange: status, response headers, raw body bytes.
pub(crate) struct Exchange {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Performs single HTTP(S) request/response exchanges.
///
/// No retry happens at this layer; retry policy, if any, belongs to the
/// caller. TLS versus plain is decided by the URL scheme.
pub(crate) struct HttpTransport {
    client: reqwest::Client,
    last_latency: RwLock<Option<(Duration, Instant)>>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig, user_agent: &str) -> Result<Self, anyhow::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(user_agent);

        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            last_latency: RwLock::new(None),
        })
    }

    pub async fn execute(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> Result<Exchange, TransportError> {
        let start = Instant::now();

        let mut req = self.client.request(method.clone(), url.clone()).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }

        let resp = req.send().await.map_err(TransportError::from_reqwest)?;
        let latency = start.elapsed();
        self.update_latency(latency).await;

        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(TransportError::from_reqwest)?
            .to_vec();

        debug!(method:% = method, url:% = url, status = status.as_u16(), bytes = body.len(); "HTTP exchange complete");

        Ok(Exchange {
            status,
            headers,
            body,
        })
    }

    async fn update_latency(&self, duration: Duration) {
        *self.last_latency.write().await = Some((duration, Instant::now()));
    }

    pub async fn last_latency(&self) -> Option<Duration> {
        self.last_latency.read().await.map(|(d, _)| d)
    }
}
