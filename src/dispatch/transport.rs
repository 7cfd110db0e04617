use super::endpoint::MutationRequest;
use futures::future::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Errors raised before a terminal response arrives.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Terminal status of a mutation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// No status available (local/offline contexts report 0).
    NoStatus,
    Http(u16),
}

impl ResponseStatus {
    pub fn from_code(code: u16) -> Self {
        if code == 0 {
            ResponseStatus::NoStatus
        } else {
            ResponseStatus::Http(code)
        }
    }

    pub fn code(self) -> u16 {
        match self {
            ResponseStatus::NoStatus => 0,
            ResponseStatus::Http(code) => code,
        }
    }
}

/// Sends one mutation and reports its terminal status.
///
/// Boxed futures keep the trait object-safe so pages can hold a
/// `&dyn Transport`.
pub trait Transport: Send + Sync {
    fn send(&self, request: MutationRequest) -> BoxFuture<'_, Result<ResponseStatus, TransportError>>;
}

/// reqwest-backed transport rooted at a server base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base: Url, timeout: Duration) -> Self {
        Self {
            client,
            base,
            timeout,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for `request`, query parameters included.
    pub fn url_for(&self, request: &MutationRequest) -> Result<Url, TransportError> {
        let mut url = self.base.join(&request.path)?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    async fn execute(&self, request: MutationRequest) -> Result<ResponseStatus, TransportError> {
        let url = self.url_for(&request)?;
        let mut builder = self.client.request(request.method.clone(), url.clone());
        if let Some(body) = request.form_body() {
            builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body);
        }

        tracing::debug!(method = %request.method, url = %url, "Sending mutation request");

        let response = tokio::time::timeout(self.timeout, builder.send())
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))??;

        Ok(ResponseStatus::from_code(response.status().as_u16()))
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: MutationRequest) -> BoxFuture<'_, Result<ResponseStatus, TransportError>> {
        Box::pin(self.execute(request))
    }
}
