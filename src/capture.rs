//! One-shot "capture current tab" flow from the browser extension popup.
//!
//! Reads the active tab's URL, writes progress notices, and adds the URL to
//! the selection on the configured host. Nothing is shown on failure.

use crate::dispatch::{classify, EndpointBinding, Failure, Mutation, ResponseStatus, Transport};
use futures::future::BoxFuture;
use std::io::Write;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("No active tab to capture")]
    NoActiveTab,
    #[error("Invalid capture host: {0}")]
    InvalidHost(#[from] url::ParseError),
    #[error(transparent)]
    Mutation(#[from] Failure),
}

/// Source of the URL to capture (the browser's active-tab query).
pub trait TabSource: Send + Sync {
    fn active_tab_url(&self) -> BoxFuture<'_, Option<String>>;
}

/// A tab source that always reports the same URL.
#[derive(Debug, Clone)]
pub struct FixedTab(pub String);

impl TabSource for FixedTab {
    fn active_tab_url(&self) -> BoxFuture<'_, Option<String>> {
        let url = self.0.clone();
        Box::pin(async move { Some(url) })
    }
}

/// Where progress notices go (the popup's transient document).
pub trait NoticeSink {
    fn notice(&mut self, text: &str);
}

impl NoticeSink for Vec<String> {
    fn notice(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// Writes one notice per line to any writer.
pub struct LineSink<W: Write>(pub W);

impl<W: Write> NoticeSink for LineSink<W> {
    fn notice(&mut self, text: &str) {
        if let Err(e) = writeln!(self.0, "{}", text) {
            tracing::debug!(error = %e, "Failed to write capture notice");
        }
    }
}

/// Base URL the popup posts to: `https://<host>`.
pub fn capture_base(host: &str) -> Result<Url, CaptureError> {
    Ok(Url::parse(&format!("https://{}", host))?)
}

/// Add the active tab to the selection.
///
/// Writes `Adding`, the URL, `to Feedcircuit`, `...` before sending and
/// `done` once the request completes successfully.
pub async fn capture_current_tab(
    tabs: &dyn TabSource,
    transport: &dyn Transport,
    notices: &mut dyn NoticeSink,
) -> Result<ResponseStatus, CaptureError> {
    let url = tabs
        .active_tab_url()
        .await
        .ok_or(CaptureError::NoActiveTab)?;

    notices.notice("Adding");
    notices.notice(&url);
    notices.notice("to Feedcircuit");
    notices.notice("...");

    let request = EndpointBinding::REST.request_for(&Mutation::add(url.as_str()));
    match classify(transport.send(request).await) {
        Ok(status) => {
            tracing::info!(url = %url, status = status.code(), "Captured tab");
            notices.notice("done");
            Ok(status)
        }
        Err(failure) => {
            tracing::debug!(url = %url, error = %failure, "Tab capture failed");
            Err(failure.into())
        }
    }
}
