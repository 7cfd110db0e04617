use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    /// The opener window is gone (closed, or never existed).
    #[error("Opener window is not available")]
    OpenerUnavailable,
    #[error("Host call failed: {0}")]
    Other(String),
}

/// Window-management capabilities the continuations need from the host.
///
/// `close_self` has no failure mode: closing is always attempted and the
/// host decides what it means.
pub trait HostSurface: Send + Sync {
    /// Ask the opener to reload its view of the selection set.
    fn reload_opener(&self) -> Result<(), HostError>;

    /// Close the current window/context.
    fn close_self(&self);
}

/// Runs `close_self` when dropped. Keeps the close on every exit path of a
/// continuation, including a panicking reload.
pub(crate) struct CloseGuard<'a> {
    host: &'a dyn HostSurface,
}

impl<'a> CloseGuard<'a> {
    pub(crate) fn new(host: &'a dyn HostSurface) -> Self {
        Self { host }
    }
}

impl Drop for CloseGuard<'_> {
    fn drop(&mut self) {
        tracing::debug!("Closing current window");
        self.host.close_self();
    }
}
