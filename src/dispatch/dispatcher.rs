use super::endpoint::{EndpointBinding, Mutation, Verb};
use super::host::{CloseGuard, HostSurface};
use super::transport::{ResponseStatus, Transport, TransportError};
use crate::selection::{resolve_with, ItemKey, ToggleInput, TogglePolicy, ViewContext};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// What happens after a mutation succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PostAction {
    /// Fire-and-forget.
    #[default]
    None,
    ReloadOpener,
    /// Reload the opener, then close the current window no matter how the
    /// reload went.
    ReloadOpenerAndClose,
}

impl fmt::Display for PostAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostAction::None => f.write_str("none"),
            PostAction::ReloadOpener => f.write_str("reload-opener"),
            PostAction::ReloadOpenerAndClose => f.write_str("reload-opener-and-close"),
        }
    }
}

/// A mutation that reached a terminal, successful response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Success {
    pub status: ResponseStatus,
    /// Whether the post-action ran (always false for `PostAction::None`).
    pub continued: bool,
}

/// A mutation that did not succeed. Never retried.
#[derive(Debug, Error)]
pub enum Failure {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("Unsuccessful response status {}", .0.code())]
    Status(ResponseStatus),
}

/// Completion rule: no status available, or anything in 200..=399.
pub fn is_success(status: ResponseStatus) -> bool {
    match status {
        ResponseStatus::NoStatus => true,
        ResponseStatus::Http(code) => (200..400).contains(&code),
    }
}

/// Turn a transport result into the explicit outcome.
pub fn classify(result: Result<ResponseStatus, TransportError>) -> Result<ResponseStatus, Failure> {
    match result {
        Ok(status) if is_success(status) => Ok(status),
        Ok(status) => Err(Failure::Status(status)),
        Err(e) => Err(Failure::Transport(e)),
    }
}

/// Called with every failure before it is returned.
pub type FailureHandler = Arc<dyn Fn(&Mutation, &Failure) + Send + Sync>;

/// Default failure handling: nothing visible happens.
pub fn ignore_failure(mutation: &Mutation, failure: &Failure) {
    tracing::debug!(
        verb = %mutation.verb,
        key = %mutation.key.value(),
        error = %failure,
        "Mutation failed, leaving UI as-is"
    );
}

/// Sends resolved mutations and runs their continuations.
///
/// Holds no per-request state: every call builds its own request and
/// captures it in its own future, so concurrent dispatches never interfere.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    host: Arc<dyn HostSurface>,
    strict_reload_gate: bool,
    on_failure: FailureHandler,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, host: Arc<dyn HostSurface>) -> Self {
        Self {
            transport,
            host,
            strict_reload_gate: true,
            on_failure: Arc::new(ignore_failure),
        }
    }

    /// When on (the default), reload continuations need exactly HTTP 200.
    /// When off, they follow the plain completion rule.
    pub fn strict_reload_gate(mut self, strict: bool) -> Self {
        self.strict_reload_gate = strict;
        self
    }

    pub fn on_failure(mut self, handler: FailureHandler) -> Self {
        self.on_failure = handler;
        self
    }

    /// Handle one checkbox change: resolve, send, no continuation.
    ///
    /// `policy` overrides the view's default strategy.
    pub async fn toggle(
        &self,
        context: ViewContext,
        policy: Option<TogglePolicy>,
        input: &ToggleInput,
    ) -> Result<Success, Failure> {
        let policy = policy.unwrap_or_else(|| context.default_policy());
        let intent = resolve_with(policy, input);
        tracing::debug!(
            context = %context,
            policy = %policy,
            checked = input.checked,
            marker = input.marker,
            verb = %intent.verb,
            "Resolved toggle"
        );
        self.dispatch(
            intent.into(),
            EndpointBinding::for_policy(policy),
            PostAction::None,
        )
        .await
    }

    /// Archive an item from its page, then reload the opener and close.
    pub async fn archive(&self, id: impl Into<String>) -> Result<Success, Failure> {
        self.dispatch(
            Mutation::archive(id),
            EndpointBinding::REST,
            PostAction::ReloadOpenerAndClose,
        )
        .await
    }

    /// Drop an item from the selection from its page, then reload the
    /// opener and close.
    pub async fn unselect_and_close(&self, id: impl Into<String>) -> Result<Success, Failure> {
        self.dispatch(
            Mutation::remove(ItemKey::Id(id.into())),
            EndpointBinding::REST,
            PostAction::ReloadOpenerAndClose,
        )
        .await
    }

    /// Send `mutation` over `binding` and run `post` if it succeeds.
    pub async fn dispatch(
        &self,
        mutation: Mutation,
        binding: EndpointBinding,
        post: PostAction,
    ) -> Result<Success, Failure> {
        let request = binding.request_for(&mutation);
        tracing::debug!(
            verb = %mutation.verb,
            method = %request.method,
            path = %request.path,
            post = %post,
            "Dispatching mutation"
        );

        let status = match classify(self.transport.send(request).await) {
            Ok(status) => status,
            Err(failure) => {
                (self.on_failure)(&mutation, &failure);
                return Err(failure);
            }
        };

        let continued = self.continue_with(post, status, mutation.verb);
        Ok(Success { status, continued })
    }

    fn continue_with(&self, post: PostAction, status: ResponseStatus, verb: Verb) -> bool {
        if post == PostAction::None {
            return false;
        }
        if self.strict_reload_gate && status != ResponseStatus::Http(200) {
            tracing::debug!(
                verb = %verb,
                status = status.code(),
                post = %post,
                "Skipping continuation, status is not 200"
            );
            return false;
        }

        match post {
            PostAction::None => {}
            PostAction::ReloadOpener => self.reload_opener(),
            PostAction::ReloadOpenerAndClose => {
                let _close = CloseGuard::new(self.host.as_ref());
                self.reload_opener();
            }
        }
        true
    }

    fn reload_opener(&self) {
        if let Err(e) = self.host.reload_opener() {
            tracing::debug!(error = %e, "Opener reload failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::endpoint::MutationRequest;
    use crate::dispatch::host::HostError;
    use crate::selection::ItemRef;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport that records requests and answers with a fixed result.
    struct FakeTransport {
        status: Option<u16>,
        sent: Mutex<Vec<MutationRequest>>,
    }

    impl FakeTransport {
        fn answering(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status: Some(status),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn timing_out() -> Arc<Self> {
            Arc::new(Self {
                status: None,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    impl Transport for FakeTransport {
        fn send(
            &self,
            request: MutationRequest,
        ) -> BoxFuture<'_, Result<ResponseStatus, TransportError>> {
            self.sent.lock().unwrap().push(request);
            let result = match self.status {
                Some(code) => Ok(ResponseStatus::from_code(code)),
                None => Err(TransportError::Timeout(std::time::Duration::from_secs(1))),
            };
            Box::pin(async move { result })
        }
    }

    #[derive(Default)]
    struct FakeHost {
        reloads: AtomicUsize,
        closes: AtomicUsize,
        opener_gone: bool,
    }

    impl HostSurface for FakeHost {
        fn reload_opener(&self) -> Result<(), HostError> {
            self.reloads.fetch_add(1, Ordering::SeqCst);
            if self.opener_gone {
                return Err(HostError::OpenerUnavailable);
            }
            Ok(())
        }

        fn close_self(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PanickingHost {
        closes: AtomicUsize,
    }

    impl HostSurface for PanickingHost {
        fn reload_opener(&self) -> Result<(), HostError> {
            panic!("opener reload blew up");
        }

        fn close_self(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_success_range() {
        for code in [0u16, 200, 204, 302, 399] {
            assert!(is_success(ResponseStatus::from_code(code)), "{code}");
        }
        for code in [100u16, 199, 400, 404, 500] {
            assert!(!is_success(ResponseStatus::from_code(code)), "{code}");
        }
    }

    #[test]
    fn test_classify_transport_error_is_failure() {
        let result = classify(Err(TransportError::Timeout(std::time::Duration::from_secs(1))));
        assert!(matches!(result, Err(Failure::Transport(_))));
    }

    #[test]
    fn test_failure_message_shows_code() {
        let failure = Failure::Status(ResponseStatus::Http(404));
        assert_eq!(failure.to_string(), "Unsuccessful response status 404");
    }

    #[tokio::test]
    async fn test_toggle_feed_list_remove_uses_form_binding() {
        let transport = FakeTransport::answering(200);
        let host = Arc::new(FakeHost::default());
        let dispatcher = Dispatcher::new(transport.clone(), host.clone());

        let input = ToggleInput {
            checked: false,
            marker: false,
            item: ItemRef {
                id: Some("7".to_string()),
                url: Some("https://example.com/p".to_string()),
            },
        };
        let outcome = dispatcher
            .toggle(ViewContext::FeedList, None, &input)
            .await
            .unwrap();
        assert!(!outcome.continued);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].path, "/selected-remove");
        assert_eq!(
            sent[0].form,
            vec![("url".to_string(), "https://example.com/p".to_string())]
        );
        assert_eq!(host.reloads.load(Ordering::SeqCst), 0);
        assert_eq!(host.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_toggle_marker_flip_override() {
        let transport = FakeTransport::answering(200);
        let dispatcher = Dispatcher::new(transport.clone(), Arc::new(FakeHost::default()));

        let input = ToggleInput {
            checked: true,
            marker: true,
            item: ItemRef::with_id("3"),
        };
        dispatcher
            .toggle(
                ViewContext::SelectedList,
                Some(TogglePolicy::MarkerFlip),
                &input,
            )
            .await
            .unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].method, reqwest::Method::DELETE);
        assert_eq!(sent[0].query, vec![("id".to_string(), "3".to_string())]);
    }

    #[tokio::test]
    async fn test_reload_and_close_runs_once_on_200() {
        let host = Arc::new(FakeHost::default());
        let dispatcher = Dispatcher::new(FakeTransport::answering(200), host.clone());

        let outcome = dispatcher.archive("item-42").await.unwrap();
        assert!(outcome.continued);
        assert_eq!(host.reloads.load(Ordering::SeqCst), 1);
        assert_eq!(host.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_runs_when_opener_is_gone() {
        let host = Arc::new(FakeHost {
            opener_gone: true,
            ..Default::default()
        });
        let dispatcher = Dispatcher::new(FakeTransport::answering(200), host.clone());

        dispatcher.unselect_and_close("9").await.unwrap();
        assert_eq!(host.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_runs_when_reload_panics() {
        let host = Arc::new(PanickingHost {
            closes: AtomicUsize::new(0),
        });
        let dispatcher = Dispatcher::new(FakeTransport::answering(200), host.clone());

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            dispatcher.continue_with(
                PostAction::ReloadOpenerAndClose,
                ResponseStatus::Http(200),
                Verb::Archive,
            )
        }));
        assert!(result.is_err());
        assert_eq!(host.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_strict_gate_skips_continuation_on_204() {
        let host = Arc::new(FakeHost::default());
        let dispatcher = Dispatcher::new(FakeTransport::answering(204), host.clone());

        let outcome = dispatcher.archive("1").await.unwrap();
        assert_eq!(outcome.status, ResponseStatus::Http(204));
        assert!(!outcome.continued);
        assert_eq!(host.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lenient_gate_continues_on_302_and_no_status() {
        for code in [302u16, 0] {
            let host = Arc::new(FakeHost::default());
            let dispatcher = Dispatcher::new(FakeTransport::answering(code), host.clone())
                .strict_reload_gate(false);

            let outcome = dispatcher.archive("1").await.unwrap();
            assert!(outcome.continued, "{code}");
            assert_eq!(host.reloads.load(Ordering::SeqCst), 1);
            assert_eq!(host.closes.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_reload_opener_does_not_close() {
        let host = Arc::new(FakeHost::default());
        let dispatcher = Dispatcher::new(FakeTransport::answering(200), host.clone());

        dispatcher
            .dispatch(
                Mutation::add("5"),
                EndpointBinding::REST,
                PostAction::ReloadOpener,
            )
            .await
            .unwrap();
        assert_eq!(host.reloads.load(Ordering::SeqCst), 1);
        assert_eq!(host.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failures_reach_handler_and_skip_continuation() {
        let seen = Arc::new(AtomicUsize::new(0));
        for transport in [
            FakeTransport::answering(404),
            FakeTransport::answering(500),
            FakeTransport::timing_out(),
        ] {
            let host = Arc::new(FakeHost::default());
            let counter = seen.clone();
            let dispatcher = Dispatcher::new(transport, host.clone()).on_failure(Arc::new(
                move |_: &Mutation, _: &Failure| {
                    counter.fetch_add(1, Ordering::SeqCst);
                },
            ));

            assert!(dispatcher.archive("1").await.is_err());
            assert_eq!(host.reloads.load(Ordering::SeqCst), 0);
            assert_eq!(host.closes.load(Ordering::SeqCst), 0);
        }
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }
}
