//! Mutation dispatch: request shaping, transport, and post-response
//! continuations.
//!
//! - [`endpoint`] - verbs, endpoint bindings, and wire request shapes
//! - [`transport`] - the [`Transport`] seam and its reqwest implementation
//! - [`host`] - window-management capabilities used by continuations
//! - [`dispatcher`] - completion rules, failure handling, continuations
//!
//! # Example
//!
//! ```ignore
//! use feedcircuit::dispatch::{Dispatcher, HttpTransport};
//!
//! let dispatcher = Dispatcher::new(Arc::new(transport), Arc::new(host));
//! dispatcher.archive("item-42").await.ok();
//! ```

mod dispatcher;
mod endpoint;
mod host;
mod transport;

pub use dispatcher::{
    classify, ignore_failure, is_success, Dispatcher, Failure, FailureHandler, PostAction,
    Success,
};
pub use endpoint::{
    EndpointBinding, Mutation, MutationRequest, RemoveRoute, Verb, ARCHIVE_FIELD, ARCHIVE_PATH,
};
pub use host::{HostError, HostSurface};
pub use transport::{HttpTransport, ResponseStatus, Transport, TransportError};
