//! Request shaping for selection mutations.
//!
//! Two transport bindings exist for the same add/remove semantics: the
//! REST form (`POST /selected`, `DELETE /selected?id=`) and the form-post
//! form (`POST /selected-add`, `POST /selected-remove`). Archive has a single
//! shape shared by every page.

use crate::selection::{ItemKey, MutationIntent, SelectionVerb, TogglePolicy};
use reqwest::Method;
use std::fmt;

pub const ARCHIVE_PATH: &str = "/archive";
pub const ARCHIVE_FIELD: &str = "selected-item";

/// Semantic verb carried to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Add,
    Remove,
    Archive,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verb::Add => f.write_str("add"),
            Verb::Remove => f.write_str("remove"),
            Verb::Archive => f.write_str("archive"),
        }
    }
}

impl From<SelectionVerb> for Verb {
    fn from(verb: SelectionVerb) -> Self {
        match verb {
            SelectionVerb::Add => Verb::Add,
            SelectionVerb::Remove => Verb::Remove,
        }
    }
}

/// A verb bound to the key it acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub verb: Verb,
    pub key: ItemKey,
}

impl Mutation {
    pub fn add(id: impl Into<String>) -> Self {
        Self {
            verb: Verb::Add,
            key: ItemKey::Id(id.into()),
        }
    }

    pub fn remove(key: ItemKey) -> Self {
        Self {
            verb: Verb::Remove,
            key,
        }
    }

    pub fn archive(id: impl Into<String>) -> Self {
        Self {
            verb: Verb::Archive,
            key: ItemKey::Id(id.into()),
        }
    }
}

impl From<MutationIntent> for Mutation {
    fn from(intent: MutationIntent) -> Self {
        Self {
            verb: intent.verb.into(),
            key: intent.key,
        }
    }
}

/// How "remove" travels over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveRoute {
    /// `DELETE <path>?<param>=<key>`, no body.
    Delete {
        path: &'static str,
        param: &'static str,
    },
    /// `POST <path>` with `<field>=<key>` in a form body.
    PostForm {
        path: &'static str,
        field: &'static str,
    },
}

/// Paths a page targets for add and remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointBinding {
    pub add_path: &'static str,
    pub remove: RemoveRoute,
}

impl EndpointBinding {
    /// `POST /selected` + `DELETE /selected?id=`.
    pub const REST: EndpointBinding = EndpointBinding {
        add_path: "/selected",
        remove: RemoveRoute::Delete {
            path: "/selected",
            param: "id",
        },
    };

    /// `POST /selected-add` + `POST /selected-remove` with `url=`.
    pub const FORM: EndpointBinding = EndpointBinding {
        add_path: "/selected-add",
        remove: RemoveRoute::PostForm {
            path: "/selected-remove",
            field: "url",
        },
    };

    /// Binding used by the page that owns `policy`.
    pub fn for_policy(policy: TogglePolicy) -> Self {
        match policy {
            TogglePolicy::Plain => Self::FORM,
            TogglePolicy::Inverted | TogglePolicy::MarkerFlip => Self::REST,
        }
    }

    /// Build the wire request for `mutation` under this binding.
    pub fn request_for(&self, mutation: &Mutation) -> MutationRequest {
        let value = mutation.key.value().to_string();
        match mutation.verb {
            Verb::Add => MutationRequest::post_form(self.add_path, "id", value),
            Verb::Remove => match self.remove {
                RemoveRoute::Delete { path, param } => MutationRequest {
                    method: Method::DELETE,
                    path: path.to_string(),
                    query: vec![(param.to_string(), value)],
                    form: Vec::new(),
                },
                RemoveRoute::PostForm { path, field } => {
                    MutationRequest::post_form(path, field, value)
                }
            },
            Verb::Archive => MutationRequest::post_form(ARCHIVE_PATH, ARCHIVE_FIELD, value),
        }
    }
}

/// Transport-neutral description of one HTTP mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl MutationRequest {
    pub fn post_form(path: &str, field: &str, value: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.to_string(),
            query: Vec::new(),
            form: vec![(field.to_string(), value.into())],
        }
    }

    /// `application/x-www-form-urlencoded` body, or `None` for bodyless requests.
    pub fn form_body(&self) -> Option<String> {
        if self.form.is_empty() {
            return None;
        }
        Some(
            url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(self.form.iter())
                .finish(),
        )
    }
}
