//! Toggle resolution: maps one checkbox change to exactly one mutation intent.
//!
//! Pure and synchronous. Nothing here touches the network or any UI handle,
//! so every policy can be exercised directly in unit tests.

use std::fmt;

// ============================================================================
// View Context & Policies
// ============================================================================

/// Which list a checkbox lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewContext {
    /// The feed-item list. Checked means "add to selection".
    FeedList,
    /// The selected-items list. Checked means "currently selected".
    SelectedList,
}

impl ViewContext {
    /// Policy used when the caller does not pick one explicitly.
    pub fn default_policy(self) -> TogglePolicy {
        match self {
            ViewContext::FeedList => TogglePolicy::Plain,
            ViewContext::SelectedList => TogglePolicy::Inverted,
        }
    }
}

impl fmt::Display for ViewContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewContext::FeedList => f.write_str("feed-list"),
            ViewContext::SelectedList => f.write_str("selected-list"),
        }
    }
}

/// The three toggle strategies found across the list pages.
///
/// They are not interchangeable. Each one belongs to a page with its own
/// checkbox semantics and its own endpoint binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TogglePolicy {
    /// Feed list: checked adds by id, unchecked removes by url.
    Plain,
    /// Selected list: checked removes, unchecked adds. Keyed by id.
    Inverted,
    /// Legacy list: `add = checked`, negated when the control carries the
    /// `selected-item` marker. Keyed by id.
    MarkerFlip,
}

impl fmt::Display for TogglePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TogglePolicy::Plain => f.write_str("plain"),
            TogglePolicy::Inverted => f.write_str("inverted"),
            TogglePolicy::MarkerFlip => f.write_str("marker-flip"),
        }
    }
}

// ============================================================================
// Inputs & Outputs
// ============================================================================

/// Identifiers a view may supply for an item. Which one is used is decided
/// by the policy, never by the item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemRef {
    pub id: Option<String>,
    pub url: Option<String>,
}

impl ItemRef {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            url: None,
        }
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            id: None,
            url: Some(url.into()),
        }
    }
}

/// Everything the resolver reads from a control at toggle time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleInput {
    pub checked: bool,
    /// Control carries the "already selected" marker class.
    pub marker: bool,
    pub item: ItemRef,
}

/// Key sent to the server, tagged with the slot it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
    Id(String),
    Url(String),
}

impl ItemKey {
    pub fn value(&self) -> &str {
        match self {
            ItemKey::Id(v) | ItemKey::Url(v) => v,
        }
    }
}

/// Direction of a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionVerb {
    Add,
    Remove,
}

impl fmt::Display for SelectionVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionVerb::Add => f.write_str("add"),
            SelectionVerb::Remove => f.write_str("remove"),
        }
    }
}

/// Resolved mutation: what to do and which key to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationIntent {
    pub verb: SelectionVerb,
    pub key: ItemKey,
    pub policy: TogglePolicy,
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve a toggle with the policy the view uses by default.
pub fn resolve(context: ViewContext, input: &ToggleInput) -> MutationIntent {
    resolve_with(context.default_policy(), input)
}

/// Resolve a toggle under an explicit policy.
///
/// A missing identifier is not an error here: the view guarantees the right
/// slot is filled, and an empty key is passed through untouched.
pub fn resolve_with(policy: TogglePolicy, input: &ToggleInput) -> MutationIntent {
    let add = match policy {
        TogglePolicy::Plain => input.checked,
        TogglePolicy::Inverted => !input.checked,
        TogglePolicy::MarkerFlip => input.checked != input.marker,
    };
    let verb = if add {
        SelectionVerb::Add
    } else {
        SelectionVerb::Remove
    };

    let key = match (policy, verb) {
        // Feed list removes by url; the add path stays on id.
        (TogglePolicy::Plain, SelectionVerb::Remove) => ItemKey::Url(slot(&input.item.url)),
        _ => ItemKey::Id(slot(&input.item.id)),
    };

    MutationIntent { verb, key, policy }
}

fn slot(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
