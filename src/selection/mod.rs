//! Selection-state reconciliation on the client side.
//!
//! - [`resolver`] - pure toggle policies (plain, inverted, marker-flip)
//! - [`control`] - adapter from raw checkbox state to resolver input

mod control;
mod resolver;

pub use control::{CheckboxControl, SELECTED_MARKER};
pub use resolver::{
    resolve, resolve_with, ItemKey, ItemRef, MutationIntent, SelectionVerb, ToggleInput,
    TogglePolicy, ViewContext,
};
