use super::resolver::{ItemRef, ToggleInput, ViewContext};

/// Class name marking a control that already represents a selected item.
pub const SELECTED_MARKER: &str = "selected-item";

/// Raw state read off a checkbox at change time.
///
/// `value` holds whatever the page rendered into the control. Feed-list
/// pages render both the id and the url; the other lists render the id only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckboxControl {
    pub checked: bool,
    pub class_name: String,
    pub value: String,
    /// Item url, when the page renders it alongside the value.
    pub url: Option<String>,
}

impl CheckboxControl {
    /// Marker detection matches anywhere in the class attribute, so
    /// `"item selected-item"` and `"selected-item-row"` both count.
    pub fn has_marker(&self) -> bool {
        self.class_name.contains(SELECTED_MARKER)
    }

    /// Assemble the resolver input for a control living in `context`.
    pub fn to_input(&self, context: ViewContext) -> ToggleInput {
        let item = match context {
            ViewContext::FeedList => ItemRef {
                id: Some(self.value.clone()),
                url: self.url.clone(),
            },
            ViewContext::SelectedList => ItemRef::with_id(self.value.clone()),
        };

        ToggleInput {
            checked: self.checked,
            marker: self.has_marker(),
            item,
        }
    }
}
