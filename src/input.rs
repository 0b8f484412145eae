//! Keyboard shortcut mapping for the search UI.
//!
//! Pure translation from a key press plus focus context to an action; the
//! host UI decides how to execute it (focus the input, send a
//! [`crate::debounce::InputEvent`], and so on).

/// Where focus currently sits, as far as shortcuts care.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusContext {
    /// Any text-entry element has focus (search box, comment field, ...).
    pub text_entry_focused: bool,
    /// Specifically the search input has focus.
    pub search_input_focused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    /// `/` — focus the search input.
    FocusSearch,
    /// `Escape` — clear the search input.
    ClearSearch,
    /// `Enter` — commit the debounced input immediately.
    CommitSearch,
}

/// Map a key press to an action, or `None` when the key means nothing here.
///
/// `/` is suppressed while any text-entry element has focus so typing a slash
/// into a field does not steal focus. `Escape` and `Enter` only apply while
/// the search input itself is focused.
pub fn shortcut_for(key: &str, focus: FocusContext) -> Option<ShortcutAction> {
    match key {
        "/" if !focus.text_entry_focused => Some(ShortcutAction::FocusSearch),
        "Escape" if focus.search_input_focused => Some(ShortcutAction::ClearSearch),
        "Enter" if focus.search_input_focused => Some(ShortcutAction::CommitSearch),
        _ => None,
    }
}
