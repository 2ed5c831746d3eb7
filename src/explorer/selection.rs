use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use super::filters::PanelId;
use crate::graph_utils::graph::NodeKey;

pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);

/// Highlight that disappears on its own once its deadline passes.
#[derive(Clone, Debug, Default)]
struct TransientHighlight {
    keys: BTreeSet<NodeKey>,
    expires_at: Option<Instant>,
}

/// The independent selection layers of the explorer.
///
/// Row clicks, checkbox picks and panel picks never touch each other.
#[derive(Clone, Debug)]
pub struct SelectionState {
    pub(crate) selected_row_keys: BTreeSet<NodeKey>,
    pub(crate) checkbox_selected_keys: BTreeSet<NodeKey>,
    pub(crate) selected_panels: BTreeSet<PanelId>,
    highlight: TransientHighlight,
    pub(crate) breadcrumb_highlighted_keys: BTreeSet<NodeKey>,
    highlight_duration: Duration,
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState::new(HIGHLIGHT_DURATION)
    }
}

impl SelectionState {
    pub fn new(highlight_duration: Duration) -> Self {
        SelectionState {
            selected_row_keys: BTreeSet::new(),
            checkbox_selected_keys: BTreeSet::new(),
            selected_panels: BTreeSet::new(),
            highlight: TransientHighlight::default(),
            breadcrumb_highlighted_keys: BTreeSet::new(),
            highlight_duration,
        }
    }

    pub fn selected_row_keys(&self) -> &BTreeSet<NodeKey> { &self.selected_row_keys }
    pub fn checkbox_selected_keys(&self) -> &BTreeSet<NodeKey> { &self.checkbox_selected_keys }
    pub fn breadcrumb_highlighted_keys(&self) -> &BTreeSet<NodeKey> { &self.breadcrumb_highlighted_keys }

    /// Flip one key in/out of a set. Returns true if it is now present.
    fn toggle(set: &mut BTreeSet<NodeKey>, key: &str) -> bool {
        if set.remove(key) {
            false
        } else {
            set.insert(key.to_string());
            true
        }
    }

    pub fn toggle_row(&mut self, key: &str) -> bool {
        Self::toggle(&mut self.selected_row_keys, key)
    }

    pub fn toggle_checkbox(&mut self, key: &str) -> bool {
        Self::toggle(&mut self.checkbox_selected_keys, key)
    }

    /// Header checkbox: check every visible key, or uncheck them all if they already are.
    pub fn toggle_all_checkboxes<'a, I>(&mut self, visible: I) -> bool
    where
        I: IntoIterator<Item = &'a NodeKey>,
    {
        let visible: Vec<&NodeKey> = visible.into_iter().collect();
        if visible.is_empty() {
            return false;
        }
        let all_checked = visible.iter().all(|k| self.checkbox_selected_keys.contains(*k));
        if all_checked {
            for k in visible {
                self.checkbox_selected_keys.remove(k);
            }
        } else {
            self.checkbox_selected_keys.extend(visible.into_iter().cloned());
        }
        true
    }

    pub fn clear_checkboxes(&mut self) -> bool {
        let had = !self.checkbox_selected_keys.is_empty();
        self.checkbox_selected_keys.clear();
        had
    }

    pub fn toggle_panel(&mut self, panel: PanelId) -> bool {
        if self.selected_panels.remove(&panel) {
            false
        } else {
            self.selected_panels.insert(panel);
            true
        }
    }

    pub fn set_breadcrumb_highlight(&mut self, keys: impl IntoIterator<Item = NodeKey>) {
        self.breadcrumb_highlighted_keys = keys.into_iter().collect();
    }

    pub fn clear_breadcrumb_highlight(&mut self) {
        self.breadcrumb_highlighted_keys.clear();
    }

    pub fn set_transient_highlight(&mut self, keys: impl IntoIterator<Item = NodeKey>, now: Instant) {
        self.highlight.keys = keys.into_iter().collect();
        self.highlight.expires_at = Some(now + self.highlight_duration);
    }

    /// Keys under the transient highlight as of `now`.
    pub fn highlighted_keys(&self, now: Instant) -> BTreeSet<NodeKey> {
        match self.highlight.expires_at {
            Some(deadline) if now < deadline => self.highlight.keys.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// Drop an expired transient highlight. Returns whether anything was cleared.
    pub fn expire_highlight(&mut self, now: Instant) -> bool {
        match self.highlight.expires_at {
            Some(deadline) if now >= deadline => {
                self.highlight = TransientHighlight::default();
                true
            }
            _ => false,
        }
    }

    pub fn highlight_deadline(&self) -> Option<Instant> { self.highlight.expires_at }

    pub(crate) fn retain_panels(&mut self, live: &BTreeSet<PanelId>) {
        self.selected_panels.retain(|p| live.contains(p));
    }
}
