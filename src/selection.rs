//! Selection persistence for the editable region.
//!
//! The live selection is page-global and anything (a toolbar click, a
//! dropdown input) can move it. The editor therefore keeps its own copy in
//! [`SelectionStore`], refreshed on keyup/mouseup and after every command,
//! and writes it back to the engine right before acting.

use tracing::{debug, trace};

use crate::command::{CommandValue, MarkerStrategy};
use crate::dom::{Boundary, DomError, NodeId, Range};
use crate::engine::Engine;
use crate::model::Editor;

/// The persisted selection: at most one range, overwritten on every save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStore {
    current: Option<Range>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Range> {
        self.current
    }

    pub fn set(&mut self, range: Range) {
        self.current = Some(range);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Collapse the stored range in place; no-op when nothing is stored.
    pub fn collapse(&mut self, to_start: bool) {
        if let Some(range) = self.current.as_mut() {
            range.collapse(to_start);
        }
    }

    /// Start and end coincide. `false` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.current.is_some_and(|range| range.is_collapsed())
    }
}

#[derive(Debug, thiserror::Error)]
enum MarkerError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("marker was not inserted")]
    NotInserted,
}

impl<E: Engine> Editor<E> {
    /// The last saved range.
    pub fn get_range(&self) -> Option<Range> {
        self.selection.get()
    }

    /// Persist `range`, or snapshot the live selection when `None`.
    ///
    /// A live selection is only kept when its common ancestor sits inside the
    /// editable root and outside any `contenteditable="false"` island.
    pub fn save_range(&mut self, range: Option<Range>) {
        if let Some(range) = range {
            self.selection.set(range);
            return;
        }

        if self.engine.range_count() == 0 {
            return;
        }
        let Some(live) = self.engine.range_at(0) else {
            return;
        };
        let Some(container) = self.container_elem_of(&live) else {
            return;
        };

        if !self.dom.contains(self.root(), container) {
            trace!(?container, "selection outside editable root, not saved");
            return;
        }
        if self.inside_readonly_island(container) {
            trace!(?container, "selection inside non-editable island, not saved");
            return;
        }
        self.selection.set(live);
    }

    fn inside_readonly_island(&self, node: NodeId) -> bool {
        let root = self.root();
        self.dom
            .closest(node, |dom, n| {
                n == root || dom.attr(n, "contenteditable") == Some("false")
            })
            .is_some_and(|found| found != root)
    }

    /// Make the persisted range the live selection.
    pub fn restore_selection(&mut self) {
        let Some(range) = self.selection.get() else {
            return;
        };
        self.engine.remove_all_ranges();
        self.engine.add_range(range);
    }

    /// Collapse the persisted range onto its end (or start with `to_start`).
    pub fn collapse_range(&mut self, to_start: bool) {
        self.selection.collapse(to_start);
    }

    pub fn is_selection_empty(&self) -> bool {
        self.selection.is_empty()
    }

    /// Text covered by the persisted range.
    pub fn get_selection_text(&self) -> String {
        self.selection
            .get()
            .map(|range| self.dom.range_to_string(&range))
            .unwrap_or_default()
    }

    /// Element holding the whole persisted range.
    pub fn get_selection_container_elem(&self) -> Option<NodeId> {
        let range = self.selection.get()?;
        self.container_elem_of(&range)
    }

    pub fn get_selection_start_elem(&self) -> Option<NodeId> {
        let range = self.selection.get()?;
        self.dom.element_of(range.start.node)
    }

    pub fn get_selection_end_elem(&self) -> Option<NodeId> {
        let range = self.selection.get()?;
        self.dom.element_of(range.end.node)
    }

    /// Nearest element of the common ancestor of `range`.
    pub fn container_elem_of(&self, range: &Range) -> Option<NodeId> {
        self.dom.element_of(self.dom.common_ancestor(range))
    }

    /// Give an empty selection something to format.
    ///
    /// Character formats applied to a caret would otherwise have nothing to
    /// wrap. A zero-width space is inserted at the caret and selected, so the
    /// following format command wraps it and typing continues inside the
    /// formatted run. No-op unless the persisted range is empty.
    pub fn create_empty_range(&mut self) {
        if !self.is_selection_empty() {
            return;
        }
        if let Err(err) = self.insert_empty_marker() {
            debug!(%err, "could not create empty range marker");
        }
    }

    fn insert_empty_marker(&mut self) -> Result<(), MarkerError> {
        match self.cmd.marker {
            MarkerStrategy::ZeroWidthText => {
                self.exec_with("insertHTML", CommandValue::Text("&#8203;".to_string()));
                let caret = self.get_range().ok_or(MarkerError::NotInserted)?;
                let marker = self.marker_before(caret.end).ok_or(MarkerError::NotInserted)?;
                self.save_range(Some(marker));
                Ok(())
            }
            MarkerStrategy::WrappedElement => {
                let wrapper = self.dom.create_element("span");
                let glyph = self.dom.create_text("\u{200b}");
                self.dom.append_child(wrapper, glyph)?;
                self.exec_with("insertElem", CommandValue::Elem(wrapper));
                if !self.dom.contains(self.root(), wrapper) {
                    return Err(MarkerError::NotInserted);
                }
                self.create_range_by_elem(wrapper, None, true);
                Ok(())
            }
        }
    }

    /// Range over the zero-width space right before `at`.
    fn marker_before(&self, at: Boundary) -> Option<Range> {
        let (text, end) = if self.dom.is_text(at.node) {
            (at.node, at.offset)
        } else {
            let child = *self.dom.children(at.node).get(at.offset.checked_sub(1)?)?;
            (child, self.dom.node_len(child))
        };
        let before = self.dom.text(text)?.chars().nth(end.checked_sub(1)?)?;
        (before == '\u{200b}')
            .then(|| Range::new(Boundary::new(text, end - 1), Boundary::new(text, end)))
    }

    /// Persist a range built around `elem`.
    ///
    /// `select_content` selects the element's contents instead of the
    /// element itself; `to_start` collapses the result onto its start
    /// (`Some(true)`) or end (`Some(false)`).
    pub fn create_range_by_elem(&mut self, elem: NodeId, to_start: Option<bool>, select_content: bool) {
        let range = if select_content {
            Some(Range::select_node_contents(&self.dom, elem))
        } else {
            Range::select_node(&self.dom, elem)
        };
        let Some(mut range) = range else {
            return;
        };
        if let Some(to_start) = to_start {
            range.collapse(to_start);
        }
        self.save_range(Some(range));
    }
}
