//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use richedit::config::EditorConfig;
use richedit::dom::{Boundary, NodeId, Range};
use richedit::engine::{EngineFamily, SimulatedEngine};
use richedit::messages::{ClipboardData, Msg, TextMsg};
use richedit::model::Editor;
use richedit::runtime;
use richedit::update::update;
use richedit::Cmd;

/// Create a WebKit-family editor holding `html`
pub fn test_editor(html: &str) -> Editor {
    test_editor_on(EngineFamily::Webkit, html)
}

/// Create an editor for a given engine family holding `html`
pub fn test_editor_on(family: EngineFamily, html: &str) -> Editor {
    let mut editor = Editor::new(SimulatedEngine::new(family), EditorConfig::default());
    editor.set_html(html);
    editor
}

/// Text nodes of the region in document order
pub fn text_nodes(editor: &Editor) -> Vec<NodeId> {
    editor
        .dom
        .descendants(editor.root())
        .into_iter()
        .filter(|&n| editor.dom.is_text(n))
        .collect()
}

/// First descendant of the region with tag `tag`
pub fn find_tag(editor: &Editor, tag: &str) -> NodeId {
    editor
        .dom
        .descendants(editor.root())
        .into_iter()
        .find(|&n| editor.dom.has_tag(n, tag))
        .unwrap_or_else(|| panic!("no <{}> in {}", tag, editor.html()))
}

/// Mouse-select characters `start..end` of the region text
pub fn select(editor: &mut Editor, start: usize, end: usize) {
    let range = runtime::range_from_text_offsets(editor, start, end)
        .unwrap_or_else(|| panic!("offsets {}..{} outside {:?}", start, end, editor.text()));
    runtime::click(editor, range);
}

/// Put the caret at `offset` inside text node `node`, both saved and live
pub fn caret_in(editor: &mut Editor, node: NodeId, offset: usize) {
    let range = Range::collapsed_at(Boundary::new(node, offset));
    runtime::click(editor, range);
}

/// Count zero-width markers in the raw region markup
pub fn marker_count(editor: &Editor) -> usize {
    editor
        .dom
        .inner_html(editor.root())
        .matches('\u{200b}')
        .count()
}

/// Paste `data` at simulated time `time_ms`
pub fn paste(editor: &mut Editor, data: ClipboardData, time_ms: u64) -> Option<Cmd> {
    update(editor, Msg::Text(TextMsg::Paste { data, time_ms }))
}
