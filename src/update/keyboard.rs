//! Key handlers: code block Enter/Tab, Enter paragraph normalization and
//! the Backspace floor.

use tracing::trace;

use crate::commands::Cmd;
use crate::dom::{Boundary, NodeId, Range};
use crate::engine::Engine;
use crate::messages::Key;
use crate::model::{CodeExitState, Editor, EMPTY_PARAGRAPH};

/// Four columns of indentation inside code.
const CODE_TAB: &str = "    ";
/// Four columns of indentation in rich text.
const TEXT_TAB: &str = "&nbsp;&nbsp;&nbsp;&nbsp;";

pub fn update_key_down<E: Engine>(editor: &mut Editor<E>, key: &Key) -> Option<Cmd> {
    if *key != Key::Enter {
        editor.code_exit = CodeExitState::Idle;
    }
    match key {
        Key::Enter => code_block_enter(editor),
        Key::Tab => insert_tab(editor),
        Key::Backspace => guard_last_paragraph(editor),
        Key::Char(_) | Key::Other(_) => None,
    }
}

pub fn update_key_up<E: Engine>(editor: &mut Editor<E>, key: &Key) -> Option<Cmd> {
    editor.save_range(None);
    editor.push_effect(Cmd::RefreshMenus);

    match key {
        Key::Enter => normalize_top_level_block(editor),
        Key::Backspace => restore_empty_paragraph(editor),
        _ => {}
    }

    editor.notify_change();
    None
}

/// The `<code>` holding the selection and its `<pre>`, if any.
fn code_block<E: Engine>(editor: &Editor<E>) -> Option<(NodeId, NodeId)> {
    let code = editor.get_selection_container_elem()?;
    let pre = editor.dom.parent(code)?;
    (editor.dom.has_tag(code, "code") && editor.dom.has_tag(pre, "pre")).then_some((code, pre))
}

/// Enter inside `<pre><code>` inserts a newline. A second Enter once the
/// caret sits at the end of the code leaves the block.
fn code_block_enter<E: Engine>(editor: &mut Editor<E>) -> Option<Cmd> {
    let Some((code, pre)) = code_block(editor) else {
        editor.code_exit = CodeExitState::Idle;
        return None;
    };
    if !editor.cmd.can_insert_html() {
        return None;
    }

    if editor.code_exit == CodeExitState::AwaitingExit {
        editor.code_exit = CodeExitState::Idle;
        let Some(paragraph) = editor.dom.parse_fragment(EMPTY_PARAGRAPH).first().copied() else {
            return Some(Cmd::PreventDefault);
        };
        if editor.dom.insert_after(pre, paragraph).is_ok() {
            editor.create_range_by_elem(paragraph, Some(true), true);
            editor.restore_selection();
            editor.notify_change();
            trace!("left code block");
        }
        return Some(Cmd::PreventDefault);
    }

    let before = editor.get_range().map(|range| range.start);
    editor.exec("insertHTML", Some("\n"));
    editor.save_range(None);
    if editor.get_range().map(|range| range.start) == before {
        // First newline at the very end of a text node can be swallowed.
        editor.exec("insertHTML", Some("\n"));
    }

    if caret_at_code_end(editor, code) {
        editor.code_exit = CodeExitState::AwaitingExit;
    }
    Some(Cmd::PreventDefault)
}

/// Whether the saved caret sits at the end of `code`'s text, allowing for
/// one trailing newline the engine keeps as a line sentinel.
fn caret_at_code_end<E: Engine>(editor: &Editor<E>, code: NodeId) -> bool {
    let Some(range) = editor.get_range() else {
        return false;
    };
    let text = editor.dom.text_content(code);
    let total = text.chars().count();
    let offset = editor
        .dom
        .range_to_string(&Range::new(Boundary::new(code, 0), range.start))
        .chars()
        .count();
    offset == total || (offset + 1 == total && text.ends_with('\n'))
}

fn insert_tab<E: Engine>(editor: &mut Editor<E>) -> Option<Cmd> {
    if !editor.cmd.can_insert_html() {
        return None;
    }
    editor.get_selection_container_elem()?;
    let indent = if code_block(editor).is_some() {
        CODE_TAB
    } else {
        TEXT_TAB
    };
    editor.exec("insertHTML", Some(indent));
    Some(Cmd::PreventDefault)
}

/// Backspace in a region holding only the empty paragraph would delete it.
fn guard_last_paragraph<E: Engine>(editor: &mut Editor<E>) -> Option<Cmd> {
    let html = editor.html().trim().to_ascii_lowercase();
    (html == EMPTY_PARAGRAPH).then_some(Cmd::PreventDefault)
}

/// Put the empty paragraph back when something emptied the region anyway.
fn restore_empty_paragraph<E: Engine>(editor: &mut Editor<E>) {
    let html = editor.html().trim().to_ascii_lowercase();
    if !html.is_empty() && html != "<br>" {
        return;
    }
    let root = editor.root();
    let Ok(nodes) = editor
        .dom
        .set_inner_html(root, "")
        .and_then(|_| editor.dom.append_html(root, EMPTY_PARAGRAPH))
    else {
        return;
    };
    if let Some(&paragraph) = nodes.first() {
        editor.create_range_by_elem(paragraph, Some(false), true);
        editor.restore_selection();
    }
}

/// After Enter, a fresh empty top-level block that is not a paragraph
/// becomes `<p><br></p>`.
fn normalize_top_level_block<E: Engine>(editor: &mut Editor<E>) {
    let Some(container) = editor.get_selection_container_elem() else {
        return;
    };
    let Some(parent) = editor.dom.parent(container) else {
        return;
    };
    let root = editor.root();

    if editor.dom.has_tag(container, "code")
        && editor.dom.inner_html(parent).eq_ignore_ascii_case("<code><br></code>")
    {
        let target = if parent == root { container } else { parent };
        replace_with_empty_paragraph(editor, target);
        return;
    }

    if parent != root || editor.dom.has_tag(container, "p") {
        return;
    }
    let has_image = editor
        .dom
        .descendants(container)
        .iter()
        .any(|&node| editor.dom.has_tag(node, "img"));
    if editor.dom.text_content(container).is_empty() && !has_image {
        replace_with_empty_paragraph(editor, container);
    }
}

fn replace_with_empty_paragraph<E: Engine>(editor: &mut Editor<E>, target: NodeId) {
    let Some(paragraph) = editor.dom.parse_fragment(EMPTY_PARAGRAPH).first().copied() else {
        return;
    };
    if editor.dom.replace(target, paragraph).is_err() {
        return;
    }
    trace!(?target, "normalized empty block to paragraph");
    editor.create_range_by_elem(paragraph, Some(true), true);
    editor.restore_selection();
}
