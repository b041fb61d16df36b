//! Keyboard and mouse gestures
//!
//! Each gesture is turned into the event sequence a browser would fire:
//! - key press: keydown, the engine's default action unless the keydown
//!   was cancelled, keyup
//! - click or drag-select: mousedown, live selection change, mouseup

use crate::commands::Cmd;
use crate::dom::{Boundary, Range};
use crate::engine::Engine;
use crate::messages::{Key, Msg, TextMsg};
use crate::model::Editor;
use crate::update::update;

/// Press and release `key`.
pub fn press_key<E: Engine>(editor: &mut Editor<E>, key: Key) -> Option<Cmd> {
    let down = update(editor, Msg::Text(TextMsg::KeyDown(key.clone())));
    let prevented = down.as_ref().is_some_and(Cmd::prevents_default);
    if !prevented {
        editor.engine.default_key_action(&mut editor.dom, &key);
    }
    let up = update(editor, Msg::Text(TextMsg::KeyUp(key)));
    Cmd::merge(down, up)
}

/// Type `text` one key at a time. `\n` presses Enter and `\t` presses Tab.
pub fn type_text<E: Engine>(editor: &mut Editor<E>, text: &str) -> Option<Cmd> {
    text.chars().fold(None, |acc, ch| {
        let key = match ch {
            '\n' => Key::Enter,
            '\t' => Key::Tab,
            ch => Key::Char(ch),
        };
        Cmd::merge(acc, press_key(editor, key))
    })
}

/// Put the live selection at `range` with a mouse gesture.
pub fn click<E: Engine>(editor: &mut Editor<E>, range: Range) -> Option<Cmd> {
    let down = update(editor, Msg::Text(TextMsg::MouseDown));
    editor.select_live(range);
    let up = update(editor, Msg::Text(TextMsg::MouseUp));
    Cmd::merge(down, up)
}

/// Select the characters `start..end` of the region text with the mouse.
///
/// Returns `None` without touching anything when the offsets do not fall
/// inside the region text.
pub fn select_text<E: Engine>(editor: &mut Editor<E>, start: usize, end: usize) -> Option<Cmd> {
    let range = range_from_text_offsets(editor, start, end)?;
    click(editor, range)
}

/// Map character offsets into the region's text onto text-node boundaries.
///
/// Offsets count every character of every text node, markers included.
/// An offset on the seam between two text nodes resolves to the end of
/// the earlier node.
pub fn range_from_text_offsets<E: Engine>(
    editor: &Editor<E>,
    start: usize,
    end: usize,
) -> Option<Range> {
    if start > end {
        return None;
    }
    let locate = |offset: usize| -> Option<Boundary> {
        let mut seen = 0;
        for node in editor.dom.descendants(editor.root()) {
            if !editor.dom.is_text(node) {
                continue;
            }
            let len = editor.dom.node_len(node);
            if offset <= seen + len {
                return Some(Boundary::new(node, offset - seen));
            }
            seen += len;
        }
        None
    };
    Some(Range::new(locate(start)?, locate(end)?))
}
