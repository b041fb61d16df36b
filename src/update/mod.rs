//! Update functions for the Elm-style architecture
//!
//! All editor input flows through [`update`]. Handlers mutate the editor and
//! return the side effects the host must perform.

mod clipboard;
mod drag;
mod keyboard;
mod pointer;

use crate::commands::Cmd;
use crate::engine::Engine;
use crate::messages::{Msg, TextMsg};
use crate::model::Editor;

#[cfg(debug_assertions)]
use crate::tracing::SelectionSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

pub use clipboard::update_paste;
pub use drag::{update_document_drag, update_drop};
pub use keyboard::{update_key_down, update_key_up};
pub use pointer::update_pointer;

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update<E: Engine>(editor: &mut Editor<E>, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(editor, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(editor, msg)
    }
}

/// Inner update logic (no tracing)
fn update_inner<E: Engine>(editor: &mut Editor<E>, msg: Msg) -> Option<Cmd> {
    let result = match msg {
        Msg::Text(m) => update_text(editor, m),
        Msg::Command(request) => {
            editor.exec(&request.name, request.value.as_deref());
            None
        }
    };

    // Commands run by handlers leave their effects in the editor outbox.
    Cmd::merge(result, editor.take_effects())
}

fn update_text<E: Engine>(editor: &mut Editor<E>, msg: TextMsg) -> Option<Cmd> {
    match msg {
        TextMsg::KeyDown(key) => update_key_down(editor, &key),
        TextMsg::KeyUp(key) => update_key_up(editor, &key),
        TextMsg::MouseDown | TextMsg::MouseUp | TextMsg::MouseLeave => {
            update_pointer(editor, &msg)
        }
        TextMsg::Paste { data, time_ms } => update_paste(editor, &data, time_ms),
        TextMsg::Drop { files } => update_drop(editor, files),
        TextMsg::DocumentDrag(kind) => update_document_drag(kind),
    }
}

/// Traced update wrapper (debug builds only)
///
/// Captures before/after selection state and logs diffs for debugging.
#[cfg(debug_assertions)]
fn update_traced<E: Engine>(editor: &mut Editor<E>, msg: Msg) -> Option<Cmd> {
    // Drag-over fires continuously while something hovers the page
    let is_noisy = matches!(&msg, Msg::Text(TextMsg::DocumentDrag(_)));

    let msg_name = msg_type_name(&msg);
    let _span = if is_noisy {
        None
    } else {
        Some(span!(Level::DEBUG, "update", msg = %msg_name).entered())
    };

    let before = SelectionSnapshot::from_editor(editor);

    if !is_noisy {
        debug!(target: "message", msg = %msg_name, "processing");
    }

    let result = update_inner(editor, msg);

    let after = SelectionSnapshot::from_editor(editor);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "selection", %diff, "state changed");
    }

    result
}

/// Get a display name for a message type
///
/// Example outputs:
/// - `Text::KeyDown(Enter)`
/// - `Command::bold`
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Text(TextMsg::Paste { time_ms, .. }) => format!("Text::Paste@{}", time_ms),
        Msg::Text(m) => format!("Text::{:?}", m),
        Msg::Command(request) => format!("Command::{}", request.name),
    }
}
