//! Mouse handlers: keep the saved range in step with pointer selections.

use crate::commands::Cmd;
use crate::engine::Engine;
use crate::messages::TextMsg;
use crate::model::Editor;

pub fn update_pointer<E: Engine>(editor: &mut Editor<E>, msg: &TextMsg) -> Option<Cmd> {
    match msg {
        TextMsg::MouseDown => {
            editor.tracking_mouse = true;
            None
        }
        TextMsg::MouseUp => {
            editor.tracking_mouse = false;
            save_and_refresh(editor);
            editor.notify_change();
            None
        }
        // A drag-selection that leaves the region still has to be saved.
        TextMsg::MouseLeave if editor.tracking_mouse => {
            save_and_refresh(editor);
            None
        }
        _ => None,
    }
}

fn save_and_refresh<E: Engine>(editor: &mut Editor<E>) {
    editor.save_range(None);
    editor.push_effect(Cmd::RefreshMenus);
}
