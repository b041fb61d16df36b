//! Drag-and-drop: the browser must never navigate to or inline a dropped
//! file; files dropped on the region go to the upload pipeline.

use crate::commands::Cmd;
use crate::engine::Engine;
use crate::messages::{DragKind, DroppedFile};
use crate::model::Editor;

/// Document-level drag traffic is always cancelled.
pub fn update_document_drag(_kind: DragKind) -> Option<Cmd> {
    Some(Cmd::PreventDefault)
}

pub fn update_drop<E: Engine>(editor: &mut Editor<E>, files: Vec<DroppedFile>) -> Option<Cmd> {
    if files.is_empty() {
        return Some(Cmd::PreventDefault);
    }
    tracing::debug!(count = files.len(), root = ?editor.root(), "files dropped on editor");
    Some(Cmd::batch(vec![Cmd::PreventDefault, Cmd::UploadFiles(files)]))
}
