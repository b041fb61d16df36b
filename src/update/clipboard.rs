//! Paste handling.
//!
//! Two handlers share each paste event, image first, then text. The paste
//! throttle lets only one of them act.

use tracing::trace;

use crate::commands::Cmd;
use crate::engine::{Engine, EngineFamily};
use crate::messages::ClipboardData;
use crate::model::Editor;
use crate::sanitize;

pub fn update_paste<E: Engine>(
    editor: &mut Editor<E>,
    data: &ClipboardData,
    time_ms: u64,
) -> Option<Cmd> {
    // Legacy engines keep their native paste.
    if editor.engine.family() == EngineFamily::Trident {
        return None;
    }

    let upload = paste_images(editor, data, time_ms);
    if upload.is_none() {
        paste_text(editor, data, time_ms);
    }
    Some(Cmd::merge(Some(Cmd::PreventDefault), upload).unwrap_or_default())
}

fn in_code<E: Engine>(editor: &Editor<E>) -> Option<bool> {
    let container = editor.get_selection_container_elem()?;
    Some(editor.dom.has_tag(container, "code") || editor.dom.has_tag(container, "pre"))
}

fn paste_images<E: Engine>(
    editor: &mut Editor<E>,
    data: &ClipboardData,
    time_ms: u64,
) -> Option<Cmd> {
    let images: Vec<_> = data.files.iter().filter(|f| f.is_image()).cloned().collect();
    if images.is_empty() || in_code(editor) != Some(false) {
        return None;
    }
    if !editor.paste.try_begin(time_ms) {
        trace!("image paste throttled");
        return None;
    }
    Some(Cmd::UploadFiles(images))
}

fn paste_text<E: Engine>(editor: &mut Editor<E>, data: &ClipboardData, time_ms: u64) {
    let Some(code) = in_code(editor) else {
        return;
    };

    let content = if code {
        // Code blocks only ever receive literal text.
        let text = sanitize::paste_text(data);
        (!text.is_empty()).then_some(text)
    } else {
        sanitize::paste_html(
            data,
            editor.config.paste_filter_style,
            editor.config.paste_ignore_img,
        )
    };
    let Some(content) = content else {
        return;
    };

    if !editor.paste.try_begin(time_ms) {
        trace!("text paste throttled");
        return;
    }
    let content = editor.apply_paste_text_handle(content);
    editor.exec("insertHTML", Some(&content));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::dom::{Boundary, Range};
    use crate::engine::SimulatedEngine;
    use crate::messages::DroppedFile;

    fn editor(html: &str) -> Editor {
        let mut editor = Editor::new(SimulatedEngine::webkit(), EditorConfig::default());
        editor.set_html(html);
        editor
    }

    #[test]
    fn test_image_paste_uploads_and_blocks_text() {
        let mut editor = editor("<p>a</p>");
        let data = ClipboardData::text("caption")
            .with_files(vec![DroppedFile::new("shot.png", "image/png", 42)]);
        let cmd = update_paste(&mut editor, &data, 1_000).unwrap();
        assert!(cmd.prevents_default());
        assert_eq!(cmd.uploads().len(), 1);
        assert_eq!(editor.html(), "<p>a</p>");
    }

    #[test]
    fn test_second_paste_within_window_ignored() {
        let mut editor = editor("<p>a</p>");
        update_paste(&mut editor, &ClipboardData::text("x"), 1_000);
        update_paste(&mut editor, &ClipboardData::text("y"), 1_200);
        assert_eq!(editor.text(), "ax");
    }

    #[test]
    fn test_paste_hook_applies() {
        let mut editor = editor("<p>a</p>");
        editor.set_paste_text_handle(|html| html.replace("secret", "***"));
        update_paste(&mut editor, &ClipboardData::text("secret"), 0);
        assert_eq!(editor.text(), "a***");
    }

    #[test]
    fn test_trident_keeps_native_paste() {
        let mut editor = Editor::new(SimulatedEngine::trident(), EditorConfig::default());
        assert_eq!(update_paste(&mut editor, &ClipboardData::text("x"), 0), None);
    }

    #[test]
    fn test_image_paste_in_code_falls_back_to_text() {
        let mut editor = editor("<pre><code>ab</code></pre>");
        let t = editor.dom.descendants(editor.root())[2];
        editor.save_range(Some(Range::collapsed_at(Boundary::new(t, 2))));
        let data = ClipboardData::text("c")
            .with_files(vec![DroppedFile::new("shot.png", "image/png", 42)]);
        let cmd = update_paste(&mut editor, &data, 0).unwrap();
        assert!(cmd.uploads().is_empty());
        assert_eq!(editor.html(), "<pre><code>abc</code></pre>");
    }
}
