//! Selection store tests
//!
//! Saved ranges must only ever point into the editable region.

mod common;

use common::{find_tag, marker_count, select, test_editor, test_editor_on, text_nodes};
use richedit::dom::{Boundary, Range};
use richedit::engine::{EngineFamily, SelectionService};
use richedit::InlineFormat;

// ========================================================================
// Save / get
// ========================================================================

#[test]
fn test_live_ranges_inside_region_round_trip() {
    let mut editor = test_editor("<p>one <b>two</b></p><ul><li>three</li></ul>");
    let texts = text_nodes(&editor);
    let root = editor.root();
    let candidates = [
        Range::collapsed_at(Boundary::new(texts[0], 2)),
        Range::new(Boundary::new(texts[0], 1), Boundary::new(texts[1], 2)),
        Range::new(Boundary::new(texts[1], 0), Boundary::new(texts[2], 5)),
        Range::new(Boundary::new(root, 0), Boundary::new(root, 2)),
    ];
    for range in candidates {
        editor.select_live(range);
        editor.save_range(None);
        assert_eq!(editor.get_range(), Some(range));
    }
}

#[test]
fn test_live_ranges_outside_region_leave_store_unchanged() {
    let mut editor = test_editor("<p>inside</p>");
    let body = editor.dom.body();
    let panel = editor.dom.create_element("div");
    editor.dom.append_child(body, panel).unwrap();
    editor.dom.set_inner_html(panel, "<input><span>link text</span>").unwrap();
    let outside_text = editor
        .dom
        .descendants(panel)
        .into_iter()
        .find(|&n| editor.dom.is_text(n))
        .unwrap();

    select(&mut editor, 1, 3);
    let saved = editor.get_range();
    assert!(saved.is_some());

    let inside = text_nodes(&editor)[0];
    let outside = [
        Range::collapsed_at(Boundary::new(outside_text, 2)),
        Range::collapsed_at(Boundary::new(body, 0)),
        // Straddles the region boundary: common ancestor is the body.
        Range::new(Boundary::new(inside, 1), Boundary::new(outside_text, 1)),
    ];
    for range in outside {
        editor.select_live(range);
        editor.save_range(None);
        assert_eq!(editor.get_range(), saved);
    }
}

#[test]
fn test_explicit_save_is_unconditional() {
    let mut editor = test_editor("<p>x</p>");
    let body = editor.dom.body();
    let range = Range::collapsed_at(Boundary::new(body, 0));
    editor.save_range(Some(range));
    assert_eq!(editor.get_range(), Some(range));
}

// ========================================================================
// Emptiness and collapse
// ========================================================================

#[test]
fn test_is_selection_empty_iff_boundaries_equal() {
    let mut editor = test_editor("<p>abc</p>");
    let t = text_nodes(&editor)[0];
    let p = find_tag(&editor, "p");

    editor.save_range(Some(Range::collapsed_at(Boundary::new(t, 1))));
    assert!(editor.is_selection_empty());

    editor.save_range(Some(Range::new(Boundary::new(t, 1), Boundary::new(t, 2))));
    assert!(!editor.is_selection_empty());

    // Same visual spot, different containers: not empty.
    editor.save_range(Some(Range::new(Boundary::new(p, 0), Boundary::new(t, 0))));
    assert!(!editor.is_selection_empty());

    editor.selection.clear();
    assert!(!editor.is_selection_empty());
}

#[test]
fn test_collapse_range_touches_live_selection_only_on_restore() {
    let mut editor = test_editor("<p>abcdef</p>");
    select(&mut editor, 1, 4);
    let live_before = editor.engine.range_at(0);

    editor.collapse_range(false);
    assert!(editor.is_selection_empty());
    assert_eq!(editor.engine.range_at(0), live_before);

    editor.restore_selection();
    assert_eq!(editor.engine.range_at(0), editor.get_range());
    let t = text_nodes(&editor)[0];
    assert_eq!(editor.get_range(), Some(Range::collapsed_at(Boundary::new(t, 4))));
}

#[test]
fn test_idle_store_methods_are_noops() {
    let mut editor = test_editor("<p>abc</p>");
    editor.selection.clear();
    editor.collapse_range(true);
    editor.restore_selection();
    editor.create_empty_range();
    assert_eq!(editor.get_range(), None);
    assert_eq!(editor.get_selection_text(), "");
    assert_eq!(editor.get_selection_container_elem(), None);
    assert_eq!(editor.get_selection_start_elem(), None);
    assert_eq!(editor.get_selection_end_elem(), None);
    assert_eq!(editor.html(), "<p>abc</p>");
}

// ========================================================================
// Empty-range marker
// ========================================================================

#[test]
fn test_create_empty_range_refuses_real_selection() {
    for family in [EngineFamily::Webkit, EngineFamily::Gecko] {
        let mut editor = test_editor_on(family, "<p>abc</p>");
        select(&mut editor, 0, 2);
        let saved = editor.get_range();
        editor.create_empty_range();
        assert_eq!(marker_count(&editor), 0);
        assert_eq!(editor.get_range(), saved);
    }
}

#[test]
fn test_bold_on_empty_selection_adds_one_hidden_marker() {
    for family in [EngineFamily::Webkit, EngineFamily::Gecko] {
        let mut editor = test_editor_on(family, "<p>abc</p>");
        select(&mut editor, 3, 3);
        let before = marker_count(&editor);

        editor.format_inline(InlineFormat::Bold);

        assert_eq!(marker_count(&editor), before + 1, "{:?}", family);
        assert!(!editor.html().contains('\u{200b}'));
        assert!(!editor.text().contains('\u{200b}'));
        assert!(editor.is_selection_empty());
        assert!(editor.query_command_state("bold"), "{:?}", family);
    }
}

#[test]
fn test_typing_after_empty_bold_lands_inside_bold() {
    let mut editor = test_editor("<p>abc</p>");
    select(&mut editor, 3, 3);
    editor.format_inline(InlineFormat::Bold);
    richedit::runtime::type_text(&mut editor, "XY");
    assert_eq!(editor.html(), "<p>abc<b>XY</b></p>");
}

#[test]
fn test_bold_off_at_caret_keeps_typed_text_bold() {
    for family in [EngineFamily::Webkit, EngineFamily::Gecko] {
        let mut editor = test_editor_on(family, "<p>abc</p>");
        select(&mut editor, 3, 3);
        editor.format_inline(InlineFormat::Bold);
        richedit::runtime::type_text(&mut editor, "Q");

        editor.format_inline(InlineFormat::Bold);
        assert!(!editor.query_command_state("bold"), "{:?}", family);
        richedit::runtime::type_text(&mut editor, "R");

        assert_eq!(editor.text(), "abcQR", "{:?}", family);
        assert!(editor.html().contains("<b>Q</b>"), "{:?}: {}", family, editor.html());
        let r = text_nodes(&editor)
            .into_iter()
            .find(|&n| editor.dom.text(n).is_some_and(|t| t.contains('R')))
            .unwrap();
        assert!(
            editor.dom.closest(r, |dom, n| dom.has_tag(n, "b")).is_none(),
            "{:?}: {}",
            family,
            editor.html()
        );
    }
}

#[test]
fn test_container_elem_tracks_inline_context() {
    let mut editor = test_editor("<p>see <a href=\"#\">link</a></p>");
    select(&mut editor, 5, 6);
    let container = editor.get_selection_container_elem().unwrap();
    assert_eq!(editor.dom.node_name(container), "A");
}
