//! In-process engine.
//!
//! Implements the subset of native editing the core relies on:
//! `insertHTML`, `insertText`, the character formats (`bold`, `italic`,
//! `underline`, `strikeThrough`) on non-collapsed selections, and
//! `formatBlock`. Commands only act inside an editing host
//! (`contenteditable="true"`), like their native counterparts.

use crate::dom::{escape_text, Boundary, Dom, DomError, NodeId, Range};
use crate::messages::Key;

use super::{Capabilities, Engine, EngineFamily, SelectionService};

/// Character formats: command name, tag the engine writes, tags it
/// recognises as already applying the format.
const INLINE_FORMATS: &[(&str, &str, &[&str])] = &[
    ("bold", "b", &["b", "strong"]),
    ("italic", "i", &["i", "em"]),
    ("underline", "u", &["u"]),
    ("strikethrough", "strike", &["strike", "s", "del"]),
];

fn inline_format(name: &str) -> Option<(&'static str, &'static [&'static str])> {
    INLINE_FORMATS
        .iter()
        .find(|(command, _, _)| command.eq_ignore_ascii_case(name))
        .map(|&(_, tag, aliases)| (tag, aliases))
}

/// Deterministic engine backed by the arena document.
#[derive(Debug, Clone, Default)]
pub struct SimulatedEngine {
    family: EngineFamily,
    ranges: Vec<Range>,
}

impl SimulatedEngine {
    pub fn new(family: EngineFamily) -> Self {
        Self {
            family,
            ranges: Vec::new(),
        }
    }

    pub fn webkit() -> Self {
        Self::new(EngineFamily::Webkit)
    }

    pub fn gecko() -> Self {
        Self::new(EngineFamily::Gecko)
    }

    pub fn trident() -> Self {
        Self::new(EngineFamily::Trident)
    }

    fn select(&mut self, range: Range) {
        self.ranges.clear();
        self.ranges.push(range);
    }

    /// Delete `range`, put `html` in its place and leave a caret after it.
    fn replace_with_html(&mut self, dom: &mut Dom, mut range: Range, html: &str) -> bool {
        if dom.delete_contents(&mut range).is_err() {
            return false;
        }
        let nodes = dom.parse_fragment(html);
        let caret = match nodes.as_slice() {
            [] => range.start,
            [single] if dom.is_text(*single) && dom.is_text(range.start.node) => {
                let data = dom.text(*single).unwrap_or_default().to_string();
                let at = range.start;
                if dom.insert_text(at.node, at.offset, &data).is_err() {
                    return false;
                }
                Boundary::new(at.node, at.offset + data.chars().count())
            }
            _ => {
                if dom.insert_nodes(&mut range, &nodes).is_err() {
                    return false;
                }
                range.end
            }
        };
        self.select(Range::collapsed_at(caret));
        true
    }

    fn insert_html(&mut self, dom: &mut Dom, html: &str) -> bool {
        match self.range_at(0) {
            Some(range) if editing_host(dom, range.start.node).is_some() => {
                self.replace_with_html(dom, range, html)
            }
            _ => false,
        }
    }

    fn toggle_inline(&mut self, dom: &mut Dom, tag: &str, aliases: &[&str]) -> bool {
        let Some(range) = self.range_at(0) else {
            return false;
        };
        let Some(host) = editing_host(dom, range.start.node) else {
            return false;
        };
        // Typing-style toggles on a caret are not modelled.
        if range.is_collapsed() {
            return false;
        }

        let active = inline_ancestor(dom, host, node_at(dom, range.start), aliases).is_some();
        let Ok(texts) = dom.split_text_nodes_in_range(&range) else {
            return false;
        };
        let (Some(&first), Some(&last)) = (texts.first(), texts.last()) else {
            return false;
        };

        for &text in &texts {
            if active {
                if let Some(element) = inline_ancestor(dom, host, text, aliases) {
                    if unwrap_around(dom, element, text).is_err() {
                        return false;
                    }
                }
            } else {
                let wrapper = dom.create_element(tag);
                if dom.insert_before(text, wrapper).is_err()
                    || dom.append_child(wrapper, text).is_err()
                {
                    return false;
                }
            }
        }

        let end = dom.node_len(last);
        self.select(Range::new(
            Boundary::new(first, 0),
            Boundary::new(last, end),
        ));
        true
    }

    fn format_block(&mut self, dom: &mut Dom, value: Option<&str>) -> bool {
        let tag = value
            .unwrap_or_default()
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>')
            .to_ascii_lowercase();
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        let Some(range) = self.range_at(0) else {
            return false;
        };
        let Some(host) = editing_host(dom, range.start.node) else {
            return false;
        };
        let Some(block) = block_of(dom, host, node_at(dom, range.start)) else {
            return false;
        };

        let replacement = dom.create_element(&tag);
        if dom.is_text(block) {
            if dom.replace(block, replacement).is_err()
                || dom.append_child(replacement, block).is_err()
            {
                return false;
            }
        } else {
            if dom.has_tag(block, &tag) {
                return true;
            }
            for child in dom.children(block).to_vec() {
                if dom.append_child(replacement, child).is_err() {
                    return false;
                }
            }
            if dom.replace(block, replacement).is_err() {
                return false;
            }
        }

        let remap = |at: Boundary| {
            if at.node == block && dom.is_element(block) {
                Boundary::new(replacement, at.offset)
            } else {
                at
            }
        };
        let remapped = Range::new(remap(range.start), remap(range.end));
        self.select(remapped);
        true
    }

    /// Native Enter: split the current block at the caret.
    fn split_block(&mut self, dom: &mut Dom) {
        let Some(mut range) = self.range_at(0) else {
            return;
        };
        let Some(host) = editing_host(dom, range.start.node) else {
            return;
        };
        if dom.delete_contents(&mut range).is_err() {
            return;
        }
        let caret = range.start;

        let Some(block) = block_of(dom, host, caret.node).filter(|&b| dom.is_element(b)) else {
            let paragraph = dom.create_element("p");
            let br = dom.create_element("br");
            let _ = dom.append_child(paragraph, br);
            let index = if caret.node == host { caret.offset } else { dom.node_len(host) };
            if dom.insert_child(host, index.min(dom.node_len(host)), paragraph).is_ok() {
                self.select(Range::collapsed_at(Boundary::new(paragraph, 0)));
            }
            return;
        };

        let tag = if dom.has_tag(block, "p") { "p" } else { "div" };
        let next = dom.create_element(tag);
        let mut tail = Range::new(caret, Boundary::new(block, dom.node_len(block)));
        let Ok(moved) = dom.extract_contents(&mut tail) else {
            return;
        };
        for node in moved {
            let _ = dom.append_child(next, node);
        }
        ensure_placeholder(dom, block);
        ensure_placeholder(dom, next);
        if dom.insert_after(block, next).is_ok() {
            self.select(Range::collapsed_at(Boundary::new(next, 0)));
        }
    }

    /// Native Backspace on the live selection.
    fn delete_backward(&mut self, dom: &mut Dom) {
        let Some(mut range) = self.range_at(0) else {
            return;
        };
        let Some(host) = editing_host(dom, range.start.node) else {
            return;
        };
        if !range.is_collapsed() {
            if dom.delete_contents(&mut range).is_ok() {
                self.select(range);
            }
            return;
        }

        let caret = range.start;
        if dom.is_text(caret.node) && caret.offset > 0 {
            if dom.delete_text(caret.node, caret.offset - 1, caret.offset).is_err() {
                return;
            }
            let mut at = Boundary::new(caret.node, caret.offset - 1);
            if dom.node_len(caret.node) == 0 {
                if let (Some(parent), Some(index)) = (dom.parent(caret.node), dom.index_of(caret.node)) {
                    dom.detach(caret.node);
                    ensure_placeholder(dom, parent);
                    at = Boundary::new(parent, index);
                }
            }
            self.select(Range::collapsed_at(at));
            return;
        }

        let Some(block) = block_of(dom, host, caret.node) else {
            return;
        };
        let before = dom.range_to_string(&Range::new(Boundary::new(block, 0), caret));
        if !before.is_empty() {
            let previous_text = dom
                .descendants(block)
                .into_iter()
                .filter(|&node| dom.node_len(node) > 0 && dom.is_text(node))
                .take_while(|&node| {
                    dom.compare_boundaries(Boundary::new(node, dom.node_len(node)), caret)
                        != std::cmp::Ordering::Greater
                })
                .last();
            if let Some(text) = previous_text {
                let len = dom.node_len(text);
                if dom.delete_text(text, len - 1, len).is_err() {
                    return;
                }
                let mut at = Boundary::new(text, len - 1);
                if len == 1 {
                    if let (Some(parent), Some(index)) = (dom.parent(text), dom.index_of(text)) {
                        dom.detach(text);
                        ensure_placeholder(dom, block);
                        at = Boundary::new(parent, index);
                    }
                }
                self.select(Range::collapsed_at(at));
            }
            return;
        }

        if is_blank(dom, block) {
            let previous = dom.previous_sibling(block);
            let next = dom.next_sibling(block);
            dom.detach(block);
            let at = match (previous, next) {
                (Some(prev), _) => Boundary::new(prev, dom.node_len(prev)),
                (None, Some(next)) => Boundary::new(next, 0),
                (None, None) => Boundary::new(host, 0),
            };
            self.select(Range::collapsed_at(at));
            return;
        }

        if let Some(previous) = dom.previous_sibling(block).filter(|&p| dom.is_element(p)) {
            if is_blank(dom, previous) {
                dom.detach(previous);
                self.select(Range::collapsed_at(caret));
                return;
            }
            let offset = dom.node_len(previous);
            for child in dom.children(block).to_vec() {
                if dom.append_child(previous, child).is_err() {
                    return;
                }
            }
            dom.detach(block);
            self.select(Range::collapsed_at(Boundary::new(previous, offset)));
        }
    }
}

impl SelectionService for SimulatedEngine {
    fn range_count(&self) -> usize {
        self.ranges.len()
    }

    fn range_at(&self, index: usize) -> Option<Range> {
        self.ranges.get(index).copied()
    }

    fn remove_all_ranges(&mut self) {
        self.ranges.clear();
    }

    fn add_range(&mut self, range: Range) {
        // Engines keep a single range; later additions are ignored.
        if self.ranges.is_empty() {
            self.ranges.push(range);
        }
    }
}

impl Engine for SimulatedEngine {
    fn family(&self) -> EngineFamily {
        self.family
    }

    fn capabilities(&self) -> Capabilities {
        match self.family {
            EngineFamily::Webkit | EngineFamily::Gecko => Capabilities {
                insert_html: true,
                range_insert_node: true,
                paste_html: false,
            },
            EngineFamily::Trident => Capabilities {
                insert_html: false,
                range_insert_node: false,
                paste_html: true,
            },
        }
    }

    fn exec_command(&mut self, dom: &mut Dom, name: &str, value: Option<&str>) -> bool {
        if !self.query_command_supported(name) {
            return false;
        }
        if let Some((tag, aliases)) = inline_format(name) {
            return self.toggle_inline(dom, tag, aliases);
        }
        match name.to_ascii_lowercase().as_str() {
            "inserthtml" => self.insert_html(dom, value.unwrap_or_default()),
            "inserttext" => self.insert_html(dom, &escape_text(value.unwrap_or_default())),
            "formatblock" => self.format_block(dom, value),
            _ => false,
        }
    }

    fn query_command_state(&self, dom: &Dom, name: &str) -> bool {
        let Some((_, aliases)) = inline_format(name) else {
            return false;
        };
        let Some(range) = self.range_at(0) else {
            return false;
        };
        let Some(host) = editing_host(dom, range.start.node) else {
            return false;
        };
        inline_ancestor(dom, host, node_at(dom, range.start), aliases).is_some()
    }

    fn query_command_value(&self, dom: &Dom, name: &str) -> String {
        if !name.eq_ignore_ascii_case("formatBlock") {
            return String::new();
        }
        self.range_at(0)
            .and_then(|range| {
                let host = editing_host(dom, range.start.node)?;
                let block = block_of(dom, host, node_at(dom, range.start))?;
                dom.tag(block).map(str::to_string)
            })
            .unwrap_or_default()
    }

    fn query_command_supported(&self, name: &str) -> bool {
        if inline_format(name).is_some() {
            return true;
        }
        match name.to_ascii_lowercase().as_str() {
            "inserthtml" => self.capabilities().insert_html,
            "inserttext" | "formatblock" => true,
            _ => false,
        }
    }

    fn paste_html(&mut self, dom: &mut Dom, range: Range, html: &str) -> bool {
        if !self.capabilities().paste_html || editing_host(dom, range.start.node).is_none() {
            return false;
        }
        self.replace_with_html(dom, range, html)
    }

    fn default_key_action(&mut self, dom: &mut Dom, key: &Key) {
        match key {
            Key::Char(ch) => {
                self.insert_html(dom, &escape_text(&ch.to_string()));
            }
            Key::Enter => self.split_block(dom),
            Key::Backspace => self.delete_backward(dom),
            Key::Tab | Key::Other(_) => {}
        }
    }
}

fn editing_host(dom: &Dom, node: NodeId) -> Option<NodeId> {
    dom.closest(node, |dom, n| dom.attr(n, "contenteditable") == Some("true"))
}

/// The child of `host` containing `node`.
fn block_of(dom: &Dom, host: NodeId, node: NodeId) -> Option<NodeId> {
    std::iter::once(node)
        .chain(dom.ancestors(node))
        .find(|&n| dom.parent(n) == Some(host))
}

/// The node a boundary points at: the text container itself, or the child
/// right after an element boundary.
fn node_at(dom: &Dom, at: Boundary) -> NodeId {
    if dom.is_text(at.node) {
        return at.node;
    }
    dom.children(at.node)
        .get(at.offset)
        .copied()
        .unwrap_or(at.node)
}

fn inline_ancestor(dom: &Dom, host: NodeId, node: NodeId, aliases: &[&str]) -> Option<NodeId> {
    dom.closest(node, |dom, n| {
        n != host && aliases.iter().any(|alias| dom.has_tag(n, alias))
    })
    .filter(|&found| dom.contains(host, found))
}

/// Remove the format `element` from `node` only. Content beside `node` at
/// each level up to `element` moves into copies of that level's parent, so
/// unselected text keeps the format.
fn unwrap_around(dom: &mut Dom, element: NodeId, node: NodeId) -> Result<(), DomError> {
    let mut current = node;
    while current != element {
        let parent = dom.parent(current).ok_or(DomError::Detached(current))?;
        let index = dom.index_of(current).unwrap_or(0);
        let siblings = dom.children(parent).to_vec();
        let (head, tail) = siblings.split_at(index);
        let head = non_empty(dom, head);
        let tail = non_empty(dom, &tail[1..]);

        if !head.is_empty() {
            let copy = dom.clone_shallow(parent);
            dom.insert_before(parent, copy)?;
            for n in head {
                dom.append_child(copy, n)?;
            }
        }
        if !tail.is_empty() {
            let copy = dom.clone_shallow(parent);
            dom.insert_after(parent, copy)?;
            for n in tail {
                dom.append_child(copy, n)?;
            }
        }
        current = parent;
    }
    dom.unwrap(element)
}

/// `nodes` without empty text nodes.
fn non_empty(dom: &Dom, nodes: &[NodeId]) -> Vec<NodeId> {
    nodes
        .iter()
        .copied()
        .filter(|&n| !(dom.is_text(n) && dom.node_len(n) == 0))
        .collect()
}

fn is_blank(dom: &Dom, element: NodeId) -> bool {
    let text = dom.text_content(element).replace('\u{200b}', "");
    text.is_empty() && !dom.descendants(element).iter().any(|&n| dom.has_tag(n, "img"))
}

/// Give an empty block a `<br>` so it keeps a line box.
fn ensure_placeholder(dom: &mut Dom, element: NodeId) {
    let has_content = dom.descendants(element).iter().any(|&n| {
        dom.has_tag(n, "br") || dom.has_tag(n, "img") || dom.text(n).is_some_and(|t| !t.is_empty())
    });
    if !has_content && dom.is_element(element) {
        let br = dom.create_element("br");
        let _ = dom.append_child(element, br);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editable(html: &str) -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        dom.set_attr(root, "contenteditable", "true").unwrap();
        dom.append_child(dom.body(), root).unwrap();
        dom.set_inner_html(root, html).unwrap();
        (dom, root)
    }

    fn text_nodes(dom: &Dom, root: NodeId) -> Vec<NodeId> {
        dom.descendants(root)
            .into_iter()
            .filter(|&n| dom.is_text(n))
            .collect()
    }

    #[test]
    fn test_insert_html_splices_plain_text() {
        let (mut dom, root) = editable("<p>ab</p>");
        let t = text_nodes(&dom, root)[0];
        let mut engine = SimulatedEngine::webkit();
        engine.add_range(Range::collapsed_at(Boundary::new(t, 1)));
        assert!(engine.exec_command(&mut dom, "insertHTML", Some("X")));
        assert_eq!(dom.inner_html(root), "<p>aXb</p>");
        assert_eq!(engine.range_at(0), Some(Range::collapsed_at(Boundary::new(t, 2))));
    }

    #[test]
    fn test_bold_wraps_and_unwraps_selection() {
        let (mut dom, root) = editable("<p>abcd</p>");
        let t = text_nodes(&dom, root)[0];
        let mut engine = SimulatedEngine::webkit();
        engine.add_range(Range::new(Boundary::new(t, 1), Boundary::new(t, 3)));
        assert!(engine.exec_command(&mut dom, "bold", None));
        assert_eq!(dom.inner_html(root), "<p>a<b>bc</b>d</p>");
        assert!(engine.query_command_state(&dom, "bold"));

        assert!(engine.exec_command(&mut dom, "bold", None));
        assert_eq!(dom.inner_html(root), "<p>abcd</p>");
        assert!(!engine.query_command_state(&dom, "bold"));
    }

    #[test]
    fn test_bold_off_inside_longer_run_splits_it() {
        let (mut dom, root) = editable("<p><b>abcd</b></p>");
        let t = text_nodes(&dom, root)[0];
        let mut engine = SimulatedEngine::webkit();
        engine.add_range(Range::new(Boundary::new(t, 1), Boundary::new(t, 3)));
        assert!(engine.exec_command(&mut dom, "bold", None));
        assert_eq!(dom.inner_html(root), "<p><b>a</b>bc<b>d</b></p>");
        assert!(!engine.query_command_state(&dom, "bold"));
    }

    #[test]
    fn test_italic_off_keeps_outer_format_and_attrs() {
        let (mut dom, root) = editable("<p><em class=\"x\"><u>abcd</u></em></p>");
        let t = text_nodes(&dom, root)[0];
        let mut engine = SimulatedEngine::gecko();
        engine.add_range(Range::new(Boundary::new(t, 0), Boundary::new(t, 2)));
        assert!(engine.exec_command(&mut dom, "italic", None));
        assert_eq!(
            dom.inner_html(root),
            "<p><u>ab</u><em class=\"x\"><u>cd</u></em></p>"
        );
    }

    #[test]
    fn test_bold_on_caret_does_nothing() {
        let (mut dom, root) = editable("<p>abcd</p>");
        let t = text_nodes(&dom, root)[0];
        let mut engine = SimulatedEngine::gecko();
        engine.add_range(Range::collapsed_at(Boundary::new(t, 2)));
        assert!(!engine.exec_command(&mut dom, "bold", None));
        assert_eq!(dom.inner_html(root), "<p>abcd</p>");
    }

    #[test]
    fn test_format_block_renames_current_block() {
        let (mut dom, root) = editable("<p>title</p><p>body</p>");
        let t = text_nodes(&dom, root)[0];
        let mut engine = SimulatedEngine::webkit();
        engine.add_range(Range::collapsed_at(Boundary::new(t, 2)));
        assert!(engine.exec_command(&mut dom, "formatBlock", Some("<H1>")));
        assert_eq!(dom.inner_html(root), "<h1>title</h1><p>body</p>");
        assert_eq!(engine.query_command_value(&dom, "formatBlock"), "h1");
    }

    #[test]
    fn test_commands_outside_editing_host_are_refused() {
        let mut dom = Dom::new();
        let input = dom.create_element("span");
        let text = dom.create_text("panel");
        dom.append_child(input, text).unwrap();
        dom.append_child(dom.body(), input).unwrap();
        let mut engine = SimulatedEngine::webkit();
        engine.add_range(Range::collapsed_at(Boundary::new(text, 0)));
        assert!(!engine.exec_command(&mut dom, "insertHTML", Some("x")));
        assert_eq!(dom.text(text), Some("panel"));
    }

    #[test]
    fn test_trident_lacks_insert_html_but_pastes() {
        let (mut dom, root) = editable("<p>ab</p>");
        let t = text_nodes(&dom, root)[0];
        let mut engine = SimulatedEngine::trident();
        assert!(!engine.query_command_supported("insertHTML"));
        let range = Range::new(Boundary::new(t, 0), Boundary::new(t, 2));
        assert!(engine.paste_html(&mut dom, range, "<i>z</i>"));
        assert_eq!(dom.inner_html(root), "<p><i>z</i></p>");
    }

    #[test]
    fn test_enter_splits_paragraph() {
        let (mut dom, root) = editable("<p>abcd</p>");
        let t = text_nodes(&dom, root)[0];
        let mut engine = SimulatedEngine::webkit();
        engine.add_range(Range::collapsed_at(Boundary::new(t, 2)));
        engine.default_key_action(&mut dom, &Key::Enter);
        assert_eq!(dom.inner_html(root), "<p>ab</p><p>cd</p>");
    }

    #[test]
    fn test_enter_at_end_of_heading_opens_div() {
        let (mut dom, root) = editable("<h1>ab</h1>");
        let t = text_nodes(&dom, root)[0];
        let mut engine = SimulatedEngine::webkit();
        engine.add_range(Range::collapsed_at(Boundary::new(t, 2)));
        engine.default_key_action(&mut dom, &Key::Enter);
        assert_eq!(dom.inner_html(root), "<h1>ab</h1><div><br></div>");
    }

    #[test]
    fn test_backspace_removes_char_then_leaves_placeholder() {
        let (mut dom, root) = editable("<p>a</p>");
        let t = text_nodes(&dom, root)[0];
        let mut engine = SimulatedEngine::webkit();
        engine.add_range(Range::collapsed_at(Boundary::new(t, 1)));
        engine.default_key_action(&mut dom, &Key::Backspace);
        assert_eq!(dom.inner_html(root), "<p><br></p>");
    }

    #[test]
    fn test_backspace_from_element_caret_leaves_placeholder() {
        let (mut dom, root) = editable("<p>a</p>");
        let p = dom.first_child(root).unwrap();
        let mut engine = SimulatedEngine::webkit();
        engine.add_range(Range::collapsed_at(Boundary::new(p, 1)));
        engine.default_key_action(&mut dom, &Key::Backspace);
        assert_eq!(dom.inner_html(root), "<p><br></p>");
        assert_eq!(engine.range_at(0), Some(Range::collapsed_at(Boundary::new(p, 0))));
    }

    #[test]
    fn test_backspace_in_blank_only_block_empties_host() {
        let (mut dom, root) = editable("<h1><br></h1>");
        let h1 = dom.first_child(root).unwrap();
        let mut engine = SimulatedEngine::webkit();
        engine.add_range(Range::collapsed_at(Boundary::new(h1, 0)));
        engine.default_key_action(&mut dom, &Key::Backspace);
        assert_eq!(dom.inner_html(root), "");
    }
}
