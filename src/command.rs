//! Command engine: named editing commands run against the persisted range.
//!
//! Every command goes through the same sequence: restore the saved range,
//! run a custom handler (`insertHTML`, `insertElem`) or the engine's native
//! command, then refresh menus, re-save, re-restore and report a content
//! change. Commands never fail towards the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::commands::Cmd;
use crate::dom::NodeId;
use crate::engine::{Capabilities, Engine, EngineFamily};
use crate::model::Editor;

/// How `insertHTML` reaches the document on this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStrategy {
    /// The engine's own `insertHTML` command
    NativeInsertHtml,
    /// Delete the range contents and insert parsed nodes
    RangeInsertNode,
    /// Legacy "paste HTML into range" primitive
    PasteHtml,
    Unavailable,
}

impl InsertStrategy {
    pub fn probe(caps: Capabilities) -> Self {
        if caps.insert_html {
            InsertStrategy::NativeInsertHtml
        } else if caps.range_insert_node {
            InsertStrategy::RangeInsertNode
        } else if caps.paste_html {
            InsertStrategy::PasteHtml
        } else {
            InsertStrategy::Unavailable
        }
    }
}

/// How an empty selection gets something to format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStrategy {
    /// Insert a bare zero-width space and select it
    ZeroWidthText,
    /// Insert a zero-width space wrapped in an inline element and select
    /// the element's contents
    WrappedElement,
}

impl MarkerStrategy {
    pub fn for_family(family: EngineFamily) -> Self {
        if family.is_webkit() {
            MarkerStrategy::ZeroWidthText
        } else {
            MarkerStrategy::WrappedElement
        }
    }
}

/// Engine-dependent strategies, resolved once per editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub insert: InsertStrategy,
    pub marker: MarkerStrategy,
}

impl Command {
    pub fn resolve(engine: &impl Engine) -> Self {
        Self {
            insert: InsertStrategy::probe(engine.capabilities()),
            marker: MarkerStrategy::for_family(engine.family()),
        }
    }

    /// Whether `insertHTML` can do anything on this engine.
    pub fn can_insert_html(&self) -> bool {
        self.insert != InsertStrategy::Unavailable
    }
}

/// Value passed along with a command name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommandValue {
    #[default]
    None,
    Text(String),
    /// An already-built node, for `insertElem`
    Elem(NodeId),
}

impl CommandValue {
    fn as_text(&self) -> Option<&str> {
        match self {
            CommandValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Option<&str>> for CommandValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(CommandValue::None, |text| CommandValue::Text(text.to_string()))
    }
}

/// Character-level formats offered by the menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InlineFormat {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
}

impl InlineFormat {
    pub fn command_name(&self) -> &'static str {
        match self {
            InlineFormat::Bold => "bold",
            InlineFormat::Italic => "italic",
            InlineFormat::Underline => "underline",
            InlineFormat::StrikeThrough => "strikeThrough",
        }
    }
}

impl<E: Engine> Editor<E> {
    /// Run command `name` with an optional text value.
    pub fn exec(&mut self, name: &str, value: Option<&str>) {
        self.exec_with(name, CommandValue::from(value));
    }

    /// Run command `name` with `value`. Silent no-op without a saved range.
    pub fn exec_with(&mut self, name: &str, value: CommandValue) {
        if self.get_range().is_none() {
            trace!(name, "no saved range, command skipped");
            return;
        }
        self.restore_selection();

        match (name, &value) {
            ("insertHTML", _) => {
                let html = value.as_text().unwrap_or_default().to_string();
                self.insert_html(&html);
            }
            ("insertElem", CommandValue::Elem(elem)) => self.insert_elem(*elem),
            ("insertElem", _) => debug!("insertElem without an element"),
            _ => {
                let handled = self
                    .engine
                    .exec_command(&mut self.dom, name, value.as_text());
                trace!(name, handled, "native command");
            }
        }

        self.push_effect(Cmd::RefreshMenus);
        self.save_range(None);
        self.restore_selection();
        self.notify_change();
    }

    /// Insert `html` at the saved range using the resolved strategy.
    pub fn insert_html(&mut self, html: &str) {
        match self.cmd.insert {
            InsertStrategy::NativeInsertHtml => {
                self.engine
                    .exec_command(&mut self.dom, "insertHTML", Some(html));
            }
            InsertStrategy::RangeInsertNode => {
                let Some(mut range) = self.get_range() else {
                    return;
                };
                let nodes = self.dom.parse_fragment(html);
                let inserted = self
                    .dom
                    .delete_contents(&mut range)
                    .and_then(|_| self.dom.insert_nodes(&mut range, &nodes));
                if let Err(err) = inserted {
                    debug!(%err, "insertHTML failed");
                    return;
                }
                range.collapse(false);
                self.select_live(range);
            }
            InsertStrategy::PasteHtml => {
                let Some(range) = self.get_range() else {
                    return;
                };
                self.engine.paste_html(&mut self.dom, range, html);
            }
            InsertStrategy::Unavailable => {}
        }
    }

    /// Replace the saved range contents with `elem`.
    pub fn insert_elem(&mut self, elem: NodeId) {
        let Some(mut range) = self.get_range() else {
            return;
        };
        let inserted = self
            .dom
            .delete_contents(&mut range)
            .and_then(|_| self.dom.insert_node(&mut range, elem));
        match inserted {
            Ok(()) => self.select_live(range),
            Err(err) => debug!(%err, "insertElem failed"),
        }
    }

    pub fn query_command_state(&self, name: &str) -> bool {
        self.engine.query_command_state(&self.dom, name)
    }

    pub fn query_command_value(&self, name: &str) -> String {
        self.engine.query_command_value(&self.dom, name)
    }

    pub fn query_command_supported(&self, name: &str) -> bool {
        self.engine.query_command_supported(name)
    }

    /// Apply a character format the way a toolbar button does, including on
    /// an empty selection.
    pub fn format_inline(&mut self, format: InlineFormat) {
        let empty = self.is_selection_empty();
        if empty {
            self.create_empty_range();
        }
        self.exec(format.command_name(), None);
        if empty {
            self.collapse_range(false);
            self.restore_selection();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::dom::{Boundary, Range};
    use crate::engine::SimulatedEngine;

    #[test]
    fn test_probe_prefers_native_then_range_then_paste() {
        let caps = |insert_html, range_insert_node, paste_html| Capabilities {
            insert_html,
            range_insert_node,
            paste_html,
        };
        assert_eq!(InsertStrategy::probe(caps(true, true, true)), InsertStrategy::NativeInsertHtml);
        assert_eq!(InsertStrategy::probe(caps(false, true, true)), InsertStrategy::RangeInsertNode);
        assert_eq!(InsertStrategy::probe(caps(false, false, true)), InsertStrategy::PasteHtml);
        assert_eq!(InsertStrategy::probe(caps(false, false, false)), InsertStrategy::Unavailable);
    }

    #[test]
    fn test_insert_html_available_through_any_strategy() {
        assert!(Command::resolve(&SimulatedEngine::webkit()).can_insert_html());
        assert!(Command::resolve(&SimulatedEngine::trident()).can_insert_html());
        let none = Command {
            insert: InsertStrategy::Unavailable,
            marker: MarkerStrategy::ZeroWidthText,
        };
        assert!(!none.can_insert_html());
    }

    #[test]
    fn test_marker_strategy_by_family() {
        assert_eq!(MarkerStrategy::for_family(EngineFamily::Webkit), MarkerStrategy::ZeroWidthText);
        assert_eq!(MarkerStrategy::for_family(EngineFamily::Gecko), MarkerStrategy::WrappedElement);
    }

    #[test]
    fn test_exec_without_range_is_noop() {
        let mut editor = Editor::new(SimulatedEngine::webkit(), EditorConfig::default());
        editor.selection.clear();
        editor.exec("insertHTML", Some("<b>x</b>"));
        assert_eq!(editor.html(), "<p><br></p>");
        assert_eq!(editor.take_effects(), None);
    }

    #[test]
    fn test_exec_emits_menu_refresh_and_change() {
        let mut editor = Editor::new(SimulatedEngine::webkit(), EditorConfig::default());
        editor.set_html("<p>abc</p>");
        let t = editor.dom.first_child(editor.dom.first_child(editor.root()).unwrap()).unwrap();
        editor.save_range(Some(Range::new(Boundary::new(t, 0), Boundary::new(t, 3))));
        editor.exec("insertHTML", Some("<b>x</b>"));
        assert_eq!(editor.html(), "<p><b>x</b></p>");
        assert_eq!(
            editor.take_effects(),
            Some(Cmd::batch(vec![
                Cmd::RefreshMenus,
                Cmd::ContentChanged("<p><b>x</b></p>".to_string()),
            ]))
        );
    }

    #[test]
    fn test_insert_elem_replaces_selection() {
        let mut editor = Editor::new(SimulatedEngine::gecko(), EditorConfig::default());
        editor.set_html("<p>abc</p>");
        let t = editor.dom.first_child(editor.dom.first_child(editor.root()).unwrap()).unwrap();
        editor.save_range(Some(Range::new(Boundary::new(t, 1), Boundary::new(t, 2))));
        let img = editor.dom.create_element("img");
        editor.exec_with("insertElem", CommandValue::Elem(img));
        assert_eq!(editor.html(), "<p>a<img>c</p>");
        assert_eq!(editor.get_selection_container_elem(), editor.dom.parent(img));
    }

    #[test]
    fn test_query_passthroughs() {
        let editor = Editor::new(SimulatedEngine::trident(), EditorConfig::default());
        assert!(!editor.query_command_supported("insertHTML"));
        assert!(editor.query_command_supported("bold"));
        assert_eq!(editor.query_command_value("formatBlock"), "p");
        assert!(!editor.query_command_state("bold"));
    }

    #[test]
    fn test_format_inline_on_caret_keeps_caret_inside_format() {
        let mut editor = Editor::new(SimulatedEngine::webkit(), EditorConfig::default());
        editor.set_html("<p>abc</p>");
        editor.format_inline(InlineFormat::Bold);
        assert!(editor.is_selection_empty());
        assert!(editor.query_command_state("bold"));
        assert_eq!(editor.html(), "<p>abc<b></b></p>");
    }
}
