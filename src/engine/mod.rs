//! Host editing engine: the page-global live selection and the native
//! execCommand-style primitives.
//!
//! The editor never owns the live selection. Anything on the page may move
//! it, so the editor snapshots it into its own store and writes it back right
//! before acting (see [`crate::selection`]).
//!
//! [`SimulatedEngine`] is an in-process engine with a documented subset of
//! native behaviour, used by tests, benchmarks and the replay tool.

mod simulated;

use serde::{Deserialize, Serialize};

use crate::dom::{Dom, Range};
use crate::messages::Key;

pub use simulated::SimulatedEngine;

/// Browser engine family; drives strategy selection where engines disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineFamily {
    /// Blink/WebKit
    #[default]
    Webkit,
    Gecko,
    /// Legacy engines without `insertHTML` or `Range::insertNode`
    Trident,
}

impl EngineFamily {
    pub fn is_webkit(&self) -> bool {
        matches!(self, EngineFamily::Webkit)
    }
}

/// Primitives an engine advertises, probed once per editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Native `insertHTML` command
    pub insert_html: bool,
    /// Direct range manipulation (`deleteContents` + `insertNode`)
    pub range_insert_node: bool,
    /// Legacy "paste HTML into range" primitive
    pub paste_html: bool,
}

/// The page-global selection (`window.getSelection()`).
pub trait SelectionService {
    fn range_count(&self) -> usize;
    fn range_at(&self, index: usize) -> Option<Range>;
    fn remove_all_ranges(&mut self);
    fn add_range(&mut self, range: Range);
}

/// Native editing primitives acting on the live selection.
pub trait Engine: SelectionService {
    fn family(&self) -> EngineFamily;

    fn capabilities(&self) -> Capabilities;

    /// Run a named native command; `false` when unsupported or inapplicable.
    fn exec_command(&mut self, dom: &mut Dom, name: &str, value: Option<&str>) -> bool;

    fn query_command_state(&self, dom: &Dom, name: &str) -> bool;

    fn query_command_value(&self, dom: &Dom, name: &str) -> String;

    fn query_command_supported(&self, name: &str) -> bool;

    /// Legacy primitive: replace `range` with `html`.
    fn paste_html(&mut self, dom: &mut Dom, range: Range, html: &str) -> bool;

    /// What the engine does on its own for a key press nobody prevented.
    fn default_key_action(&mut self, dom: &mut Dom, key: &Key);
}
