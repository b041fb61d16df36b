//! Editor model: one editable region plus everything the core keeps about it.
//!
//! The selection API lives in [`crate::selection`] and the command engine
//! in [`crate::command`]; both are `impl` blocks on [`Editor`].

use crate::command::Command;
use crate::commands::Cmd;
use crate::config::EditorConfig;
use crate::dom::{Dom, NodeId, Range};
use crate::engine::{Engine, SimulatedEngine};
use crate::selection::SelectionStore;

/// Zero-width space used as the empty-range marker.
pub const ZERO_WIDTH_SPACE: char = '\u{200b}';

/// Markup of the paragraph the region falls back to when emptied.
pub const EMPTY_PARAGRAPH: &str = "<p><br></p>";

/// Minimum time between two handled paste events.
pub const PASTE_THROTTLE_MS: u64 = 500;

/// Hook applied to pasted content before it is inserted.
pub type PasteTextHandle = Box<dyn Fn(&str) -> String>;

/// Whether the next Enter inside a code block leaves it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodeExitState {
    #[default]
    Idle,
    /// The caret reached the end of the code block on the previous Enter
    AwaitingExit,
}

/// Remembers when a paste was last handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasteThrottle {
    last_ms: Option<u64>,
}

impl PasteThrottle {
    /// Claim the current paste event. Fails when another paste was handled
    /// less than [`PASTE_THROTTLE_MS`] ago.
    pub fn try_begin(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_ms {
            if now_ms.saturating_sub(last) < PASTE_THROTTLE_MS {
                return false;
            }
        }
        self.last_ms = Some(now_ms);
        true
    }
}

/// One editor instance bound to a single `contenteditable` root.
pub struct Editor<E: Engine = SimulatedEngine> {
    /// The page document the editable region lives in
    pub dom: Dom,
    root: NodeId,
    pub engine: E,
    /// Persisted selection
    pub selection: SelectionStore,
    pub config: EditorConfig,
    /// Strategies resolved from the engine at construction
    pub(crate) cmd: Command,
    pub code_exit: CodeExitState,
    pub(crate) paste: PasteThrottle,
    paste_text_handle: Option<PasteTextHandle>,
    /// Set between mousedown and mouseup so leaving the region still saves
    pub(crate) tracking_mouse: bool,
    last_html: String,
    effects: Vec<Cmd>,
}

impl<E: Engine> std::fmt::Debug for Editor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("root", &self.root)
            .field("family", &self.engine.family())
            .field("selection", &self.selection)
            .field("cmd", &self.cmd)
            .field("code_exit", &self.code_exit)
            .finish_non_exhaustive()
    }
}

impl<E: Engine> Editor<E> {
    /// Create a page with a fresh editable region holding one empty
    /// paragraph, with the selection placed inside it.
    pub fn new(engine: E, config: EditorConfig) -> Self {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let body = dom.body();
        // A fresh element under the body cannot fail to attach.
        let _ = dom.append_child(body, root);
        Self::mount(dom, root, engine, config)
    }

    /// Turn an existing element of `dom` into the editable region.
    pub fn mount(mut dom: Dom, root: NodeId, engine: E, config: EditorConfig) -> Self {
        let _ = dom.set_attr(root, "contenteditable", "true");
        let cmd = Command::resolve(&engine);
        tracing::debug!(family = ?engine.family(), ?cmd, "editor mounted");
        let mut editor = Self {
            dom,
            root,
            engine,
            selection: SelectionStore::new(),
            config,
            cmd,
            code_exit: CodeExitState::Idle,
            paste: PasteThrottle::default(),
            paste_text_handle: None,
            tracking_mouse: false,
            last_html: String::new(),
            effects: Vec::new(),
        };
        editor.init_selection(false);
        editor.last_html = editor.html();
        editor
    }

    /// The editable root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Region markup without empty-range markers.
    pub fn html(&self) -> String {
        self.dom
            .inner_html(self.root)
            .replace(ZERO_WIDTH_SPACE, "")
    }

    /// Region text without empty-range markers.
    pub fn text(&self) -> String {
        self.dom
            .text_content(self.root)
            .replace(ZERO_WIDTH_SPACE, "")
    }

    /// Replace the region content and put the caret at its end.
    pub fn set_html(&mut self, html: &str) {
        let html = if html.trim().is_empty() {
            EMPTY_PARAGRAPH
        } else {
            html
        };
        if let Err(err) = self.dom.set_inner_html(self.root, html) {
            tracing::debug!(%err, "set_html failed");
        }
        self.init_selection(false);
    }

    pub fn clear(&mut self) {
        self.set_html(EMPTY_PARAGRAPH);
    }

    /// Append markup to the region and put the caret at its end.
    pub fn append_html(&mut self, html: &str) {
        if let Err(err) = self.dom.append_html(self.root, html) {
            tracing::debug!(%err, "append_html failed");
        }
        self.init_selection(false);
    }

    /// Point the selection at the end of the last block. With `new_line`,
    /// first make sure the region ends with an empty paragraph.
    pub fn init_selection(&mut self, new_line: bool) {
        let Some(last) = self.dom.element_children(self.root).last().copied() else {
            if self.dom.append_html(self.root, EMPTY_PARAGRAPH).is_ok() {
                self.init_selection(false);
            }
            return;
        };

        if new_line {
            let html = self.dom.inner_html(last).to_ascii_lowercase();
            if html != "<br>" || !self.dom.has_tag(last, "p") {
                if self.dom.append_html(self.root, EMPTY_PARAGRAPH).is_ok() {
                    self.init_selection(false);
                }
                return;
            }
        }

        self.create_range_by_elem(last, Some(false), true);
        self.restore_selection();
    }

    /// Install the paste hook.
    pub fn set_paste_text_handle(&mut self, handle: impl Fn(&str) -> String + 'static) {
        self.paste_text_handle = Some(Box::new(handle));
    }

    pub(crate) fn apply_paste_text_handle(&self, content: String) -> String {
        match &self.paste_text_handle {
            Some(handle) => handle(&content),
            None => content,
        }
    }

    pub(crate) fn push_effect(&mut self, cmd: Cmd) {
        self.effects.push(cmd);
    }

    /// Emit [`Cmd::ContentChanged`] when the markup differs from the last
    /// notified state.
    pub fn notify_change(&mut self) {
        let html = self.html();
        if html != self.last_html {
            self.last_html = html.clone();
            self.effects.push(Cmd::ContentChanged(html));
        }
    }

    /// Drain side effects accumulated by direct API calls.
    pub fn take_effects(&mut self) -> Option<Cmd> {
        match self.effects.len() {
            0 => None,
            1 => self.effects.pop(),
            _ => Some(Cmd::batch(std::mem::take(&mut self.effects))),
        }
    }

    /// Put a live selection on the page, as a user click or drag would.
    pub fn select_live(&mut self, range: Range) {
        self.engine.remove_all_ranges();
        self.engine.add_range(range);
    }
}
