//! Message types for the Elm-style architecture
//!
//! Browser input events and menu command requests flow into
//! [`crate::update::update`] as these types.

use serde::{Deserialize, Serialize};

/// Keys the editing core reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    /// A printable character
    Char(char),
    /// Anything else (arrows, modifiers, ...), identified by its key name
    Other(String),
}

/// A file carried by a paste or drop event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedFile {
    pub name: String,
    /// MIME type as reported by the browser (e.g. `image/png`)
    pub mime: String,
    #[serde(default)]
    pub size: u64,
}

impl DroppedFile {
    pub fn new(name: &str, mime: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            mime: mime.to_string(),
            size,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}

/// Clipboard payload of a paste event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardData {
    /// `text/plain` flavour
    #[serde(default)]
    pub text: Option<String>,
    /// `text/html` flavour
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub files: Vec<DroppedFile>,
}

impl ClipboardData {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn with_html(mut self, html: &str) -> Self {
        self.html = Some(html.to_string());
        self
    }

    pub fn with_files(mut self, files: Vec<DroppedFile>) -> Self {
        self.files = files;
        self
    }
}

/// Drag events observed on the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    Enter,
    Over,
    Leave,
    Drop,
}

/// Events raised on the editable region (and the document around it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMsg {
    KeyDown(Key),
    KeyUp(Key),
    MouseDown,
    MouseUp,
    MouseLeave,
    /// Paste into the editable region. `time_ms` is the event timestamp
    /// from a monotonic clock.
    Paste { data: ClipboardData, time_ms: u64 },
    /// Files dropped on the editable region
    Drop { files: Vec<DroppedFile> },
    /// Document-level drag traffic
    DocumentDrag(DragKind),
}

/// A command request from the menu layer: name plus optional value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl CommandRequest {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
        }
    }

    pub fn with_value(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value.to_string()),
        }
    }
}

/// Top-level message type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Msg {
    /// Input on the editable region
    Text(TextMsg),
    /// Menu command (`cmd.do(name, value)`)
    Command(CommandRequest),
}
