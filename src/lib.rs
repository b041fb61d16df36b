//! richedit - Elm-style rich-text editing core
//!
//! This crate provides the selection persistence layer and command engine
//! of a `contenteditable` editor, plus the key, paste and drag special cases
//! that keep the saved selection valid. The browser is modelled by the
//! [`dom`] and [`engine`] modules.

pub mod command;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod dom;
pub mod engine;
pub mod messages;
pub mod model;
pub mod replay;
pub mod runtime;
pub mod sanitize;
pub mod selection;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use command::{CommandValue, InlineFormat};
pub use commands::Cmd;
pub use config::EditorConfig;
pub use engine::{Engine, EngineFamily, SimulatedEngine};
pub use messages::Msg;
pub use model::Editor;
pub use update::update;
