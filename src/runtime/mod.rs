//! Runtime module - host event sequencing
//!
//! A browser delivers one user gesture as several events and runs its own
//! default action in between. This module replays that sequencing against a
//! [`crate::engine::Engine`]:
//! - `input` - key presses, typing and pointer selections

pub mod input;

pub use input::{click, press_key, range_from_text_offsets, select_text, type_text};
