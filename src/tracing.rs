//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging
//! selection persistence and command flow.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=selection=debug,message=debug` - scoped filtering
//! - `RUST_LOG=richedit::selection=trace` - dropped selections
//!
//! # Log Files
//!
//! Logs are written to `~/.config/richedit/logs/richedit.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::dom::Range;
use crate::engine::Engine;
use crate::model::{CodeExitState, Editor};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG env var and defaults to `warn`.
/// File logging writes to `~/.config/richedit/logs/richedit.log` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console goes to stderr so replay output on stdout stays clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of selection state for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub saved: Option<Range>,
    pub live: Option<Range>,
    pub code_exit: CodeExitState,
}

impl SelectionSnapshot {
    pub fn from_editor<E: Engine>(editor: &Editor<E>) -> Self {
        Self {
            saved: editor.get_range(),
            live: editor.engine.range_at(0),
            code_exit: editor.code_exit,
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &SelectionSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.saved != other.saved {
            changes.push(format!(
                "saved: {} → {}",
                describe(self.saved),
                describe(other.saved)
            ));
        }
        if self.live != other.live {
            changes.push(format!(
                "live: {} → {}",
                describe(self.live),
                describe(other.live)
            ));
        }
        if self.code_exit != other.code_exit {
            changes.push(format!("code exit: {:?} → {:?}", self.code_exit, other.code_exit));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

fn describe(range: Option<Range>) -> String {
    match range {
        None => "none".to_string(),
        Some(r) if r.is_collapsed() => format!("{:?}@{}", r.start.node, r.start.offset),
        Some(r) => format!(
            "{:?}@{}..{:?}@{}",
            r.start.node, r.start.offset, r.end.node, r.end.offset
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use crate::engine::SimulatedEngine;

    #[test]
    fn test_snapshot_diff_reports_code_exit_and_selection() {
        let mut editor = Editor::new(SimulatedEngine::webkit(), EditorConfig::default());
        let before = SelectionSnapshot::from_editor(&editor);
        assert_eq!(before.diff(&before.clone()), None);

        editor.code_exit = CodeExitState::AwaitingExit;
        editor.selection.clear();
        let diff = before.diff(&SelectionSnapshot::from_editor(&editor)).unwrap();
        assert!(diff.contains("code exit: Idle → AwaitingExit"));
        assert!(diff.contains("→ none"));
    }
}
