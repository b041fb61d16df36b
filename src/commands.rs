//! Command types for the Elm-style architecture
//!
//! Commands represent side effects the host performs after an update.

use crate::messages::DroppedFile;

/// Side effects requested by the editing core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// Cancel the browser's default action for the event being handled
    PreventDefault,
    /// Menus should re-evaluate their active/inactive highlighting
    RefreshMenus,
    /// Editor content changed; carries the serialized html
    ContentChanged(String),
    /// Hand files to the upload pipeline (fire-and-forget)
    UploadFiles(Vec<DroppedFile>),
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        Cmd::Batch(cmds)
    }

    /// Merge two optional commands into one.
    pub fn merge(first: Option<Cmd>, second: Option<Cmd>) -> Option<Cmd> {
        match (first, second) {
            (None, other) | (other, None) => other,
            (Some(a), Some(b)) => {
                let mut cmds = a.into_vec();
                cmds.extend(b.into_vec());
                Some(Cmd::Batch(cmds))
            }
        }
    }

    fn into_vec(self) -> Vec<Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds,
            other => vec![other],
        }
    }

    /// Flatten nested batches into a list of leaf commands.
    pub fn flatten(&self) -> Vec<&Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds.iter().flat_map(Cmd::flatten).collect(),
            other => vec![other],
        }
    }

    /// Check if the default browser action must be suppressed
    pub fn prevents_default(&self) -> bool {
        self.flatten()
            .into_iter()
            .any(|cmd| matches!(cmd, Cmd::PreventDefault))
    }

    /// Files to forward to the upload pipeline, if any
    pub fn uploads(&self) -> Vec<&DroppedFile> {
        self.flatten()
            .into_iter()
            .filter_map(|cmd| match cmd {
                Cmd::UploadFiles(files) => Some(files.iter()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}
