//! Scripted editing sessions for diagnosing selection and command issues.
//!
//! A script is YAML:
//!
//! ```yaml
//! engine: gecko
//! html: "<p>hello</p>"
//! steps:
//!   - select: { start: 5, end: 5 }
//!   - format: bold
//!   - type: " world"
//!   - key: enter
//!   - paste: { text: "a\nb" }
//! ```

use serde::{Deserialize, Serialize};

use crate::command::InlineFormat;
use crate::commands::Cmd;
use crate::config::EditorConfig;
use crate::dom::{Boundary, Range};
use crate::engine::{Engine, EngineFamily, SimulatedEngine};
use crate::messages::{ClipboardData, CommandRequest, DroppedFile, Key, Msg, TextMsg};
use crate::model::Editor;
use crate::runtime;
use crate::update::update;

/// Simulated time between two steps, past the paste throttle window.
const STEP_INTERVAL_MS: u64 = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Overrides the configured engine family
    #[serde(default)]
    pub engine: Option<EngineFamily>,
    /// Initial region content
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Mouse-select characters `start..end` of the region text
    Select { start: usize, end: usize },
    Key(Key),
    Type(String),
    Command(CommandRequest),
    /// Toolbar-style character format
    Format(InlineFormat),
    Paste(ClipboardData),
    Drop(Vec<DroppedFile>),
    InitSelection(bool),
}

impl Script {
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::with::singleton_map_recursive::deserialize(serde_yaml::Deserializer::from_str(
            source,
        ))
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        let mut out = Vec::new();
        {
            let mut serializer = serde_yaml::Serializer::new(&mut out);
            serde_yaml::with::singleton_map_recursive::serialize(self, &mut serializer)?;
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

/// Outcome of a replayed script.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayReport {
    pub html: String,
    pub text: String,
    /// Saved selection as character offsets into the region text
    pub selection: Option<(usize, usize)>,
    pub selected_text: String,
    /// Files handed to the upload pipeline
    pub uploads: Vec<DroppedFile>,
    /// Number of content change notifications
    pub changes: usize,
    /// Number of events whose default action was cancelled
    pub prevented: usize,
}

impl ReplayReport {
    fn record(&mut self, cmd: Option<Cmd>) {
        let Some(cmd) = cmd else {
            return;
        };
        if cmd.prevents_default() {
            self.prevented += 1;
        }
        self.uploads.extend(cmd.uploads().into_iter().cloned());
        self.changes += cmd
            .flatten()
            .into_iter()
            .filter(|c| matches!(c, Cmd::ContentChanged(_)))
            .count();
    }
}

/// Run `script` on a fresh simulated editor.
pub fn run(script: &Script, mut config: EditorConfig) -> ReplayReport {
    if let Some(engine) = script.engine {
        config.engine = engine;
    }
    let mut editor = Editor::new(SimulatedEngine::new(config.engine), config);
    if !script.html.is_empty() {
        editor.set_html(&script.html);
    }

    let mut report = ReplayReport::default();
    let mut clock = 0;
    for (index, step) in script.steps.iter().enumerate() {
        clock += STEP_INTERVAL_MS;
        tracing::debug!(index, ?step, "replay step");
        let cmd = apply(&mut editor, step, clock);
        report.record(cmd);
        report.record(editor.take_effects());
    }

    report.html = editor.html();
    report.text = editor.text();
    report.selection = editor
        .get_range()
        .map(|range| (text_offset(&editor, range.start), text_offset(&editor, range.end)));
    report.selected_text = editor.get_selection_text();
    report
}

fn apply<E: Engine>(editor: &mut Editor<E>, step: &Step, clock: u64) -> Option<Cmd> {
    match step {
        Step::Select { start, end } => {
            let cmd = runtime::select_text(editor, *start, *end);
            if cmd.is_none() {
                tracing::warn!(start, end, "selection offsets outside region text");
            }
            cmd
        }
        Step::Key(key) => runtime::press_key(editor, key.clone()),
        Step::Type(text) => runtime::type_text(editor, text),
        Step::Command(request) => update(editor, Msg::Command(request.clone())),
        Step::Format(format) => {
            editor.format_inline(*format);
            None
        }
        Step::Paste(data) => update(
            editor,
            Msg::Text(TextMsg::Paste {
                data: data.clone(),
                time_ms: clock,
            }),
        ),
        Step::Drop(files) => update(editor, Msg::Text(TextMsg::Drop { files: files.clone() })),
        Step::InitSelection(new_line) => {
            editor.init_selection(*new_line);
            editor.notify_change();
            None
        }
    }
}

/// Characters of region text before `at`.
fn text_offset<E: Engine>(editor: &Editor<E>, at: Boundary) -> usize {
    let head = Range::new(Boundary::new(editor.root(), 0), at);
    editor.dom.range_to_string(&head).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"
engine: webkit
html: "<p>hello</p>"
steps:
  - select: { start: 5, end: 5 }
  - type: "!"
  - select: { start: 0, end: 5 }
  - command: { name: bold }
  - select: { start: 6, end: 6 }
  - key: enter
  - paste:
      text: "pasted"
      files:
        - { name: "a.png", mime: "image/png", size: 3 }
"#;

    #[test]
    fn test_script_parses_singleton_maps() {
        let script = Script::from_yaml(SCRIPT).unwrap();
        assert_eq!(script.engine, Some(EngineFamily::Webkit));
        assert_eq!(script.steps.len(), 7);
        assert_eq!(script.steps[5], Step::Key(Key::Enter));
        assert_eq!(
            script.steps[3],
            Step::Command(CommandRequest::new("bold"))
        );
    }

    #[test]
    fn test_char_key_round_trips_through_yaml() {
        let script = Script {
            engine: None,
            html: String::new(),
            steps: vec![Step::Key(Key::Char('x'))],
        };
        let yaml = script.to_yaml().unwrap();
        assert_eq!(Script::from_yaml(&yaml).unwrap(), script);
    }

    #[test]
    fn test_run_reports_final_state() {
        let script = Script::from_yaml(SCRIPT).unwrap();
        let report = run(&script, EditorConfig::default());
        assert_eq!(report.text, "hello!");
        assert!(report.html.starts_with("<p><b>hello</b>!</p>"));
        assert_eq!(report.uploads.len(), 1);
        assert!(report.changes >= 2);
        assert!(report.prevented >= 1);
    }
}
