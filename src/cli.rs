//! Command-line argument parsing for the replay tool
//!
//! Supports:
//! - Replaying an editing script against the simulated engine
//! - Overriding the engine family
//! - Writing the final HTML to a file, JSON reports
//! - Showing and changing the saved config
//! - Printing the log file location

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use richedit::config::EditorConfig;
use richedit::engine::EngineFamily;

/// Replay scripted rich-text editing sessions
#[derive(Parser, Debug)]
#[command(name = "richedit", version, about = "Replay scripted rich-text editing sessions")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Run a YAML event script and print the resulting document
    Replay {
        /// Script to run
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Engine family to simulate (webkit, gecko, trident)
        #[arg(long, value_name = "FAMILY")]
        engine: Option<String>,

        /// Also write the final HTML to this file
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the saved config, updating any values given
    Config {
        /// Drop style attributes from pasted HTML
        #[arg(long, value_name = "BOOL")]
        paste_filter_style: Option<bool>,

        /// Drop images from pasted HTML
        #[arg(long, value_name = "BOOL")]
        paste_ignore_img: Option<bool>,

        /// Default engine family for replays
        #[arg(long, value_name = "FAMILY")]
        engine: Option<String>,
    },
    /// Print the path of the current log file
    Logs,
}

/// What the binary should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupMode {
    Replay(ReplayOptions),
    Config(ConfigUpdate),
    ShowLogPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOptions {
    pub script: PathBuf,
    pub engine: Option<EngineFamily>,
    pub html_out: Option<PathBuf>,
    pub json: bool,
}

/// Config values to change; `None` keeps the saved value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub paste_filter_style: Option<bool>,
    pub paste_ignore_img: Option<bool>,
    pub engine: Option<EngineFamily>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, config: &mut EditorConfig) {
        if let Some(enabled) = self.paste_filter_style {
            config.paste_filter_style = enabled;
        }
        if let Some(enabled) = self.paste_ignore_img {
            config.paste_ignore_img = enabled;
        }
        if let Some(engine) = self.engine {
            config.engine = engine;
        }
    }
}

fn parse_engine(name: &str) -> Result<EngineFamily, String> {
    match name.to_ascii_lowercase().as_str() {
        "webkit" | "blink" => Ok(EngineFamily::Webkit),
        "gecko" => Ok(EngineFamily::Gecko),
        "trident" => Ok(EngineFamily::Trident),
        other => Err(format!("Unknown engine family: {}", other)),
    }
}

impl CliArgs {
    /// Convert parsed CLI args into a startup mode
    pub fn into_mode(self) -> Result<StartupMode, String> {
        match self.command {
            CliCommand::Replay {
                script,
                engine,
                html,
                json,
            } => {
                let engine = engine.as_deref().map(parse_engine).transpose()?;
                Ok(StartupMode::Replay(ReplayOptions {
                    script,
                    engine,
                    html_out: html,
                    json,
                }))
            }
            CliCommand::Config {
                paste_filter_style,
                paste_ignore_img,
                engine,
            } => Ok(StartupMode::Config(ConfigUpdate {
                paste_filter_style,
                paste_ignore_img,
                engine: engine.as_deref().map(parse_engine).transpose()?,
            })),
            CliCommand::Logs => Ok(StartupMode::ShowLogPath),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_with_defaults() {
        let args = CliArgs::parse_from(["richedit", "replay", "session.yaml"]);
        let mode = args.into_mode().unwrap();
        assert_eq!(
            mode,
            StartupMode::Replay(ReplayOptions {
                script: PathBuf::from("session.yaml"),
                engine: None,
                html_out: None,
                json: false,
            })
        );
    }

    #[test]
    fn test_replay_engine_and_outputs() {
        let args = CliArgs::parse_from([
            "richedit", "replay", "s.yaml", "--engine", "Gecko", "--html", "out.html", "--json",
        ]);
        let StartupMode::Replay(options) = args.into_mode().unwrap() else {
            panic!("expected replay mode");
        };
        assert_eq!(options.engine, Some(EngineFamily::Gecko));
        assert_eq!(options.html_out, Some(PathBuf::from("out.html")));
        assert!(options.json);
    }

    #[test]
    fn test_unknown_engine_rejected() {
        let args = CliArgs {
            command: CliCommand::Replay {
                script: PathBuf::from("s.yaml"),
                engine: Some("presto".to_string()),
                html: None,
                json: false,
            },
        };
        assert!(args.into_mode().is_err());
    }

    #[test]
    fn test_config_update_applies_only_given_values() {
        let args = CliArgs::parse_from([
            "richedit",
            "config",
            "--paste-ignore-img",
            "true",
            "--engine",
            "trident",
        ]);
        let StartupMode::Config(update) = args.into_mode().unwrap() else {
            panic!("expected config mode");
        };
        assert!(!update.is_empty());

        let mut config = EditorConfig::default();
        update.apply(&mut config);
        assert!(config.paste_filter_style);
        assert!(config.paste_ignore_img);
        assert_eq!(config.engine, EngineFamily::Trident);
    }

    #[test]
    fn test_bare_config_changes_nothing() {
        let args = CliArgs::parse_from(["richedit", "config"]);
        assert_eq!(
            args.into_mode().unwrap(),
            StartupMode::Config(ConfigUpdate::default())
        );
    }

    #[test]
    fn test_logs_subcommand() {
        let args = CliArgs::parse_from(["richedit", "logs"]);
        assert_eq!(args.into_mode().unwrap(), StartupMode::ShowLogPath);
    }
}
