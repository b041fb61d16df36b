//! `richedit` - replay scripted editing sessions against the simulated engine

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use richedit::config::EditorConfig;
use richedit::replay::{self, Script};

use cli::{CliArgs, ConfigUpdate, ReplayOptions, StartupMode};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let mode = args.into_mode().map_err(anyhow::Error::msg)?;

    richedit::tracing::init();

    match mode {
        StartupMode::ShowLogPath => {
            let path = richedit::config_paths::log_file()
                .context("No config directory available")?;
            println!("{}", path.display());
        }
        StartupMode::Replay(options) => run_replay(options)?,
        StartupMode::Config(update) => run_config(update)?,
    }

    Ok(())
}

fn run_replay(options: ReplayOptions) -> Result<()> {
    let source = std::fs::read_to_string(&options.script)
        .with_context(|| format!("Failed to read script {}", options.script.display()))?;
    let mut script = Script::from_yaml(&source)
        .with_context(|| format!("Failed to parse script {}", options.script.display()))?;
    if options.engine.is_some() {
        script.engine = options.engine;
    }

    let report = replay::run(&script, EditorConfig::load());
    tracing::info!(changes = report.changes, "replay finished");

    if let Some(path) = &options.html_out {
        std::fs::write(path, &report.html)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.html);
        match report.selection {
            Some((start, end)) => println!("selection: {}..{} {:?}", start, end, report.selected_text),
            None => println!("selection: none"),
        }
        for file in &report.uploads {
            println!("upload: {} ({})", file.name, file.mime);
        }
    }
    Ok(())
}

fn run_config(update: ConfigUpdate) -> Result<()> {
    let mut config = EditorConfig::load();
    if !update.is_empty() {
        update.apply(&mut config);
        let path = config.save()?;
        eprintln!("Saved {}", path.display());
    }
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
