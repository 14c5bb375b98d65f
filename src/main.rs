//! Command-line tool for the cruise camera controller: option schema, presets and headless replays.

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use cruise::{
    error::CruiseError,
    model,
    options::Options,
    replay::{self, ReplayScript},
    scene::SceneDescription,
};

/// Cruise camera tooling: option schema, presets and headless replays.
#[derive(Parser)]
#[command(name = "cruise", version)]
struct Cli {
    /// Options TOML applied before any preset.
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the options JSON schema.
    Schema,
    /// List built-in world presets.
    Presets,
    /// Print a preset as TOML.
    Preset {
        /// Preset name (see `presets`).
        name: String,
    },
    /// Print the model catalog as JSON.
    Models,
    /// Check a settings-editor JSON file.
    Settings {
        /// Path to the JSON document.
        path: PathBuf,
    },
    /// Run a replay script and print the resulting poses as JSON.
    Replay {
        /// Path to the replay script.
        script: PathBuf,
        /// Only print the final pose.
        #[arg(long)]
        summary: bool,
    },
}

fn json<T: serde::Serialize>(value: &T) -> Result<String, CruiseError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CruiseError::OptionsParse(e.to_string()))
}

fn run(cli: Cli) -> Result<String, CruiseError> {
    let options = match &cli.options {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };

    match cli.command {
        Command::Schema => json(&Options::json_schema()),
        Command::Presets => Ok(Options::preset_names().join("\n")),
        Command::Preset { name } => {
            let preset = Options::preset(&name)?;
            toml::to_string_pretty(&preset)
                .map_err(|e| CruiseError::OptionsParse(e.to_string()))
        }
        Command::Models => json(&model::catalog()),
        Command::Settings { path } => {
            let text = std::fs::read_to_string(&path)?;
            let scene = cruise::options::SceneOptions::from_settings_json(&text)?;
            let resolved = SceneDescription::from_options(&scene)?;
            Ok(format!(
                "ok: {} light(s), shadows {}",
                resolved.lights.len(),
                if resolved.needs_shadow_map() { "on" } else { "off" }
            ))
        }
        Command::Replay { script, summary } => {
            let text = std::fs::read_to_string(&script)?;
            let script = ReplayScript::from_json(&text)?;
            let report = replay::run(&script, &options)?;
            log::info!(
                "{} updates, {} moved",
                report.frames.len(),
                report.moved_frames()
            );
            if summary {
                json(&report.end)
            } else {
                json(&report)
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    match run(Cli::parse()) {
        Ok(output) => {
            let mut stdout = io::stdout().lock();
            if writeln!(stdout, "{output}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
