use std::path::{Path, PathBuf};
use std::process;

mod cli;
mod create;
mod delete;
mod display;
mod exit_codes;
mod list;
mod search;

use clap::CommandFactory;
use cli::{Cli, Commands};
use colored::Colorize;
use exit_codes::{EXIT_ERROR, EXIT_SUCCESS};
use tracing::Level;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Fast path for help - avoid any initialization
    if cli.command.is_none() {
        Cli::command().print_help().expect("Failed to print help");
        process::exit(EXIT_SUCCESS);
    }

    let log_level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "Error:".red(), err);
            EXIT_ERROR
        }
    };
    process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command.expect("command presence checked above") {
        Commands::List {
            dir,
            format,
            remember,
        } => {
            let dir = resolve_notes_dir(dir, remember)?;
            list::run_list_command(&dir, &format)
        }
        Commands::Search {
            pattern,
            dir,
            format,
            remember,
        } => {
            let dir = resolve_notes_dir(dir, remember)?;
            search::run_search_command(&dir, &pattern, &format)
        }
        Commands::New {
            title,
            text,
            dir,
            remember,
        } => {
            let dir = resolve_notes_dir(dir, remember)?;
            create::run_new_command(&dir, &title, text.as_deref())
        }
        Commands::Delete {
            title,
            dir,
            remember,
        } => {
            let dir = resolve_notes_dir(dir, remember)?;
            delete::run_delete_command(&dir, &title)
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("jotter").join("settings.json"))
}

/// Pick the note directory: the explicit argument when given, else the
/// one remembered in settings via a previous `--remember`
fn resolve_notes_dir(dir: Option<PathBuf>, remember: bool) -> anyhow::Result<PathBuf> {
    if let Some(dir) = dir {
        if remember {
            remember_notes_dir(&dir);
        }
        return Ok(dir);
    }
    if let Some(path) = settings_path() {
        if let Ok(settings) = jotter::Settings::open(&path) {
            let saved = settings.get_string("notes-dir");
            if !saved.is_empty() {
                return Ok(PathBuf::from(saved));
            }
        }
    }
    anyhow::bail!("No note directory given and none remembered; pass --dir (add --remember to keep it)")
}

fn remember_notes_dir(dir: &Path) {
    let Some(path) = settings_path() else {
        return;
    };
    let result = jotter::Settings::open(&path)
        .and_then(|mut settings| settings.set_string("notes-dir", &dir.to_string_lossy()));
    if let Err(err) = result {
        tracing::warn!("Failed to remember note directory: {}", err);
    }
}
