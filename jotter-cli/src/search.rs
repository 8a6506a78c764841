use anyhow::{Context, Result};
use colored::Colorize;
use jotter::{Note, NoteList, Pattern, TokioTimerService};
use std::path::Path;
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::display::print_notes;
use crate::exit_codes::{EXIT_SUCCESS, EXIT_WARNING};

pub fn run_search_command(dir: &Path, words: &[String], format: &OutputFormat) -> Result<i32> {
    let mut list = NoteList::new(Arc::new(TokioTimerService::new()));
    list.load(dir)
        .with_context(|| format!("Failed to load note directory {}", dir.display()))?;

    let pattern = Pattern::parse(&words.join(" "));
    let mut hits: Vec<&Note> = list.find_matching(&pattern);
    hits.sort_by(|a, b| a.title().cmp(b.title()));

    print_notes(&hits, format)?;
    if matches!(format, OutputFormat::Table) {
        let status = format!("{} matching notes", hits.len());
        eprintln!("{}", status.green());
    }

    if hits.is_empty() {
        Ok(EXIT_WARNING)
    } else {
        Ok(EXIT_SUCCESS)
    }
}
