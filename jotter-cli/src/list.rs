use anyhow::{Context, Result};
use jotter::{Note, NoteList, TokioTimerService};
use std::path::Path;
use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::display::print_notes;
use crate::exit_codes::EXIT_SUCCESS;

pub fn run_list_command(dir: &Path, format: &OutputFormat) -> Result<i32> {
    let mut list = NoteList::new(Arc::new(TokioTimerService::new()));
    list.load(dir)
        .with_context(|| format!("Failed to load note directory {}", dir.display()))?;

    let mut notes: Vec<&Note> = list.notes().collect();
    notes.sort_by(|a, b| a.title().cmp(b.title()));

    print_notes(&notes, format)?;
    Ok(EXIT_SUCCESS)
}
