use anyhow::{Context, Result};
use colored::Colorize;
use jotter::{NoteStore, TokioTimerService};
use std::path::Path;
use std::sync::Arc;

use crate::exit_codes::{EXIT_SUCCESS, EXIT_WARNING};

pub fn run_delete_command(dir: &Path, title: &str) -> Result<i32> {
    let store = NoteStore::new(Arc::new(TokioTimerService::new()));
    store
        .open_notelist(dir)
        .with_context(|| format!("Failed to load note directory {}", dir.display()))?;

    let id = store.with_notelist(|list| {
        list.notes()
            .find(|n| n.title() == title)
            .map(|n| n.id().clone())
    });
    let Some(id) = id else {
        eprintln!("No note titled '{}' in {}", title, dir.display());
        return Ok(EXIT_WARNING);
    };

    store
        .remove_note(&id)
        .with_context(|| format!("Failed to delete note '{}'", title))?;
    println!("{} {}.note", "Deleted".green(), title);
    Ok(EXIT_SUCCESS)
}
