use anyhow::{Context, Result};
use colored::Colorize;
use jotter::{NoteStore, TokioTimerService};
use std::path::Path;
use std::sync::Arc;

use crate::exit_codes::{EXIT_SUCCESS, EXIT_WARNING};

pub fn run_new_command(dir: &Path, title: &str, text: Option<&str>) -> Result<i32> {
    let store = NoteStore::new(Arc::new(TokioTimerService::new()));
    if dir.exists() {
        store
            .open_notelist(dir)
            .with_context(|| format!("Failed to load note directory {}", dir.display()))?;
    }

    let already_there = store.with_notelist(|list| list.notes().any(|n| n.title() == title));
    if already_there {
        eprintln!("Note '{}' already exists in {}", title, dir.display());
        return Ok(EXIT_WARNING);
    }

    let id = store.create_note(title);
    let content = match text {
        Some(body) => format!("{}\n{}\n", title, body),
        None => format!("{}\n", title),
    };
    store.set_note_text(&id, &content);
    store
        .save_notelist_as(dir)
        .with_context(|| format!("Failed to save note directory {}", dir.display()))?;

    println!("{} {}.note", "Created".green(), title);
    Ok(EXIT_SUCCESS)
}
