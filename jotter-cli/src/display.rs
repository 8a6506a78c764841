use anyhow::Result;
use is_terminal::IsTerminal;
use jotter::Note;
use std::io;
use tabled::{
    settings::{object::Rows, Color, Modify, Style},
    Table, Tabled,
};

use crate::cli::OutputFormat;

#[derive(Tabled)]
struct NoteRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Modified")]
    modified: String,
    #[tabled(rename = "Words")]
    words: usize,
}

#[derive(serde::Serialize)]
struct NoteInfo {
    title: String,
    modified: Option<String>,
    words: usize,
}

fn modified_stamp(note: &Note) -> Option<String> {
    note.mtime()
        .map(|mtime| mtime.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Print notes in the requested format; callers pass them title-sorted
pub fn print_notes(notes: &[&Note], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let infos: Vec<NoteInfo> = notes
                .iter()
                .map(|note| NoteInfo {
                    title: note.title().to_string(),
                    modified: modified_stamp(note),
                    words: note.text().split_whitespace().count(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&infos)?);
        }
        OutputFormat::Table => {
            if notes.is_empty() {
                println!("No notes");
                return Ok(());
            }
            let rows: Vec<NoteRow> = notes
                .iter()
                .map(|note| NoteRow {
                    title: note.title().to_string(),
                    modified: modified_stamp(note).unwrap_or_default(),
                    words: note.text().split_whitespace().count(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::sharp());
            if io::stdout().is_terminal() {
                table.with(Modify::new(Rows::first()).with(Color::BOLD));
            }
            println!("{}", table);
        }
    }
    Ok(())
}
