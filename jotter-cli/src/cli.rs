use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "jotter")]
#[command(version)]
#[command(about = "A plain-text note store with word-based search")]
#[command(long_about = "
jotter keeps notes as plain text files, one file per note, with the
first line as the title. Searches match whole words as substrings;
prefix a word with '!' to exclude notes containing it.

Example usage:
  jotter list --dir ~/notes                 # All notes, title-sorted
  jotter search --dir ~/notes pink !done    # Match pink, exclude done
  jotter new --dir ~/notes shopping         # Create shopping.note
  jotter list                               # Use the remembered directory
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all notes in a note directory
    #[command(long_about = "
Lists every note in the directory, sorted by title, with each note's
modification time and word count.

Example:
  jotter list --dir ~/notes
  jotter list --dir ~/notes --format json
")]
    List {
        /// Note directory (defaults to the remembered one)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Remember this directory for future invocations
        #[arg(long)]
        remember: bool,
    },
    /// Search notes by words, with ! negation
    #[command(long_about = "
Shows the notes whose text contains every given word, ignoring case.
Words starting with '!' are negated: notes containing them are dropped.
Exits 1 when nothing matches.

Example:
  jotter search --dir ~/notes pink
  jotter search --dir ~/notes pink !black
")]
    Search {
        /// Search words; '!word' excludes
        #[arg(required = true)]
        pattern: Vec<String>,

        /// Note directory (defaults to the remembered one)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Remember this directory for future invocations
        #[arg(long)]
        remember: bool,
    },
    /// Create a new note
    #[command(long_about = "
Creates <title>.note in the note directory. The note starts with the
title line; --text appends a body. The directory is created when it
does not exist yet.

Example:
  jotter new --dir ~/notes shopping --text 'milk, eggs'
")]
    New {
        /// Title of the new note, used as the file name
        title: String,

        /// Body text placed after the title line
        #[arg(long)]
        text: Option<String>,

        /// Note directory (defaults to the remembered one)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Remember this directory for future invocations
        #[arg(long)]
        remember: bool,
    },
    /// Delete a note and its backing file
    #[command(long_about = "
Deletes the note with the given title from the directory. Exits 1 when
no note with that title exists.

Example:
  jotter delete --dir ~/notes shopping
")]
    Delete {
        /// Title of the note to delete
        title: String,

        /// Note directory (defaults to the remembered one)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Remember this directory for future invocations
        #[arg(long)]
        remember: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
