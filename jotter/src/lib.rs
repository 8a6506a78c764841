//! # Jotter
//!
//! A plain-text note store in the spirit of Notational Velocity: one
//! file per note, word-based search with negation, and debounced
//! autosave.
//!
//! ## Features
//!
//! - **Notes as files**: each note is a plain text file whose first
//!   line is the title; the file name names the note
//! - **Word search**: every search word must occur as a substring, and
//!   `!word` terms must not
//! - **Dirty tracking and autosave**: edits mark notes dirty and arm a
//!   per-note debounce timer; one quiet second later the whole list is
//!   saved
//! - **Independent views**: any number of windows can filter the same
//!   list through a bounded pool of reusable visibility columns
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jotter::{NoteStore, TokioTimerService};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = NoteStore::new(Arc::new(TokioTimerService::new()));
//! store.open_notelist(Path::new("./notes"))?;
//!
//! let view = store.new_view()?;
//! view.refilter("shopping !done");
//! for (_id, title) in view.matching_notes() {
//!     println!("{}", title);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// Individual notes with dirty tracking and change callbacks
pub mod note;

/// The note collection and its view visibility columns
pub mod notelist;

/// Word-based search patterns
pub mod search;

/// Persisted key/value settings
pub mod settings;

/// The note store orchestrator and its views
pub mod store;

/// Single-shot cancelable timer scheduling
pub mod timer;

/// Error types used throughout the library
pub mod error;

// Re-export core types
pub use error::{JotterError, Result};
pub use note::{Note, NoteId, NOTE_FILE_EXTENSION};
pub use notelist::{NoteList, ViewColumn, MAX_VIEWS};
pub use search::{Pattern, Term};
pub use settings::Settings;
pub use store::{NoteStore, View, AUTOSAVE_DELAY};
pub use timer::{MockTimerService, TimerService, TimerToken, TokioTimerService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
