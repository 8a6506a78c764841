//! An individual note
//!
//! A note is, conceptually, a plain text file whose first physical line
//! is the title. The note tracks its own dirty state and modification
//! time, and carries two callback slots owned by the containing
//! collection: an immediate-change callback fired synchronously on
//! every edit, and a debounced change-timeout callback that fires only
//! after a quiet period with no further edits.
//!
//! The title is derived from the file name, not from the content: a
//! loaded note is titled after its file (minus the `.note` suffix), and
//! editing the text never re-titles it. A note that was never named
//! falls back to its id as the storage file stem.

use crate::error::Result;
use crate::search::Pattern;
use crate::timer::{TimerService, TimerToken};
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use ulid::Ulid;

/// File name suffix for stored notes
pub const NOTE_FILE_EXTENSION: &str = ".note";

/// Type-safe wrapper for note IDs using ULID
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteId(String);

impl NoteId {
    /// Generate a new ULID-based note ID
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Get the raw string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback invoked synchronously on every change to a note
pub type ImmediateChangeCallback = Box<dyn FnMut(&Note) + Send>;

/// Callback invoked after a quiet period following the last change
pub type ChangeTimeoutCallback = Arc<dyn Fn(&NoteId) + Send + Sync>;

struct Debounce {
    timers: Arc<dyn TimerService>,
    delay: Duration,
    callback: ChangeTimeoutCallback,
}

/// One plain-text note with dirty tracking and debounced change timeout
pub struct Note {
    id: NoteId,
    filename: Option<String>,
    content: Option<String>,
    mtime: Option<DateTime<Utc>>,
    dirty: bool,
    revision: u64,
    on_change: Option<ImmediateChangeCallback>,
    debounce: Option<Debounce>,
    pending_timer: Option<TimerToken>,
}

impl Note {
    /// Create a fresh, empty note with a newly generated id
    pub fn new() -> Self {
        let id = NoteId::new();
        tracing::debug!("Created note, id={}", id);
        Self {
            id,
            filename: None,
            content: None,
            mtime: None,
            dirty: false,
            revision: 0,
            on_change: None,
            debounce: None,
            pending_timer: None,
        }
    }

    /// The note's unique id
    pub fn id(&self) -> &NoteId {
        &self.id
    }

    /// Load the note from a file
    ///
    /// The file name (minus the `.note` suffix, when present) becomes
    /// the note's title, and the file's modification time becomes the
    /// note's mtime. Loading never marks the note dirty.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        tracing::debug!("Loading note {}", path.display());
        let data = fs::read_to_string(path)?;
        let basename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.filename = Some(strip_extension(&basename).to_string());
        self.content = Some(data);
        self.revision += 1;
        // The on-disk mtime is authoritative, not the load wall clock.
        let modified = fs::metadata(path)?.modified()?;
        self.mtime = Some(modified.into());
        self.dirty = false;
        Ok(())
    }

    /// Save the note into `dirname` as `<stem>.note`
    ///
    /// The file's modification time is set to the note's logical mtime
    /// rather than the wall-clock write time. On failure the note stays
    /// dirty.
    pub fn save(&mut self, dirname: &Path) -> Result<()> {
        let path = self.storage_path(dirname);
        tracing::debug!("Saving note to {}", path.display());
        let mut file = File::create(&path)?;
        file.write_all(self.text().as_bytes())?;
        if let Some(mtime) = self.mtime {
            file.set_modified(mtime.into())?;
        }
        self.dirty = false;
        Ok(())
    }

    /// Delete the note's backing file in `dirname`, if it exists
    ///
    /// Removing a note whose file is already gone is a no-op.
    pub fn remove(&self, dirname: &Path) -> Result<()> {
        let path = self.storage_path(dirname);
        tracing::debug!("Removing note {}", path.display());
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Full path of the note's backing file under `dirname`
    pub fn storage_path(&self, dirname: &Path) -> PathBuf {
        dirname.join(format!("{}{}", self.file_stem(), NOTE_FILE_EXTENSION))
    }

    /// The file name stem used for storage: the explicit name when one
    /// was set (or loaded), the id otherwise
    pub fn file_stem(&self) -> &str {
        self.filename.as_deref().unwrap_or_else(|| self.id.as_str())
    }

    /// Rename the note; a trailing `.note` suffix is stripped
    pub fn set_filename(&mut self, filename: &str) {
        self.filename = Some(strip_extension(filename).to_string());
    }

    /// The note's title, or an empty string while the note has no content
    pub fn title(&self) -> &str {
        if self.content.is_none() {
            ""
        } else {
            self.file_stem()
        }
    }

    /// The entire contents of the note, including the title line
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Replace the entire contents of the note
    ///
    /// This runs the full change pipeline: the mtime is refreshed, the
    /// note becomes dirty, the debounce timer restarts, and the
    /// immediate-change callback fires. Any cursor position a view
    /// tracks for this note is considered reset (see [`Note::revision`]).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = Some(text.into());
        self.revision += 1;
        self.touch();
    }

    /// Counter bumped whenever the content is wholesale replaced
    ///
    /// Views that track a cursor or selection must treat a revision
    /// change as a reset to the start of the note.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record a change: refresh the mtime, mark dirty, restart the
    /// debounce timer, then fire the immediate-change callback
    pub fn touch(&mut self) {
        self.mtime = Some(Utc::now());
        self.dirty = true;
        self.restart_change_timeout();
        if let Some(mut callback) = self.on_change.take() {
            callback(self);
            self.on_change = Some(callback);
        }
    }

    /// Has the content changed since the last successful save?
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag without saving
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// The note's logical last-modification time
    pub fn mtime(&self) -> Option<DateTime<Utc>> {
        self.mtime
    }

    /// Does this note match a search pattern?
    ///
    /// The note folds its own text to lower case; the pattern is
    /// expected to be lower-cased already (see [`Pattern::parse`]).
    pub fn matches(&self, pattern: &Pattern) -> bool {
        pattern.matches(&self.text().to_lowercase())
    }

    /// Configure the debounced change timeout
    ///
    /// This only records the configuration; the timer starts on the
    /// next change.
    pub fn set_change_timeout(
        &mut self,
        timers: Arc<dyn TimerService>,
        delay: Duration,
        callback: ChangeTimeoutCallback,
    ) {
        self.debounce = Some(Debounce {
            timers,
            delay,
            callback,
        });
    }

    /// Set the function called synchronously on every change
    pub fn set_immediate_change_callback(&mut self, callback: ImmediateChangeCallback) {
        self.on_change = Some(callback);
    }

    /// Cancel any pending change timeout
    pub fn stop_change_timeout(&mut self) {
        if let Some(token) = self.pending_timer.take() {
            if let Some(debounce) = &self.debounce {
                debounce.timers.cancel(token);
            }
        }
    }

    // Each change supersedes the previous timer, so a burst of edits
    // collapses to one callback after the last edit's quiet period.
    fn restart_change_timeout(&mut self) {
        self.stop_change_timeout();
        if let Some(debounce) = &self.debounce {
            let callback = Arc::clone(&debounce.callback);
            let id = self.id.clone();
            let token = debounce
                .timers
                .schedule_once(debounce.delay, Box::new(move || callback(&id)));
            self.pending_timer = Some(token);
        }
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Note")
            .field("id", &self.id)
            .field("title", &self.title())
            .field("mtime", &self.mtime)
            .field("dirty", &self.dirty)
            .finish()
    }
}

fn strip_extension(basename: &str) -> &str {
    basename.strip_suffix(NOTE_FILE_EXTENSION).unwrap_or(basename)
}
