//! An ordered collection of notes with per-view visibility marking
//!
//! The list owns every note in one note directory and keeps, per note,
//! one visibility bit per open view. Views allocate a column from a
//! fixed pool of [`MAX_VIEWS`] reusable columns, mark it with the notes
//! matching their current search pattern, and read the marked subset
//! back. Marking is an explicit snapshot: editing a note does not
//! refresh any column until the view re-filters.
//!
//! The list also maintains a denormalized title cell per note,
//! refreshed synchronously through each note's immediate-change
//! callback, and wires the collection-wide autosave debounce onto every
//! appended note.

use crate::error::{JotterError, Result};
use crate::note::{ChangeTimeoutCallback, Note, NoteId};
use crate::search::Pattern;
use crate::timer::TimerService;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Size of the visibility column pool; the most views open at once
pub const MAX_VIEWS: usize = 128;

/// Handle to an allocated visibility column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewColumn(usize);

impl ViewColumn {
    /// The column's index within the pool
    pub fn index(&self) -> usize {
        self.0
    }

    fn mask(&self) -> u128 {
        1u128 << self.0
    }
}

struct NoteRow {
    note: Note,
    // One visibility bit per pool column.
    visible: u128,
}

/// All notes in one note directory, plus view visibility state
pub struct NoteList {
    rows: Vec<NoteRow>,
    titles: Arc<Mutex<HashMap<NoteId, String>>>,
    free_columns: VecDeque<ViewColumn>,
    allocated_columns: Vec<ViewColumn>,
    timers: Arc<dyn TimerService>,
    change_timeout: Option<(Duration, ChangeTimeoutCallback)>,
    dirty: bool,
}

impl NoteList {
    /// Create an empty list with no autosave debounce configured
    pub fn new(timers: Arc<dyn TimerService>) -> Self {
        tracing::debug!("Creating new note list");
        Self {
            rows: Vec::new(),
            titles: Arc::new(Mutex::new(HashMap::new())),
            free_columns: (0..MAX_VIEWS).map(ViewColumn).collect(),
            allocated_columns: Vec::new(),
            timers,
            change_timeout: None,
            dirty: false,
        }
    }

    /// Create an empty list whose notes debounce `callback` after
    /// `delay` of edit quiescence
    pub fn with_change_timeout(
        timers: Arc<dyn TimerService>,
        delay: Duration,
        callback: ChangeTimeoutCallback,
    ) -> Self {
        let mut list = Self::new(timers);
        list.change_timeout = Some((delay, callback));
        list
    }

    /// Add a note to the end of the list
    ///
    /// The note's visibility bits start cleared, its immediate-change
    /// callback is wired to the list's title cell, and the list's
    /// autosave debounce (when configured) becomes the note's change
    /// timeout. The list becomes dirty.
    pub fn append_note(&mut self, mut note: Note) {
        tracing::debug!("Adding note {} to list", note.file_stem());
        self.titles
            .lock()
            .unwrap()
            .insert(note.id().clone(), note.title().to_string());
        let cell = Arc::clone(&self.titles);
        note.set_immediate_change_callback(Box::new(move |n| {
            cell.lock()
                .unwrap()
                .insert(n.id().clone(), n.title().to_string());
        }));
        if let Some((delay, callback)) = &self.change_timeout {
            note.set_change_timeout(Arc::clone(&self.timers), *delay, Arc::clone(callback));
        }
        self.rows.push(NoteRow { note, visible: 0 });
        self.dirty = true;
    }

    /// Iterate over all notes in collection order
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.rows.iter().map(|row| &row.note)
    }

    /// Number of notes in the list
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the list holds no notes
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a note by id
    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.rows.iter().map(|r| &r.note).find(|n| n.id() == id)
    }

    /// Look up a note by id for editing
    pub fn note_mut(&mut self, id: &NoteId) -> Option<&mut Note> {
        self.rows
            .iter_mut()
            .map(|r| &mut r.note)
            .find(|n| n.id() == id)
    }

    /// The denormalized title cell for a note
    ///
    /// Refreshed synchronously on every edit through the note's
    /// immediate-change callback, so it is never stale.
    pub fn title_of(&self, id: &NoteId) -> Option<String> {
        self.titles.lock().unwrap().get(id).cloned()
    }

    /// Remove a note from the list
    ///
    /// With a directory the backing file is deleted too; with `None`
    /// the removal is memory-only. Removing an unknown note is a
    /// logged no-op.
    pub fn remove_note(&mut self, dirname: Option<&Path>, id: &NoteId) -> Result<()> {
        let Some(index) = self.rows.iter().position(|r| r.note.id() == id) else {
            tracing::debug!("Note {} not in list, nothing to remove", id);
            return Ok(());
        };
        let row = self.rows.remove(index);
        tracing::debug!("Removing note {} from list", row.note.file_stem());
        if let Some(dirname) = dirname {
            row.note.remove(dirname)?;
        }
        self.titles.lock().unwrap().remove(id);
        self.dirty = true;
        Ok(())
    }

    /// Forget all notes, in memory only; nothing is deleted on disk
    pub fn clear(&mut self) {
        tracing::debug!("Forgetting all notes in list");
        self.rows.clear();
        self.titles.lock().unwrap().clear();
    }

    /// Load every regular file directly under `dirname` as a note
    ///
    /// Subdirectories are ignored; entries load in file name order.
    /// The list is clean afterwards. An empty directory yields an
    /// empty, clean list.
    pub fn load(&mut self, dirname: &Path) -> Result<()> {
        tracing::debug!("Loading notes from {}", dirname.display());
        let mut paths: Vec<_> = fs::read_dir(dirname)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .filter(|entry| entry.path().is_file())
            .map(|entry| entry.path())
            .collect();
        paths.sort();
        for path in paths {
            let mut note = Note::new();
            note.load(&path)?;
            self.append_note(note);
        }
        self.make_clean();
        tracing::debug!("Done loading notes from {}", dirname.display());
        Ok(())
    }

    /// Save every note into `dirname`, creating it if needed
    pub fn save(&mut self, dirname: &Path) -> Result<()> {
        tracing::debug!("Saving notes to {}", dirname.display());
        self.ensure_directory(dirname)?;
        for row in &mut self.rows {
            row.note.save(dirname)?;
        }
        self.make_clean();
        Ok(())
    }

    /// Save only dirty notes into `dirname`, creating it if needed
    ///
    /// The whole collection is marked clean afterwards, including the
    /// list-level dirty flag.
    pub fn save_dirty(&mut self, dirname: &Path) -> Result<()> {
        tracing::debug!("Saving dirty notes to {}", dirname.display());
        self.ensure_directory(dirname)?;
        for row in &mut self.rows {
            if row.note.is_dirty() {
                row.note.save(dirname)?;
            }
        }
        self.make_clean();
        Ok(())
    }

    /// All notes matching `pattern`, in collection order
    pub fn find_matching(&self, pattern: &Pattern) -> Vec<&Note> {
        self.rows
            .iter()
            .map(|r| &r.note)
            .filter(|n| n.matches(pattern))
            .collect()
    }

    /// Columns currently allocated to views, in allocation order
    pub fn visibility_columns(&self) -> &[ViewColumn] {
        &self.allocated_columns
    }

    /// Allocate a visibility column from the pool
    ///
    /// Fails with [`JotterError::TooManyViews`] when all [`MAX_VIEWS`]
    /// columns are in use.
    pub fn add_visibility_column(&mut self) -> Result<ViewColumn> {
        let Some(col) = self.free_columns.pop_front() else {
            return Err(JotterError::TooManyViews);
        };
        self.allocated_columns.push(col);
        Ok(col)
    }

    /// Return a visibility column to the pool
    ///
    /// # Panics
    ///
    /// Panics if the column is not currently allocated; releasing a
    /// column twice is a caller error, not a recoverable condition.
    pub fn remove_visibility_column(&mut self, col: ViewColumn) {
        let index = self
            .allocated_columns
            .iter()
            .position(|c| *c == col)
            .unwrap_or_else(|| panic!("visibility column {} is not allocated", col.index()));
        self.allocated_columns.remove(index);
        // Stale marks must not leak into the column's next owner.
        for row in &mut self.rows {
            row.visible &= !col.mask();
        }
        self.free_columns.push_back(col);
    }

    /// Recompute column `col` for every note against `pattern`
    ///
    /// This is a full, synchronous re-scan; note edits after it returns
    /// are not reflected until the next call.
    pub fn mark_visible_rows(&mut self, col: ViewColumn, pattern: &Pattern) {
        assert!(
            self.allocated_columns.contains(&col),
            "visibility column {} is not allocated",
            col.index()
        );
        for row in &mut self.rows {
            if row.note.matches(pattern) {
                row.visible |= col.mask();
            } else {
                row.visible &= !col.mask();
            }
        }
    }

    /// Notes currently marked visible in column `col`, in collection order
    pub fn visible_notes(&self, col: ViewColumn) -> Vec<&Note> {
        debug_assert!(self.allocated_columns.contains(&col));
        self.rows
            .iter()
            .filter(|row| row.visible & col.mask() != 0)
            .map(|row| &row.note)
            .collect()
    }

    /// Has the list membership or any note changed since the last clean
    /// mark?
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.rows.iter().any(|r| r.note.is_dirty())
    }

    /// Mark the list and every note in it as unmodified
    pub fn make_clean(&mut self) {
        self.dirty = false;
        for row in &mut self.rows {
            row.note.mark_clean();
        }
    }

    fn ensure_directory(&self, dirname: &Path) -> Result<()> {
        if dirname.exists() {
            if !dirname.is_dir() {
                return Err(JotterError::NotADirectory(dirname.to_path_buf()));
            }
            return Ok(());
        }
        tracing::debug!("Creating {}", dirname.display());
        fs::create_dir_all(dirname)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::MockTimerService;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn empty_list() -> NoteList {
        NoteList::new(Arc::new(MockTimerService::new()))
    }

    fn named_note(name: &str, text: &str) -> Note {
        let mut note = Note::new();
        note.set_filename(name);
        note.set_text(text);
        note
    }

    #[test]
    fn test_create_empty() {
        let list = empty_list();
        assert!(list.is_empty());
        assert!(list.visibility_columns().is_empty());
        assert!(!list.is_dirty());
    }

    #[test]
    fn test_append_marks_list_dirty() {
        let mut list = empty_list();
        let mut note = Note::new();
        note.set_filename("pink");
        list.append_note(note);
        assert_eq!(list.len(), 1);
        assert!(list.is_dirty());
    }

    #[test]
    fn test_title_cell_follows_note_changes() {
        let mut list = empty_list();
        let mut note = Note::new();
        note.set_filename("pink");
        let id = note.id().clone();
        // No content yet, so the title is still empty.
        list.append_note(note);
        assert_eq!(list.title_of(&id).unwrap(), "");

        list.note_mut(&id).unwrap().set_text("pink note\n");
        assert_eq!(list.title_of(&id).unwrap(), "pink");
    }

    #[test]
    fn test_remove_note_memory_only() {
        let mut list = empty_list();
        let note = named_note("pink", "pink note\n");
        let id = note.id().clone();
        list.append_note(note);

        list.remove_note(None, &id).unwrap();
        assert!(list.is_empty());
        assert!(list.title_of(&id).is_none());
    }

    #[test]
    fn test_remove_unknown_note_is_noop() {
        let mut list = empty_list();
        list.append_note(named_note("pink", "pink note\n"));
        let stranger = Note::new();
        list.remove_note(None, stranger.id()).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_clear_is_memory_only() {
        let dir = TempDir::new().unwrap();
        let mut list = empty_list();
        list.append_note(named_note("pink", "pink note\n"));
        list.save(dir.path()).unwrap();

        list.clear();
        assert!(list.is_empty());
        assert!(dir.path().join("pink.note").exists());
    }

    #[test]
    fn test_find_matching() {
        let mut list = empty_list();
        list.append_note(named_note("pink", "pink note\n"));
        list.append_note(named_note("pretty", "pretty note\n"));

        let hits = list.find_matching(&Pattern::parse("pink"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title(), "pink");

        assert_eq!(list.find_matching(&Pattern::parse("!black")).len(), 2);
        assert_eq!(list.find_matching(&Pattern::parse("pink pretty")).len(), 0);
        assert_eq!(list.find_matching(&Pattern::empty()).len(), 2);
    }

    #[test]
    fn test_column_pool_exhaustion_and_reuse() {
        let mut list = empty_list();
        let mut columns = Vec::new();
        for _ in 0..MAX_VIEWS {
            columns.push(list.add_visibility_column().unwrap());
        }
        assert!(matches!(
            list.add_visibility_column(),
            Err(JotterError::TooManyViews)
        ));

        list.remove_visibility_column(columns[5]);
        let reused = list.add_visibility_column().unwrap();
        assert_eq!(reused, columns[5]);
    }

    #[test]
    #[should_panic(expected = "not allocated")]
    fn test_double_release_panics() {
        let mut list = empty_list();
        let col = list.add_visibility_column().unwrap();
        list.remove_visibility_column(col);
        list.remove_visibility_column(col);
    }

    #[test]
    fn test_mark_visible_rows_snapshot() {
        let mut list = empty_list();
        let pink = named_note("pink", "pink note\n");
        let pink_id = pink.id().clone();
        list.append_note(pink);
        list.append_note(named_note("pretty", "pretty note\n"));

        let col = list.add_visibility_column().unwrap();
        list.mark_visible_rows(col, &Pattern::parse("pink"));
        let visible = list.visible_notes(col);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id(), &pink_id);

        // Edits do not refresh the column until the next re-scan.
        list.note_mut(&pink_id).unwrap().set_text("renamed away\n");
        assert_eq!(list.visible_notes(col).len(), 1);
        list.mark_visible_rows(col, &Pattern::parse("pink"));
        assert_eq!(list.visible_notes(col).len(), 0);
    }

    #[test]
    fn test_columns_are_independent() {
        let mut list = empty_list();
        list.append_note(named_note("pink", "pink note\n"));
        list.append_note(named_note("pretty", "pretty note\n"));

        let a = list.add_visibility_column().unwrap();
        let b = list.add_visibility_column().unwrap();
        list.mark_visible_rows(a, &Pattern::parse("pink"));
        list.mark_visible_rows(b, &Pattern::empty());

        assert_eq!(list.visible_notes(a).len(), 1);
        assert_eq!(list.visible_notes(b).len(), 2);

        list.mark_visible_rows(a, &Pattern::parse("xyzzy"));
        assert_eq!(list.visible_notes(a).len(), 0);
        assert_eq!(list.visible_notes(b).len(), 2);
    }

    #[test]
    fn test_released_column_is_cleared_for_next_owner() {
        let mut list = empty_list();
        list.append_note(named_note("pink", "pink note\n"));
        let col = list.add_visibility_column().unwrap();
        list.mark_visible_rows(col, &Pattern::empty());
        assert_eq!(list.visible_notes(col).len(), 1);

        list.remove_visibility_column(col);
        let reused = list.add_visibility_column().unwrap();
        assert_eq!(reused, col);
        assert_eq!(list.visible_notes(reused).len(), 0);
    }

    #[test]
    fn test_dirty_tracking() {
        let mut list = empty_list();
        let note = named_note("pink", "pink note\n");
        let id = note.id().clone();
        list.append_note(note);
        assert!(list.is_dirty());

        list.make_clean();
        assert!(!list.is_dirty());

        list.note_mut(&id).unwrap().set_text("edited\n");
        assert!(list.is_dirty());
        list.make_clean();
        assert!(!list.note(&id).unwrap().is_dirty());
    }

    #[test]
    fn test_save_to_file_path_is_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "in the way").unwrap();

        let mut list = empty_list();
        list.append_note(named_note("pink", "pink note\n"));
        assert!(matches!(
            list.save(&blocker),
            Err(JotterError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_load_ignores_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pink.note"), "pink note\n").unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let mut list = empty_list();
        list.load(dir.path()).unwrap();
        assert_eq!(list.len(), 1);
        assert!(!list.is_dirty());
    }

    #[test]
    fn test_load_empty_directory() {
        let dir = TempDir::new().unwrap();
        let mut list = empty_list();
        list.load(dir.path()).unwrap();
        assert!(list.is_empty());
        assert!(!list.is_dirty());
    }

    #[test]
    fn test_load_missing_directory_is_io_error() {
        let mut list = empty_list();
        let result = list.load(Path::new("/nonexistent-jotter-list-dir"));
        assert!(matches!(result, Err(JotterError::Io(_))));
    }

    #[test]
    fn test_appended_notes_inherit_change_timeout() {
        let timers = Arc::new(MockTimerService::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let count = Arc::clone(&fired);
        let mut list = NoteList::with_change_timeout(
            timers.clone(),
            Duration::from_millis(1000),
            Arc::new(move |_id| {
                count.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let note = named_note("pink", "pink note\n");
        let id = note.id().clone();
        list.append_note(note);

        list.note_mut(&id).unwrap().set_text("pink again\n");
        list.note_mut(&id).unwrap().set_text("pink once more\n");
        assert_eq!(timers.pending_count(), 1);
        timers.fire_all();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
