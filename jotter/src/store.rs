//! The note store: one note list, one working directory, many views
//!
//! [`NoteStore`] owns the application's single [`NoteList`] and the
//! name of the directory it was opened from or last saved to. It wires
//! the autosave debounce onto every note, so a burst of edits is
//! followed, [`AUTOSAVE_DELAY`] later, by one full save of the list.
//!
//! Each open window corresponds to one [`View`], holding an exclusive
//! visibility column in the shared list. The store is a cloneable
//! handle; the debounced autosave callback reaches it from the timer
//! task through a weak reference, so a timer firing after the store is
//! gone does nothing.

use crate::error::{JotterError, Result};
use crate::note::{ChangeTimeoutCallback, Note, NoteId};
use crate::notelist::{NoteList, ViewColumn};
use crate::search::Pattern;
use crate::timer::TimerService;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// Quiet period after the last edit before notes autosave
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(1000);

struct StoreInner {
    notelist: NoteList,
    dirname: Option<PathBuf>,
    open_views: usize,
}

impl StoreInner {
    fn autosave(&mut self) -> Result<()> {
        let Some(dirname) = self.dirname.clone() else {
            return Ok(());
        };
        self.notelist.save(&dirname)
    }
}

/// Cloneable handle to the application's note collection
#[derive(Clone)]
pub struct NoteStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl NoteStore {
    /// Create a store with an empty note list
    ///
    /// Every note appended to the list debounces an autosave through
    /// `timers`; a failed autosave is logged and the notes stay dirty
    /// for the next attempt.
    pub fn new(timers: Arc<dyn TimerService>) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<Mutex<StoreInner>>| {
            let weak = weak.clone();
            let autosave: ChangeTimeoutCallback = Arc::new(move |id: &NoteId| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let mut guard = inner.lock().unwrap();
                if let Err(err) = guard.autosave() {
                    tracing::error!("Autosave after editing note {} failed: {}", id, err);
                }
            });
            Mutex::new(StoreInner {
                notelist: NoteList::with_change_timeout(timers, AUTOSAVE_DELAY, autosave),
                dirname: None,
                open_views: 0,
            })
        });
        Self { inner }
    }

    /// Forget all notes and start over with an empty list, in memory only
    pub fn new_notelist(&self) {
        self.inner.lock().unwrap().notelist.clear();
    }

    /// Load a note directory and adopt it as the working directory
    pub fn open_notelist(&self, dirname: &Path) -> Result<()> {
        tracing::debug!("Opening note list {}", dirname.display());
        let mut guard = self.inner.lock().unwrap();
        guard.notelist.load(dirname)?;
        guard.dirname = Some(dirname.to_path_buf());
        Ok(())
    }

    /// Save all notes if a working directory has been established
    ///
    /// Without one this is a no-op; autosave never prompts for a name.
    pub fn autosave(&self) -> Result<()> {
        self.inner.lock().unwrap().autosave()
    }

    /// Save all notes to the working directory
    ///
    /// Fails with [`JotterError::DirectoryNotSet`] when no directory
    /// has ever been opened or adopted via save-as.
    pub fn save_notelist(&self) -> Result<()> {
        tracing::debug!("Saving note list");
        let mut guard = self.inner.lock().unwrap();
        let dirname = guard.dirname.clone().ok_or(JotterError::DirectoryNotSet)?;
        guard.notelist.save(&dirname)
    }

    /// Save all notes under a new directory and adopt it going forward
    pub fn save_notelist_as(&self, dirname: &Path) -> Result<()> {
        tracing::debug!("Saving note list as {}", dirname.display());
        let mut guard = self.inner.lock().unwrap();
        guard.notelist.save(dirname)?;
        guard.dirname = Some(dirname.to_path_buf());
        Ok(())
    }

    /// The current working directory, if one has been established
    pub fn dirname(&self) -> Option<PathBuf> {
        self.inner.lock().unwrap().dirname.clone()
    }

    /// Has the list or any note changed since the last save?
    pub fn is_dirty(&self) -> bool {
        self.inner.lock().unwrap().notelist.is_dirty()
    }

    /// Create an empty note named `filename` and append it to the list
    pub fn create_note(&self, filename: &str) -> NoteId {
        let mut note = Note::new();
        note.set_filename(filename);
        note.set_text("");
        let id = note.id().clone();
        self.inner.lock().unwrap().notelist.append_note(note);
        id
    }

    /// Remove a note, deleting its file when a working directory is set
    pub fn remove_note(&self, id: &NoteId) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        let dirname = guard.dirname.clone();
        guard.notelist.remove_note(dirname.as_deref(), id)
    }

    /// Replace a note's text; returns false if the note is unknown
    pub fn set_note_text(&self, id: &NoteId, text: &str) -> bool {
        let mut guard = self.inner.lock().unwrap();
        match guard.notelist.note_mut(id) {
            Some(note) => {
                note.set_text(text);
                true
            }
            None => false,
        }
    }

    /// Run `f` with exclusive access to the note list
    pub fn with_notelist<R>(&self, f: impl FnOnce(&mut NoteList) -> R) -> R {
        f(&mut self.inner.lock().unwrap().notelist)
    }

    /// Save before shutdown when anything is dirty
    ///
    /// A window-manager close is equivalent to an explicit quit: dirty
    /// state is flushed first, and quitting an unnamed dirty list fails
    /// with [`JotterError::DirectoryNotSet`] so the caller can ask for
    /// a name.
    pub fn prepare_quit(&self) -> Result<()> {
        let mut guard = self.inner.lock().unwrap();
        if !guard.notelist.is_dirty() {
            return Ok(());
        }
        let dirname = guard.dirname.clone().ok_or(JotterError::DirectoryNotSet)?;
        guard.notelist.save(&dirname)
    }

    /// Open a new view onto the note list
    ///
    /// Fails with [`JotterError::TooManyViews`] when the visibility
    /// column pool is exhausted.
    pub fn new_view(&self) -> Result<View> {
        let mut guard = self.inner.lock().unwrap();
        let column = guard.notelist.add_visibility_column()?;
        guard.open_views += 1;
        tracing::debug!("Opened view on column {}", column.index());
        Ok(View {
            inner: Arc::clone(&self.inner),
            column: Some(column),
        })
    }

    /// Close a view; returns true when it was the last one open
    ///
    /// The caller is expected to shut down once the last view closes.
    pub fn close_view(&self, view: View) -> bool {
        drop(view);
        self.inner.lock().unwrap().open_views == 0
    }
}

/// One window's filtered perspective on the note list
///
/// A view owns one visibility column for its lifetime; dropping the
/// view returns the column to the pool.
pub struct View {
    inner: Arc<Mutex<StoreInner>>,
    column: Option<ViewColumn>,
}

impl View {
    /// The visibility column backing this view
    pub fn column(&self) -> ViewColumn {
        self.col()
    }

    /// Re-run the view's filter against raw search-box text
    ///
    /// The text is lower-cased and split on whitespace, then every note
    /// is re-marked. Edits made after this call are not reflected until
    /// the next one.
    pub fn refilter(&self, raw_pattern: &str) {
        let pattern = Pattern::parse(raw_pattern);
        self.inner
            .lock()
            .unwrap()
            .notelist
            .mark_visible_rows(self.col(), &pattern);
    }

    /// The notes last marked visible, as (id, title), sorted by title
    pub fn matching_notes(&self) -> Vec<(NoteId, String)> {
        let guard = self.inner.lock().unwrap();
        let mut notes: Vec<(NoteId, String)> = guard
            .notelist
            .visible_notes(self.col())
            .into_iter()
            .map(|note| (note.id().clone(), note.title().to_string()))
            .collect();
        notes.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        notes
    }

    /// Number of notes last marked visible
    pub fn match_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .notelist
            .visible_notes(self.col())
            .len()
    }

    fn col(&self) -> ViewColumn {
        self.column.expect("view column is held until drop")
    }
}

impl Drop for View {
    fn drop(&mut self) {
        if let Some(column) = self.column.take() {
            let mut guard = self.inner.lock().unwrap();
            guard.notelist.remove_visibility_column(column);
            guard.open_views -= 1;
            tracing::debug!("Closed view on column {}", column.index());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::MockTimerService;
    use std::fs;
    use tempfile::TempDir;

    fn store_with_timers() -> (NoteStore, Arc<MockTimerService>) {
        let timers = Arc::new(MockTimerService::new());
        (NoteStore::new(timers.clone()), timers)
    }

    fn seeded_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pink.note"), "pink note\n").unwrap();
        fs::write(dir.path().join("pretty.note"), "pretty note\n").unwrap();
        dir
    }

    #[test]
    fn test_open_adopts_dirname() {
        let (store, _timers) = store_with_timers();
        let dir = seeded_dir();
        store.open_notelist(dir.path()).unwrap();
        assert_eq!(store.dirname().unwrap(), dir.path());
        assert_eq!(store.with_notelist(|list| list.len()), 2);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_save_without_dirname_fails() {
        let (store, _timers) = store_with_timers();
        store.create_note("orphan");
        assert!(matches!(
            store.save_notelist(),
            Err(JotterError::DirectoryNotSet)
        ));
    }

    #[test]
    fn test_save_as_adopts_dirname() {
        let (store, _timers) = store_with_timers();
        store.create_note("fresh");
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("notes");
        store.save_notelist_as(&target).unwrap();
        assert_eq!(store.dirname().unwrap(), target);
        assert!(target.join("fresh.note").exists());
        assert!(!store.is_dirty());
        // A plain save now works.
        store.save_notelist().unwrap();
    }

    #[test]
    fn test_autosave_without_dirname_is_noop() {
        let (store, _timers) = store_with_timers();
        store.create_note("unsaved");
        store.autosave().unwrap();
        assert!(store.is_dirty());
    }

    #[test]
    fn test_autosave_through_debounce() {
        let (store, timers) = store_with_timers();
        let dir = seeded_dir();
        store.open_notelist(dir.path()).unwrap();

        let id = store
            .with_notelist(|list| list.notes().next().unwrap().id().clone());
        assert!(store.set_note_text(&id, "pink note\nwith a body\n"));
        assert!(store.is_dirty());
        assert_eq!(timers.pending_count(), 1);

        timers.fire_all();
        assert!(!store.is_dirty());
        assert_eq!(
            fs::read_to_string(dir.path().join("pink.note")).unwrap(),
            "pink note\nwith a body\n"
        );
    }

    #[test]
    fn test_edits_arm_debounce_with_autosave_delay() {
        let (store, timers) = store_with_timers();
        let dir = seeded_dir();
        store.open_notelist(dir.path()).unwrap();

        assert_eq!(timers.next_delay(), None);
        let id = store
            .with_notelist(|list| list.notes().next().unwrap().id().clone());
        store.set_note_text(&id, "pink note\nrevised\n");
        assert_eq!(timers.next_delay(), Some(AUTOSAVE_DELAY));
    }

    #[test]
    fn test_debounce_collapses_before_autosave() {
        let (store, timers) = store_with_timers();
        let dir = seeded_dir();
        store.open_notelist(dir.path()).unwrap();

        let id = store
            .with_notelist(|list| list.notes().next().unwrap().id().clone());
        store.set_note_text(&id, "draft one\n");
        store.set_note_text(&id, "draft two\n");
        store.set_note_text(&id, "draft three\n");
        assert_eq!(timers.pending_count(), 1);
        timers.fire_all();
        assert_eq!(
            fs::read_to_string(dir.path().join("pink.note")).unwrap(),
            "draft three\n"
        );
    }

    #[test]
    fn test_create_and_remove_note() {
        let (store, _timers) = store_with_timers();
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("notes");

        let id = store.create_note("scratch");
        store.save_notelist_as(&target).unwrap();
        assert!(target.join("scratch.note").exists());

        store.remove_note(&id).unwrap();
        assert!(!target.join("scratch.note").exists());
        assert_eq!(store.with_notelist(|list| list.len()), 0);
    }

    #[test]
    fn test_remove_note_without_dirname_is_memory_only() {
        let (store, _timers) = store_with_timers();
        let id = store.create_note("ghost");
        store.remove_note(&id).unwrap();
        assert_eq!(store.with_notelist(|list| list.len()), 0);
    }

    #[test]
    fn test_view_lifecycle() {
        let (store, _timers) = store_with_timers();
        let first = store.new_view().unwrap();
        let second = store.new_view().unwrap();
        assert_ne!(first.column(), second.column());

        assert!(!store.close_view(first));
        assert!(store.close_view(second));
        assert_eq!(store.with_notelist(|list| list.visibility_columns().len()), 0);
    }

    #[test]
    fn test_dropping_view_releases_column() {
        let (store, _timers) = store_with_timers();
        {
            let _view = store.new_view().unwrap();
            assert_eq!(
                store.with_notelist(|list| list.visibility_columns().len()),
                1
            );
        }
        assert_eq!(store.with_notelist(|list| list.visibility_columns().len()), 0);
    }

    #[test]
    fn test_view_refilter_and_match_count() {
        let (store, _timers) = store_with_timers();
        let dir = seeded_dir();
        store.open_notelist(dir.path()).unwrap();

        let view = store.new_view().unwrap();
        view.refilter("pink");
        assert_eq!(view.match_count(), 1);
        assert_eq!(view.matching_notes()[0].1, "pink");

        view.refilter("!black");
        let titles: Vec<String> = view.matching_notes().into_iter().map(|(_, t)| t).collect();
        assert_eq!(titles, ["pink", "pretty"]);

        view.refilter("");
        assert_eq!(view.match_count(), 2);
    }

    #[test]
    fn test_prepare_quit_saves_dirty_list() {
        let (store, _timers) = store_with_timers();
        let dir = seeded_dir();
        store.open_notelist(dir.path()).unwrap();

        let id = store
            .with_notelist(|list| list.notes().next().unwrap().id().clone());
        store.set_note_text(&id, "pink note\nedited\n");
        store.prepare_quit().unwrap();
        assert!(!store.is_dirty());
        assert_eq!(
            fs::read_to_string(dir.path().join("pink.note")).unwrap(),
            "pink note\nedited\n"
        );
    }

    #[test]
    fn test_prepare_quit_clean_list_is_noop() {
        let (store, _timers) = store_with_timers();
        store.prepare_quit().unwrap();
    }

    #[test]
    fn test_prepare_quit_dirty_unnamed_list_fails() {
        let (store, _timers) = store_with_timers();
        store.create_note("unnamed");
        assert!(matches!(
            store.prepare_quit(),
            Err(JotterError::DirectoryNotSet)
        ));
    }

    #[test]
    fn test_autosave_after_store_dropped_is_noop() {
        let timers = Arc::new(MockTimerService::new());
        let store = NoteStore::new(timers.clone());
        let dir = seeded_dir();
        store.open_notelist(dir.path()).unwrap();
        let id = store
            .with_notelist(|list| list.notes().next().unwrap().id().clone());
        store.set_note_text(&id, "pending\n");
        drop(store);
        // The weak back-reference is gone; firing must not panic.
        timers.fire_all();
    }
}
