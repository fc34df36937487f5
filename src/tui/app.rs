// TUI application state
//
// Owns the browser's view of the history: the loaded entries, the cursor and
// scroll window, the active search query, and the input mode. Everything
// here is a disposable copy of what the store holds; the store stays the
// source of truth and every mutation goes through it first.
//
// Modes:
//
//   Browsing ──'/'──→ Searching ──Enter/Esc──→ Browsing
//      │
//      └──'t'──→ Transforming ──any key──→ Browsing
//      │
//      └──'q'──→ (quit)

use super::scroll::ListWindow;
use super::toast::Toast;
use crate::clipboard::ClipboardAccess;
use crate::error::{InputError, StorageError};
use crate::signal::RefreshSignal;
use crate::storage::{Entry, Store};
use crate::transform::Transform;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;

/// Input mode of the browser
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// List navigation and entry commands
    #[default]
    Browsing,
    /// Editing a search query; `input` is the uncommitted line
    Searching { input: String },
    /// Waiting for a one-key transform choice
    Transforming,
}

/// Main application state for the TUI
pub struct App {
    store: Arc<Store>,
    clipboard: Arc<dyn ClipboardAccess>,
    refresh: RefreshSignal,

    /// Maximum entries loaded per reload
    list_limit: usize,

    /// Last loaded entries, newest first
    pub entries: Vec<Entry>,

    /// Cursor and scroll offset over `entries`
    pub window: ListWindow,

    /// Committed search query (empty = show everything)
    pub query: String,

    pub mode: Mode,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Active toast notification (auto-dismisses)
    pub toast: Option<Toast>,
}

impl App {
    pub fn new(
        store: Arc<Store>,
        clipboard: Arc<dyn ClipboardAccess>,
        refresh: RefreshSignal,
        list_limit: usize,
    ) -> Self {
        Self {
            store,
            clipboard,
            refresh,
            list_limit,
            entries: Vec::new(),
            window: ListWindow::new(),
            query: String::new(),
            mode: Mode::Browsing,
            should_quit: false,
            toast: None,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────

    /// Reload the list for the current query.
    ///
    /// On failure the previous list stays on screen.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        let loaded = if self.query.is_empty() {
            self.store.fetch_recent(self.list_limit)
        } else {
            self.store.search(&self.query, self.list_limit)
        };

        match loaded {
            Ok(entries) => {
                self.entries = entries;
                self.window.set_total(self.entries.len());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to reload history: {}", e);
                Err(e)
            }
        }
    }

    /// Per-frame housekeeping: consume a pending refresh request.
    ///
    /// Returns true if the list was reloaded.
    pub fn on_frame(&mut self) -> bool {
        if self.refresh.take() {
            return self.reload().is_ok();
        }
        false
    }

    /// Tell the list how many rows fit on screen
    pub fn set_viewport(&mut self, rows: usize) {
        self.window.set_viewport(rows);
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.entries.get(self.window.selected())
    }

    // ─────────────────────────────────────────────────────────────
    // Key dispatch
    // ─────────────────────────────────────────────────────────────

    /// Route a key press to the current mode
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<(), InputError> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        match self.mode {
            Mode::Browsing => self.handle_browsing_key(key),
            Mode::Searching { .. } => {
                self.handle_search_key(key);
                Ok(())
            }
            Mode::Transforming => self.handle_transform_key(key),
        }
    }

    fn handle_browsing_key(&mut self, key: KeyEvent) -> Result<(), InputError> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.window.move_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.window.move_by(1),
            KeyCode::PageUp => self.window.page_up(),
            KeyCode::PageDown => self.window.page_down(),
            KeyCode::Home | KeyCode::Char('g') => self.window.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.window.select_last(),
            KeyCode::Enter => self.copy_selected()?,
            KeyCode::Char('f') => self.toggle_favorite()?,
            KeyCode::Char('d') => self.delete_selected()?,
            KeyCode::Char('t') => {
                if self.selected_entry().is_none() {
                    return Err(InputError::NoSelection);
                }
                self.mode = Mode::Transforming;
            }
            KeyCode::Char('/') => {
                self.mode = Mode::Searching {
                    input: self.query.clone(),
                };
            }
            KeyCode::Esc => {
                if !self.query.is_empty() {
                    self.commit_search(String::new());
                }
            }
            other => return Err(InputError::UnboundKey(format!("{:?}", other))),
        }
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let Mode::Searching { input } = &mut self.mode else {
            return;
        };

        match key.code {
            KeyCode::Enter => {
                let query = std::mem::take(input);
                self.commit_search(query);
            }
            KeyCode::Esc => self.mode = Mode::Browsing,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Char(c) => input.push(c),
            _ => {}
        }
    }

    fn handle_transform_key(&mut self, key: KeyEvent) -> Result<(), InputError> {
        self.mode = Mode::Browsing;
        match key.code {
            KeyCode::Char(c) => match Transform::from_key(c) {
                Some(transform) => self.apply_transform(transform),
                None => Err(InputError::UnknownTransform(c)),
            },
            // Esc and anything else cancel
            _ => Ok(()),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────

    /// Set the query, leave search mode, and reload from the top
    pub fn commit_search(&mut self, query: String) {
        self.mode = Mode::Browsing;
        let changed = query != self.query;
        self.query = query;
        if changed {
            self.window.select_first();
        }
        let _ = self.reload();
    }

    /// Copy the selected entry's text to the clipboard
    pub fn copy_selected(&mut self) -> Result<(), InputError> {
        let text = self
            .selected_entry()
            .map(|e| e.text.clone())
            .ok_or(InputError::NoSelection)?;
        self.write_clipboard(&text, "✓ Copied to clipboard");
        Ok(())
    }

    /// Flip the favorite flag; the in-memory copy changes only once the store
    /// has accepted the update
    pub fn toggle_favorite(&mut self) -> Result<(), InputError> {
        let idx = self.window.selected();
        let entry = self.entries.get(idx).ok_or(InputError::NoSelection)?;
        let (id, favorite) = (entry.id, !entry.favorite);

        match self.store.set_favorite(id, favorite) {
            Ok(()) => {
                if let Some(entry) = self.entries.get_mut(idx) {
                    entry.favorite = favorite;
                }
            }
            Err(e) => tracing::warn!("Failed to update favorite for #{}: {}", id, e),
        }
        Ok(())
    }

    /// Delete the selected entry and reload
    pub fn delete_selected(&mut self) -> Result<(), InputError> {
        let id = self
            .selected_entry()
            .map(|e| e.id)
            .ok_or(InputError::NoSelection)?;

        match self.store.delete(id) {
            Ok(()) => {
                tracing::debug!("Deleted entry #{}", id);
                let _ = self.reload();
            }
            Err(e) => tracing::warn!("Failed to delete #{}: {}", id, e),
        }
        Ok(())
    }

    /// Transform a copy of the selected text and put it on the clipboard.
    /// The stored entry is not modified.
    pub fn apply_transform(&mut self, transform: Transform) -> Result<(), InputError> {
        let transformed = self
            .selected_entry()
            .map(|e| transform.apply(&e.text))
            .ok_or(InputError::NoSelection)?;
        let message = format!("✓ {} copied", transform.label());
        self.write_clipboard(&transformed, &message);
        Ok(())
    }

    fn write_clipboard(&mut self, text: &str, success: &str) {
        match self.clipboard.write(text) {
            Ok(()) => self.show_toast(success),
            Err(e) => tracing::warn!("{}", e),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Toast
    // ─────────────────────────────────────────────────────────────

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    pub fn clear_expired_toast(&mut self) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::testing::MemoryClipboard;
    use crate::util::hash64;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut App, code: KeyCode) -> Result<(), InputError> {
        app.handle_key(key(code))
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c)).unwrap();
        }
    }

    struct Fixture {
        store: Arc<Store>,
        clip: Arc<MemoryClipboard>,
        refresh: RefreshSignal,
        app: App,
    }

    /// Store seeded with `texts` in capture order (last one is newest)
    fn fixture(texts: &[&str]) -> Fixture {
        let store = Arc::new(Store::new());
        store.open(":memory:").unwrap();
        for (i, t) in texts.iter().enumerate() {
            store.insert(t, hash64(t), i as i64).unwrap();
        }
        let clip = Arc::new(MemoryClipboard::new());
        let refresh = RefreshSignal::new();
        let mut app = App::new(store.clone(), clip.clone(), refresh.clone(), 500);
        app.set_viewport(3);
        app.reload().unwrap();
        Fixture {
            store,
            clip,
            refresh,
            app,
        }
    }

    fn shown(app: &App) -> Vec<&str> {
        app.entries.iter().map(|e| e.text.as_str()).collect()
    }

    #[test]
    fn test_initial_load_newest_first() {
        let f = fixture(&["a", "b", "c"]);
        assert_eq!(shown(&f.app), vec!["c", "b", "a"]);
        assert_eq!(f.app.window.selected(), 0);
        assert_eq!(f.app.mode, Mode::Browsing);
    }

    #[test]
    fn test_navigation_keeps_selection_visible() {
        let mut f = fixture(&["1", "2", "3", "4", "5", "6", "7"]);

        for _ in 0..4 {
            press(&mut f.app, KeyCode::Down).unwrap();
        }
        assert_eq!(f.app.window.selected(), 4);
        assert_eq!(f.app.window.offset(), 2);

        press(&mut f.app, KeyCode::PageDown).unwrap();
        assert_eq!(f.app.window.selected(), 6);

        press(&mut f.app, KeyCode::Char('g')).unwrap();
        assert_eq!((f.app.window.selected(), f.app.window.offset()), (0, 0));

        press(&mut f.app, KeyCode::Up).unwrap();
        assert_eq!(f.app.window.selected(), 0);
    }

    #[test]
    fn test_enter_copies_selected_text() {
        let mut f = fixture(&["old", "new"]);
        press(&mut f.app, KeyCode::Down).unwrap();
        press(&mut f.app, KeyCode::Enter).unwrap();

        assert_eq!(f.clip.writes(), vec!["old".to_string()]);
        assert!(f.app.toast.is_some());
    }

    #[test]
    fn test_copy_failure_is_silent() {
        let mut f = fixture(&["x"]);
        f.clip.set_fail_writes(true);

        assert!(press(&mut f.app, KeyCode::Enter).is_ok());
        assert!(f.app.toast.is_none());
        assert!(!f.app.should_quit);
    }

    #[test]
    fn test_commands_on_empty_list_are_rejected() {
        let mut f = fixture(&[]);
        assert_eq!(press(&mut f.app, KeyCode::Enter), Err(InputError::NoSelection));
        assert_eq!(press(&mut f.app, KeyCode::Char('f')), Err(InputError::NoSelection));
        assert_eq!(press(&mut f.app, KeyCode::Char('d')), Err(InputError::NoSelection));
        assert_eq!(press(&mut f.app, KeyCode::Char('t')), Err(InputError::NoSelection));
        assert_eq!(f.app.mode, Mode::Browsing);
    }

    #[test]
    fn test_unbound_key_changes_nothing() {
        let mut f = fixture(&["a", "b"]);
        press(&mut f.app, KeyCode::Down).unwrap();

        let err = press(&mut f.app, KeyCode::Char('z')).unwrap_err();
        assert!(matches!(err, InputError::UnboundKey(_)));
        assert_eq!(f.app.window.selected(), 1);
        assert_eq!(f.app.mode, Mode::Browsing);
    }

    #[test]
    fn test_favorite_toggle_persists() {
        let mut f = fixture(&["keep"]);

        press(&mut f.app, KeyCode::Char('f')).unwrap();
        assert!(f.app.entries[0].favorite);
        assert!(f.store.fetch_recent(1).unwrap()[0].favorite);

        press(&mut f.app, KeyCode::Char('f')).unwrap();
        assert!(!f.app.entries[0].favorite);
        assert!(!f.store.fetch_recent(1).unwrap()[0].favorite);
    }

    #[test]
    fn test_favorite_not_applied_when_store_fails() {
        let mut f = fixture(&["keep"]);
        f.store.close();

        press(&mut f.app, KeyCode::Char('f')).unwrap();
        assert!(!f.app.entries[0].favorite);
    }

    #[test]
    fn test_delete_reloads_and_clamps_selection() {
        let mut f = fixture(&["a", "b", "c"]);
        press(&mut f.app, KeyCode::End).unwrap();
        assert_eq!(f.app.selected_entry().unwrap().text, "a");

        press(&mut f.app, KeyCode::Char('d')).unwrap();
        assert_eq!(shown(&f.app), vec!["c", "b"]);
        assert_eq!(f.app.window.selected(), 1);
        assert_eq!(f.store.count().unwrap(), 2);
    }

    #[test]
    fn test_search_flow() {
        let mut f = fixture(&["hello", "world", "bell"]);

        press(&mut f.app, KeyCode::Char('/')).unwrap();
        assert!(matches!(f.app.mode, Mode::Searching { .. }));
        type_str(&mut f.app, "elx");
        press(&mut f.app, KeyCode::Backspace).unwrap();
        type_str(&mut f.app, "l");
        press(&mut f.app, KeyCode::Enter).unwrap();

        assert_eq!(f.app.mode, Mode::Browsing);
        assert_eq!(f.app.query, "ell");
        assert_eq!(shown(&f.app), vec!["bell", "hello"]);
    }

    #[test]
    fn test_search_keys_do_not_trigger_commands() {
        let mut f = fixture(&["quiet"]);

        press(&mut f.app, KeyCode::Char('/')).unwrap();
        type_str(&mut f.app, "qdf");
        assert!(!f.app.should_quit);
        assert_eq!(f.store.count().unwrap(), 1);
        assert!(!f.store.fetch_recent(1).unwrap()[0].favorite);
    }

    #[test]
    fn test_search_escape_keeps_old_query() {
        let mut f = fixture(&["apple", "banana"]);
        f.app.commit_search("app".into());
        assert_eq!(shown(&f.app), vec!["apple"]);

        press(&mut f.app, KeyCode::Char('/')).unwrap();
        type_str(&mut f.app, "x");
        press(&mut f.app, KeyCode::Esc).unwrap();

        assert_eq!(f.app.query, "app");
        assert_eq!(shown(&f.app), vec!["apple"]);
    }

    #[test]
    fn test_empty_query_shows_everything() {
        let mut f = fixture(&["apple", "banana"]);
        f.app.commit_search("nan".into());
        assert_eq!(shown(&f.app), vec!["banana"]);

        press(&mut f.app, KeyCode::Char('/')).unwrap();
        for _ in 0..3 {
            press(&mut f.app, KeyCode::Backspace).unwrap();
        }
        press(&mut f.app, KeyCode::Enter).unwrap();
        assert_eq!(shown(&f.app), vec!["banana", "apple"]);
    }

    #[test]
    fn test_escape_in_browsing_clears_query() {
        let mut f = fixture(&["apple", "banana"]);
        f.app.commit_search("apple".into());

        press(&mut f.app, KeyCode::Esc).unwrap();
        assert!(f.app.query.is_empty());
        assert_eq!(f.app.entries.len(), 2);
    }

    #[test]
    fn test_new_query_resets_scroll() {
        let mut f = fixture(&["a1", "a2", "a3", "a4", "a5", "a6"]);
        press(&mut f.app, KeyCode::End).unwrap();
        assert!(f.app.window.offset() > 0);

        f.app.commit_search("a".into());
        assert_eq!((f.app.window.selected(), f.app.window.offset()), (0, 0));
    }

    #[test]
    fn test_transform_copies_without_mutating_history() {
        let mut f = fixture(&["  Hello%20World  "]);

        press(&mut f.app, KeyCode::Char('t')).unwrap();
        assert_eq!(f.app.mode, Mode::Transforming);
        press(&mut f.app, KeyCode::Char('3')).unwrap();
        assert_eq!(f.app.mode, Mode::Browsing);

        press(&mut f.app, KeyCode::Char('t')).unwrap();
        press(&mut f.app, KeyCode::Char('1')).unwrap();

        press(&mut f.app, KeyCode::Char('t')).unwrap();
        press(&mut f.app, KeyCode::Char('2')).unwrap();

        assert_eq!(
            f.clip.writes(),
            vec![
                "  Hello World  ".to_string(),
                "Hello%20World".to_string(),
                "  hELLO%20wORLD  ".to_string(),
            ]
        );
        assert_eq!(f.app.entries[0].text, "  Hello%20World  ");
        assert_eq!(f.store.fetch_recent(1).unwrap()[0].text, "  Hello%20World  ");
    }

    #[test]
    fn test_transform_cancel_and_unknown_choice() {
        let mut f = fixture(&["text"]);

        press(&mut f.app, KeyCode::Char('t')).unwrap();
        press(&mut f.app, KeyCode::Esc).unwrap();
        assert_eq!(f.app.mode, Mode::Browsing);

        press(&mut f.app, KeyCode::Char('t')).unwrap();
        assert_eq!(
            press(&mut f.app, KeyCode::Char('9')),
            Err(InputError::UnknownTransform('9'))
        );
        assert_eq!(f.app.mode, Mode::Browsing);
        assert!(f.clip.writes().is_empty());
    }

    #[test]
    fn test_refresh_signal_consumed_once_per_frame() {
        let mut f = fixture(&["a"]);
        assert!(!f.app.on_frame());

        f.store.insert("b", hash64("b"), 10).unwrap();
        f.refresh.request();
        f.refresh.request();

        assert!(f.app.on_frame());
        assert_eq!(shown(&f.app), vec!["b", "a"]);
        assert!(!f.app.on_frame());
    }

    #[test]
    fn test_refresh_respects_active_query() {
        let mut f = fixture(&["cat"]);
        f.app.commit_search("cat".into());

        f.store.insert("dog", hash64("dog"), 10).unwrap();
        f.store.insert("catalog", hash64("catalog"), 11).unwrap();
        f.refresh.request();
        f.app.on_frame();

        assert_eq!(shown(&f.app), vec!["catalog", "cat"]);
    }

    #[test]
    fn test_refresh_clamps_selection_when_list_shrinks() {
        let mut f = fixture(&["a", "b", "c", "d"]);
        press(&mut f.app, KeyCode::End).unwrap();

        // Simulate pruning by another task
        f.store.prune(2).unwrap();
        f.refresh.request();
        f.app.on_frame();

        assert_eq!(f.app.entries.len(), 2);
        assert_eq!(f.app.window.selected(), 1);
        assert!(f.app.window.offset() <= 1);
    }

    #[test]
    fn test_failed_reload_keeps_previous_list() {
        let mut f = fixture(&["a", "b"]);
        f.store.close();
        f.refresh.request();

        assert!(!f.app.on_frame());
        assert_eq!(shown(&f.app), vec!["b", "a"]);
    }

    #[test]
    fn test_quit_keys() {
        let mut f = fixture(&[]);
        press(&mut f.app, KeyCode::Char('q')).unwrap();
        assert!(f.app.should_quit);

        let mut f = fixture(&[]);
        f.app
            .handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(f.app.should_quit);
    }
}
