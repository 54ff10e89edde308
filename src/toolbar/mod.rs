use crossbeam_channel::{unbounded, Receiver, Sender};
use indexmap::IndexMap;

use crate::config::AppConfig;
use crate::storage::{Geometry, NoteId, NoteRecord, NoteStore};
use crate::window::{NoteEvent, NoteWindow, Point, WindowSettings};

/// One entry of the preview list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub id: NoteId,
    pub title: String,
}

/// Previews whose title contains `filter` (case-insensitive), sorted by title
/// with identifiers breaking ties.
pub fn collect_previews(store: &NoteStore, filter: &str) -> Vec<Preview> {
    let needle = filter.to_lowercase();
    let mut previews: Vec<(String, Preview)> = store
        .records()
        .map(|record| {
            let title = record.display_title();
            (title.to_lowercase(), Preview {
                id: record.id.clone(),
                title,
            })
        })
        .filter(|(key, _)| needle.is_empty() || key.contains(&needle))
        .collect();
    previews.sort_by(|(a_key, a), (b_key, b)| a_key.cmp(b_key).then_with(|| a.id.cmp(&b.id)));
    previews.into_iter().map(|(_, preview)| preview).collect()
}

/// Owns the note store, the preview list and every open note window.
#[derive(Debug)]
pub struct Toolbar {
    store: NoteStore,
    windows: IndexMap<NoteId, NoteWindow>,
    events_tx: Sender<NoteEvent>,
    events_rx: Receiver<NoteEvent>,
    settings: WindowSettings,
    default_geometry: Geometry,
    filter: String,
    previews: Vec<Preview>,
}

impl Toolbar {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_store(NoteStore::open(&config.storage), config)
    }

    pub fn with_store(store: NoteStore, config: &AppConfig) -> Self {
        let (events_tx, events_rx) = unbounded();
        let mut toolbar = Self {
            store,
            windows: IndexMap::new(),
            events_tx,
            events_rx,
            settings: WindowSettings::from(config),
            default_geometry: config.window.default_geometry,
            filter: String::new(),
            previews: Vec::new(),
        };
        toolbar.refresh();
        toolbar
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn previews(&self) -> &[Preview] {
        &self.previews
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    fn refresh(&mut self) {
        self.previews = collect_previews(&self.store, &self.filter);
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.refresh();
    }

    pub fn push_filter_char(&mut self, ch: char) {
        self.filter.push(ch);
        self.refresh();
    }

    pub fn pop_filter_char(&mut self) -> bool {
        let popped = self.filter.pop().is_some();
        if popped {
            self.refresh();
        }
        popped
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(String::new());
    }

    /// Creates an empty note, persists it and opens its window.
    pub fn add_note(&mut self) -> NoteId {
        let id = NoteId::generate();
        self.store
            .upsert(NoteRecord::new(id.clone(), self.default_geometry));
        self.store.save();
        self.refresh();
        tracing::info!(%id, "created note");
        self.open_note(&id);
        id
    }

    /// Raises, restores or opens the window for `id`. Returns `false` when no
    /// such note exists.
    pub fn open_note(&mut self, id: &NoteId) -> bool {
        if let Some(window) = self.windows.get_mut(id) {
            window.restore();
            self.raise(id);
            return true;
        }
        let Some(record) = self.store.get(id).cloned() else {
            tracing::warn!(%id, "note not found");
            return false;
        };
        let window = NoteWindow::open(record, self.settings, self.events_tx.clone());
        self.windows.insert(id.clone(), window);
        true
    }

    pub fn on_note_updated(&mut self, id: NoteId, record: NoteRecord) {
        if !self.store.contains(&id) {
            tracing::debug!(%id, "ignoring update for a deleted note");
            return;
        }
        self.store.upsert(record);
        self.store.save();
        self.refresh();
    }

    pub fn on_note_deleted(&mut self, id: &NoteId) {
        if self.store.remove(id).is_some() {
            tracing::info!(%id, "deleted note");
            self.store.save();
            self.refresh();
        }
        if let Some(mut window) = self.windows.shift_remove(id) {
            window.dismiss();
        }
    }

    /// Deletes from the preview list. Returns whether the note existed.
    pub fn delete_note(&mut self, id: &NoteId) -> bool {
        let existed = self.store.contains(id);
        self.on_note_deleted(id);
        existed
    }

    pub fn close_note(&mut self, id: &NoteId) -> bool {
        let Some(window) = self.windows.get_mut(id) else {
            return false;
        };
        window.close();
        self.pump_events();
        true
    }

    pub fn minimize_note(&mut self, id: &NoteId) -> bool {
        match self.windows.get_mut(id) {
            Some(window) => {
                window.minimize();
                true
            }
            None => false,
        }
    }

    /// Applies queued window events and drops closed windows from the
    /// registry. Returns how many events were handled.
    pub fn pump_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            handled += 1;
            match event {
                NoteEvent::Updated { id, record } => self.on_note_updated(id, record),
                NoteEvent::Deleted { id } => self.on_note_deleted(&id),
            }
        }
        self.windows.retain(|_, window| !window.is_closed());
        handled
    }

    /// Open windows, bottom to top.
    pub fn windows(&self) -> impl DoubleEndedIterator<Item = &NoteWindow> {
        self.windows.values()
    }

    pub fn window(&self, id: &NoteId) -> Option<&NoteWindow> {
        self.windows.get(id)
    }

    pub fn window_mut(&mut self, id: &NoteId) -> Option<&mut NoteWindow> {
        self.windows.get_mut(id)
    }

    /// Topmost visible window under `point`.
    pub fn window_at(&self, point: Point) -> Option<NoteId> {
        self.windows
            .values()
            .rev()
            .find(|window| window.contains(point))
            .map(|window| window.id().clone())
    }

    /// Topmost visible window.
    pub fn topmost(&self) -> Option<NoteId> {
        self.windows
            .values()
            .rev()
            .find(|window| window.is_visible())
            .map(|window| window.id().clone())
    }

    pub fn raise(&mut self, id: &NoteId) -> bool {
        match self.windows.get_index_of(id) {
            Some(index) => {
                let last = self.windows.len() - 1;
                self.windows.move_index(index, last);
                true
            }
            None => false,
        }
    }

    /// Closes every window, letting each save its geometry, then persists.
    pub fn close(&mut self) {
        let open = self.windows.len();
        for window in self.windows.values_mut() {
            window.close();
        }
        self.pump_events();
        self.store.save();
        tracing::info!(open, notes = self.store.len(), "toolbar closed");
    }
}
