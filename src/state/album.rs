use tokio::sync::mpsc::{self, UnboundedReceiver};
use super::catalog::CatalogStore;
use super::context::AppContext;
use super::data::CatalogRecord;
use super::entry::{EntryEvent, EntryHandle, EventSender, LoadCompletion, PendingLoad};
use super::selection::{Navigation, SelectionController};
use crate::camera::CameraRig;

/// Which user actions are currently possible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Actions {
    pub add: bool,
    pub remove: bool,
    pub scroll_left: bool,
    pub scroll_right: bool,
    pub log: bool,
}

/// The Album drives the whole entry lifecycle: revealing catalog records as
/// entries, selection, removal, and applying finished image loads.
///
/// All mutation happens on the caller's thread. Image fetches are handed out
/// as [`PendingLoad`]s; their [`LoadCompletion`]s come back through
/// [`Album::apply_completion`].
#[derive(Debug)]
pub struct Album {
    ctx: AppContext,
    store: CatalogStore,
    selection: SelectionController,
    events_tx: EventSender,
    events_rx: UnboundedReceiver<EntryEvent>,
}

impl Album {
    /// Create an album with an empty catalog.
    /// The camera starts at rest and pans at the configured speed.
    pub fn new(ctx: AppContext) -> Self {
        let camera = CameraRig::new(CameraRig::default().position(), ctx.config.camera_pan_speed);
        let selection = SelectionController::new(ctx.config.spacing_unit, camera);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            ctx,
            store: CatalogStore::new(),
            selection,
            events_tx,
            events_rx,
        }
    }

    /// Shared context: config, fetcher, placeholders
    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Records and active entries
    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Current selection, focus and camera
    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Camera to advance on each animation frame
    pub fn camera_mut(&mut self) -> &mut CameraRig {
        self.selection.camera_mut()
    }

    /// Install a freshly downloaded catalog.
    /// Entries from a previous catalog are released along with the selection.
    pub fn load_catalog(&mut self, records: Vec<CatalogRecord>) {
        log::info!("📁 Catalog ready with {} records", records.len());
        if let Some(id) = self.selection.selected().map(str::to_string) {
            self.selection.forget(&id);
        }
        self.store.load(records);
    }

    /// Reveal the next catalog record as a new entry and select it.
    ///
    /// Returns the image fetch to run, if any.
    pub fn add_entry(&mut self) -> Option<PendingLoad> {
        // Slot is the 1-based reveal position on the strip
        let record = self.store.reveal_next()?;
        let slot = self.store.revealed_count();
        let id = record.id.clone();

        let mut entry = EntryHandle::new(record, slot, self.events_tx.clone());
        let pending = entry.request_load(&self.ctx.fetcher);

        if let Err(mut duplicate) = self.store.insert(entry) {
            log::warn!("⚠️  Skipping entry {}: id already on display", id);
            duplicate.dispose();
            return None;
        }
        log::info!("➕ Added entry {} at slot {}", id, slot);

        // already loading, so selecting starts no second fetch
        let again = self.selection.select(&mut self.store, &id, &self.ctx.fetcher);
        pending.or(again)
    }

    /// Remove the selected entry, if any
    pub fn remove_selected(&mut self) -> bool {
        match self.selection.selected().map(str::to_string) {
            Some(id) => self.remove(&id),
            None => false,
        }
    }

    /// Remove an entry. Remaining entries keep their place on the strip.
    pub fn remove(&mut self, id: &str) -> bool {
        if !self.store.remove(id) {
            return false;
        }
        self.selection.forget(id);
        log::info!("➖ Removed entry {}", id);
        true
    }

    /// Select an entry by id, returning the fetch it started if any
    pub fn select(&mut self, id: &str) -> Option<PendingLoad> {
        self.selection.select(&mut self.store, id, &self.ctx.fetcher)
    }

    /// Simulate a click on an entry; the selection happens in [`Album::process_events`]
    pub fn click(&self, id: &str) {
        if let Some(entry) = self.store.get(id) {
            entry.click();
        }
    }

    /// Handle queued entry events, returning the fetches they started
    pub fn process_events(&mut self) -> Vec<PendingLoad> {
        let mut pending = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                EntryEvent::Clicked(id) => pending.extend(self.select(&id)),
            }
        }
        pending
    }

    /// Pan one step left without changing the selection
    pub fn scroll_left(&mut self) -> bool {
        self.selection.scroll_left()
    }

    /// Pan one step right, up to the highest index ever revealed
    pub fn scroll_right(&mut self) -> bool {
        self.selection.scroll_right(self.store.max_revealed_index())
    }

    /// Hand a finished fetch back to its entry. Results for removed entries are dropped.
    pub fn apply_completion(&mut self, completion: LoadCompletion) -> bool {
        match self.store.get_mut(&completion.ticket.entry) {
            Some(entry) => entry.complete(completion),
            None => {
                log::debug!("Entry {} is gone, dropping its image", completion.ticket.entry);
                false
            }
        }
    }

    /// One summary line per active entry, also written to the log
    pub fn log_entries(&self) -> Vec<String> {
        let lines: Vec<String> = self.store.entries().iter().map(|e| e.to_string()).collect();
        for line in &lines {
            log::info!("{}", line);
        }
        lines
    }

    /// Scroll availability for the current focus
    pub fn navigation(&self) -> Navigation {
        self.selection.navigation(self.store.max_revealed_index())
    }

    /// Enable flags for the add, remove, scroll and log actions
    pub fn actions(&self) -> Actions {
        let nav = self.navigation();
        Actions {
            add: self.store.has_unrevealed(),
            remove: self.selection.can_remove(),
            scroll_left: nav.can_scroll_left,
            scroll_right: nav.can_scroll_right,
            log: self.store.entry_count() > 0,
        }
    }
}
