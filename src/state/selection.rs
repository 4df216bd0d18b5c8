use crate::camera::CameraRig;
use crate::download::thumbnail::ImageFetcher;
use super::catalog::CatalogStore;
use super::entry::{EntryId, PendingLoad};

/// Tracks the selected entry and the focus index the camera follows.
///
/// Navigation bounds are `[1, max revealed index]`. The upper bound comes
/// from the catalog cursor and does not shrink when entries are removed,
/// so scrolling can land on a gap left by a removed entry.
#[derive(Debug)]
pub struct SelectionController {
    selected: Option<EntryId>,
    focus_index: i32,
    spacing_unit: f32,
    camera: CameraRig,
}

/// Which scroll buttons are usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Navigation {
    pub can_scroll_left: bool,
    pub can_scroll_right: bool,
}

impl SelectionController {
    /// Create a controller with nothing selected and focus index 0
    pub fn new(spacing_unit: f32, camera: CameraRig) -> Self {
        Self {
            selected: None,
            focus_index: 0,
            spacing_unit,
            camera,
        }
    }

    /// Select the entry `id`, deselecting the previous one.
    ///
    /// Always asks the entry to load its image; the returned fetch is
    /// `None` when it is already loading or loaded. Unknown ids change nothing.
    pub fn select(
        &mut self,
        store: &mut CatalogStore,
        id: &str,
        fetcher: &ImageFetcher,
    ) -> Option<PendingLoad> {
        if !store.contains(id) {
            return None;
        }

        if let Some(previous) = self.selected.take() {
            if let Some(entry) = store.get_mut(&previous) {
                entry.deselect();
            }
        }

        // Focus follows the numeric id, 0 when it is not a number
        let entry = store.get_mut(id)?;
        self.focus_index = entry.record().position();
        entry.select();
        let pending = entry.request_load(fetcher);

        self.selected = Some(id.to_string());
        self.update_camera();
        pending
    }

    /// Drop the selection if it points at `id`
    pub fn forget(&mut self, id: &str) {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
    }

    /// Move the focus one step left, stopping at index 1.
    /// Returns false when already at the bound.
    pub fn scroll_left(&mut self) -> bool {
        if self.focus_index > 1 {
            self.focus_index -= 1;
            self.update_camera();
            true
        } else {
            false
        }
    }

    /// Move the focus one step right, stopping at the highest revealed index.
    /// Returns false when already at the bound.
    pub fn scroll_right(&mut self, max_revealed_index: i32) -> bool {
        if self.focus_index < max_revealed_index {
            self.focus_index += 1;
            self.update_camera();
            true
        } else {
            false
        }
    }

    /// Scroll availability for the current focus
    pub fn navigation(&self, max_revealed_index: i32) -> Navigation {
        Navigation {
            can_scroll_left: self.focus_index > 1,
            can_scroll_right: self.focus_index < max_revealed_index,
        }
    }

    /// Removing needs a selection
    pub fn can_remove(&self) -> bool {
        self.selected.is_some()
    }

    /// Id of the selected entry, if any
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn focus_index(&self) -> i32 {
        self.focus_index
    }

    /// World X position of a 1-based index
    pub fn position_of(&self, index: i32) -> f32 {
        // float math: ids can be any i32, including i32::MIN
        (index as f32 - 1.0) * self.spacing_unit
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraRig {
        &mut self.camera
    }

    /// Send the camera to the focused index
    fn update_camera(&mut self) {
        let x = self.position_of(self.focus_index);
        self.camera.set_target_x(x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::thumbnail::testing::{fetcher, Behavior, FakeSource};
    use crate::state::data::record;
    use crate::state::entry::{EntryHandle, LoadState};
    use tokio::sync::mpsc;

    fn revealed_store(ids: &[&str]) -> CatalogStore {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut store = CatalogStore::new();
        store.load(ids.iter().map(|id| record(id)).collect());
        let mut slot = 0;
        while let Some(record) = store.reveal_next() {
            slot += 1;
            store.insert(EntryHandle::new(record, slot, tx.clone())).unwrap();
        }
        store
    }

    fn controller() -> SelectionController {
        SelectionController::new(2.0, CameraRig::default())
    }

    #[test]
    fn test_select_moves_focus_and_camera() {
        let source = FakeSource::new(Behavior::Png);
        let mut store = revealed_store(&["1", "2", "3"]);
        let mut selection = controller();

        let pending = selection.select(&mut store, "2", &fetcher(&source));

        assert!(pending.is_some());
        assert_eq!(selection.focus_index(), 2);
        assert_eq!(selection.camera().target_x(), 2.0);
        assert_eq!(selection.selected(), Some("2"));
        assert!(selection.can_remove());
        assert!(store.get("2").unwrap().is_selected());
        assert_eq!(store.get("2").unwrap().state(), LoadState::Loading);
    }

    #[test]
    fn test_select_deselects_previous() {
        let source = FakeSource::new(Behavior::Png);
        let mut store = revealed_store(&["1", "2"]);
        let mut selection = controller();

        selection.select(&mut store, "1", &fetcher(&source));
        selection.select(&mut store, "2", &fetcher(&source));

        assert!(!store.get("1").unwrap().is_selected());
        assert!(store.get("2").unwrap().is_selected());
    }

    #[test]
    fn test_reselect_while_loading_starts_no_fetch() {
        let source = FakeSource::new(Behavior::Png);
        let mut store = revealed_store(&["1"]);
        let mut selection = controller();

        assert!(selection.select(&mut store, "1", &fetcher(&source)).is_some());
        assert!(selection.select(&mut store, "1", &fetcher(&source)).is_none());
        assert!(store.get("1").unwrap().is_selected());
    }

    #[test]
    fn test_unknown_id_changes_nothing() {
        let source = FakeSource::new(Behavior::Png);
        let mut store = revealed_store(&["1"]);
        let mut selection = controller();

        assert!(selection.select(&mut store, "9", &fetcher(&source)).is_none());
        assert_eq!(selection.selected(), None);
        assert!(!selection.can_remove());
    }

    #[test]
    fn test_non_numeric_id_focuses_zero() {
        let source = FakeSource::new(Behavior::Png);
        let mut store = revealed_store(&["abc"]);
        let mut selection = controller();

        selection.select(&mut store, "abc", &fetcher(&source));

        assert_eq!(selection.focus_index(), 0);
        assert_eq!(selection.camera().target_x(), -2.0);
        let nav = selection.navigation(store.max_revealed_index());
        assert!(!nav.can_scroll_left);
        assert!(nav.can_scroll_right);
    }

    #[test]
    fn test_extreme_numeric_ids_do_not_overflow() {
        let source = FakeSource::new(Behavior::Png);
        let min_id = i32::MIN.to_string();
        let max_id = i32::MAX.to_string();
        let mut store = revealed_store(&[min_id.as_str(), max_id.as_str()]);
        let mut selection = controller();

        selection.select(&mut store, &min_id, &fetcher(&source));
        assert_eq!(selection.focus_index(), i32::MIN);
        assert!(selection.camera().target_x() < 0.0);
        assert!(!selection.navigation(store.max_revealed_index()).can_scroll_left);
        assert!(!selection.scroll_left());

        selection.select(&mut store, &max_id, &fetcher(&source));
        assert_eq!(selection.focus_index(), i32::MAX);
        assert!(selection.camera().target_x() > 0.0);
        assert!(!selection.scroll_right(store.max_revealed_index()));
    }

    #[test]
    fn test_scroll_stops_at_bounds() {
        let source = FakeSource::new(Behavior::Png);
        let mut store = revealed_store(&["1", "2", "3"]);
        let mut selection = controller();
        let max = store.max_revealed_index();

        selection.select(&mut store, "1", &fetcher(&source));
        assert!(!selection.scroll_left());
        assert_eq!(selection.focus_index(), 1);

        assert!(selection.scroll_right(max));
        assert!(selection.scroll_right(max));
        assert_eq!(selection.camera().target_x(), 4.0);
        assert!(!selection.scroll_right(max));
        assert_eq!(selection.focus_index(), 3);

        assert!(selection.scroll_left());
        assert_eq!(selection.focus_index(), 2);
    }

    #[test]
    fn test_scroll_keeps_selection() {
        let source = FakeSource::new(Behavior::Png);
        let mut store = revealed_store(&["1", "2"]);
        let mut selection = controller();

        selection.select(&mut store, "1", &fetcher(&source));
        selection.scroll_right(store.max_revealed_index());

        assert_eq!(selection.selected(), Some("1"));
        assert_eq!(selection.focus_index(), 2);
    }

    #[test]
    fn test_bounds_ignore_removed_entries() {
        let source = FakeSource::new(Behavior::Png);
        let mut store = revealed_store(&["1", "2", "3"]);
        let mut selection = controller();

        selection.select(&mut store, "2", &fetcher(&source));
        let nav = selection.navigation(store.max_revealed_index());
        assert!(nav.can_scroll_left);
        assert!(nav.can_scroll_right);

        store.remove("3");
        selection.forget("3");
        let nav = selection.navigation(store.max_revealed_index());
        assert!(nav.can_scroll_right);
        assert!(selection.scroll_right(store.max_revealed_index()));
        assert_eq!(selection.focus_index(), 3);
    }
}
