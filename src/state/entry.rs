/// Album entries and their image load state machine
///
/// Each entry moves through `None -> Loading -> Loaded | Failed`. A load
/// request while `Loading` or `Loaded` is ignored, so an entry never has
/// more than one fetch in flight. Fetch completions carry the generation
/// they were started with and are dropped if the entry moved on or was
/// disposed in the meantime.

use crate::download::thumbnail::{DecodedImage, FetchResult, ImageFetcher};
use super::data::CatalogRecord;
use tokio::sync::mpsc::UnboundedSender;

pub type EntryId = String;

/// Notifications an entry sends to whoever created it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryEvent {
    Clicked(EntryId),
}

pub type EventSender = UnboundedSender<EntryEvent>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    None,
    Loading,
    Loaded,
    Failed,
}

/// What the entry currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Texture {
    /// Nothing assigned yet
    Blank,
    /// Loading placeholder
    Loading,
    /// The entry's own downloaded image
    Image,
    /// Error placeholder
    Error,
}

/// Light used to highlight an entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: [u8; 3],
    pub intensity: f32,
}

impl Light {
    pub const DEFAULT: Light = Light { color: [255, 128, 0], intensity: 10.0 };
    pub const SELECTED: Light = Light { color: [255, 255, 255], intensity: 30.0 };
}

/// Presentation side of an entry. Gone once the entry is disposed.
#[derive(Debug, Clone, PartialEq)]
struct Visual {
    texture: Texture,
    light: Light,
    /// Number of texture assignments so far
    texture_writes: u32,
}

impl Visual {
    fn set_texture(&mut self, texture: Texture) {
        self.texture = texture;
        self.texture_writes += 1;
    }
}

/// Identifies one load attempt of one entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub entry: EntryId,
    pub generation: u64,
}

/// A started but not yet awaited image fetch
#[derive(Debug)]
pub struct PendingLoad {
    ticket: LoadTicket,
    url: String,
    fetcher: ImageFetcher,
}

impl PendingLoad {
    pub fn ticket(&self) -> &LoadTicket {
        &self.ticket
    }

    /// Run the fetch. The completion must be handed back to the owning entry.
    pub async fn run(self) -> LoadCompletion {
        let result = self.fetcher.fetch(&self.url).await;
        LoadCompletion { ticket: self.ticket, result }
    }
}

/// Result of a finished fetch, routed back to its entry
#[derive(Debug, Clone)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub result: FetchResult,
}

/// A catalog record revealed as an interactive entry
#[derive(Debug)]
pub struct EntryHandle {
    record: CatalogRecord,
    /// 1-based reveal order, fixes the entry's place on the strip
    slot: usize,
    state: LoadState,
    image: Option<DecodedImage>,
    selected: bool,
    generation: u64,
    visual: Option<Visual>,
    events: EventSender,
}

impl EntryHandle {
    pub fn new(record: CatalogRecord, slot: usize, events: EventSender) -> Self {
        Self {
            record,
            slot,
            state: LoadState::None,
            image: None,
            selected: false,
            generation: 0,
            visual: Some(Visual {
                texture: Texture::Blank,
                light: Light::DEFAULT,
                texture_writes: 0,
            }),
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn record(&self) -> &CatalogRecord {
        &self.record
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_disposed(&self) -> bool {
        self.visual.is_none()
    }

    /// Current texture, `None` once disposed
    pub fn texture(&self) -> Option<Texture> {
        self.visual.as_ref().map(|v| v.texture)
    }

    pub fn light(&self) -> Option<Light> {
        self.visual.as_ref().map(|v| v.light)
    }

    pub fn texture_writes(&self) -> u32 {
        self.visual.as_ref().map_or(0, |v| v.texture_writes)
    }

    /// Start loading the entry image.
    ///
    /// Returns `None` without touching anything when a load is already in
    /// flight or done, or when the entry is disposed.
    pub fn request_load(&mut self, fetcher: &ImageFetcher) -> Option<PendingLoad> {
        if matches!(self.state, LoadState::Loading | LoadState::Loaded) {
            return None;
        }
        let visual = self.visual.as_mut()?;

        self.state = LoadState::Loading;
        self.generation += 1;
        visual.set_texture(Texture::Loading);

        Some(PendingLoad {
            ticket: LoadTicket {
                entry: self.record.id.clone(),
                generation: self.generation,
            },
            url: self.record.image_url().to_string(),
            fetcher: fetcher.clone(),
        })
    }

    /// Apply a finished fetch. Returns false if the completion was stale.
    pub fn complete(&mut self, completion: LoadCompletion) -> bool {
        if completion.ticket.generation != self.generation || self.state != LoadState::Loading {
            log::debug!("Dropping stale load result for entry {}", self.record.id);
            return false;
        }
        let Some(visual) = self.visual.as_mut() else {
            return false;
        };

        match completion.result.image {
            Some(image) if completion.result.success => {
                self.image = Some(image);
                self.state = LoadState::Loaded;
                visual.set_texture(Texture::Image);
            }
            _ => {
                self.image = None;
                self.state = LoadState::Failed;
                visual.set_texture(Texture::Error);
            }
        }
        true
    }

    pub fn select(&mut self) {
        self.selected = true;
        if let Some(visual) = self.visual.as_mut() {
            visual.light = Light::SELECTED;
        }
    }

    pub fn deselect(&mut self) {
        self.selected = false;
        if let Some(visual) = self.visual.as_mut() {
            visual.light = Light::DEFAULT;
        }
    }

    /// Report a click to the entry's owner
    pub fn click(&self) {
        if self.events.send(EntryEvent::Clicked(self.record.id.clone())).is_err() {
            log::debug!("Click on entry {} ignored, nobody listening", self.record.id);
        }
    }

    /// Release the image and tear down the visual. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.image = None;
        self.visual = None;
        self.generation += 1;
    }
}

impl std::fmt::Display for EntryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.record, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::thumbnail::testing::{fetcher, Behavior, FakeSource};
    use crate::state::data::record;
    use tokio::sync::mpsc;

    fn entry(id: &str) -> (EntryHandle, mpsc::UnboundedReceiver<EntryEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (EntryHandle::new(record(id), 1, tx), rx)
    }

    #[tokio::test]
    async fn test_second_request_while_loading_is_noop() {
        let source = FakeSource::new(Behavior::Png);
        let fetcher = fetcher(&source);
        let (mut entry, _rx) = entry("1");

        let first = entry.request_load(&fetcher).expect("first request starts a load");
        assert!(entry.request_load(&fetcher).is_none());
        assert_eq!(entry.texture_writes(), 1);

        let completion = first.run().await;
        assert!(entry.complete(completion));
        assert_eq!(source.calls(), 1);
        assert_eq!(entry.state(), LoadState::Loaded);
        assert_eq!(entry.texture(), Some(Texture::Image));
        assert!(entry.image().is_some());

        assert!(entry.request_load(&fetcher).is_none());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_can_be_retried() {
        let bad = FakeSource::new(Behavior::Garbage);
        let good = FakeSource::new(Behavior::Png);
        let (mut entry, _rx) = entry("1");

        let pending = entry.request_load(&fetcher(&bad)).unwrap();
        entry.complete(pending.run().await);
        assert_eq!(entry.state(), LoadState::Failed);
        assert_eq!(entry.texture(), Some(Texture::Error));
        assert!(entry.image().is_none());

        let retry = entry.request_load(&fetcher(&good)).expect("failed entries retry");
        assert_eq!(entry.texture(), Some(Texture::Loading));
        entry.complete(retry.run().await);
        assert_eq!(entry.state(), LoadState::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_applies_error_placeholder_once() {
        let source = FakeSource::new(Behavior::Hang);
        let (mut entry, _rx) = entry("1");

        let pending = entry.request_load(&fetcher(&source)).unwrap();
        let completion = pending.run().await;

        assert!(entry.complete(completion.clone()));
        assert_eq!(entry.state(), LoadState::Failed);
        assert_eq!(entry.texture(), Some(Texture::Error));
        // loading placeholder, then error placeholder
        assert_eq!(entry.texture_writes(), 2);

        assert!(!entry.complete(completion));
        assert_eq!(entry.texture_writes(), 2);
    }

    #[tokio::test]
    async fn test_completion_after_dispose_is_dropped() {
        let source = FakeSource::new(Behavior::Png);
        let (mut entry, _rx) = entry("1");

        let pending = entry.request_load(&fetcher(&source)).unwrap();
        entry.dispose();
        entry.dispose();

        assert!(!entry.complete(pending.run().await));
        assert!(entry.image().is_none());
        assert!(entry.is_disposed());
        assert_eq!(entry.texture(), None);
        assert!(entry.request_load(&fetcher(&source)).is_none());
    }

    #[tokio::test]
    async fn test_out_of_order_completion_is_stale() {
        let bad = FakeSource::new(Behavior::Garbage);
        let good = FakeSource::new(Behavior::Png);
        let (mut entry, _rx) = entry("1");

        let first = entry.request_load(&fetcher(&bad)).unwrap();
        let first_done = first.run().await;
        entry.complete(first_done.clone());

        let second = entry.request_load(&fetcher(&good)).unwrap();
        assert_ne!(second.ticket().generation, first_done.ticket.generation);
        // the old failure must not overwrite the newer load
        assert!(!entry.complete(first_done));
        assert_eq!(entry.state(), LoadState::Loading);

        entry.complete(second.run().await);
        assert_eq!(entry.state(), LoadState::Loaded);
    }

    #[test]
    fn test_selection_light() {
        let (mut entry, _rx) = entry("1");
        assert_eq!(entry.light(), Some(Light::DEFAULT));

        entry.select();
        assert!(entry.is_selected());
        assert_eq!(entry.light(), Some(Light::SELECTED));

        entry.deselect();
        assert_eq!(entry.light(), Some(Light::DEFAULT));
    }

    #[test]
    fn test_click_is_sent_to_owner() {
        let (entry, mut rx) = entry("4");
        entry.click();
        assert_eq!(rx.try_recv().unwrap(), EntryEvent::Clicked("4".to_string()));
    }
}
