use iced::widget::image::{Handle, Image};
use iced::widget::{button, column, container, row, text, Row};
use iced::time::Instant;
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use std::collections::HashMap;
use std::time::Duration;

mod camera;
mod config;
mod download;
mod state;

use config::Config;
use download::thumbnail::DecodedImage;
use state::album::Album;
use state::context::AppContext;
use state::data::CatalogRecord;
use state::entry::{EntryHandle, LoadCompletion, PendingLoad, Texture};

/// Main application state
struct AlbumViewer {
    /// Catalog, entries, selection and camera
    album: Album,
    loading_handle: Handle,
    error_handle: Handle,
    /// GPU handles of the loaded entry images, keyed by entry id
    handles: HashMap<String, Handle>,
    last_tick: Option<Instant>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Startup catalog download finished (empty on failure)
    CatalogLoaded(Vec<CatalogRecord>),
    Add,
    Remove,
    ScrollLeft,
    ScrollRight,
    LogEntries,
    /// User clicked an entry card
    EntryClicked(String),
    /// Background image fetch finished
    ImageLoaded(LoadCompletion),
    /// Camera animation frame
    Tick(Instant),
}

impl AlbumViewer {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = Config::load();
        let catalog_url = config.catalog_url.clone();
        let ctx = AppContext::new(config);

        let viewer = AlbumViewer {
            loading_handle: to_handle(&ctx.loading_image),
            error_handle: to_handle(&ctx.error_image),
            album: Album::new(ctx),
            handles: HashMap::new(),
            last_tick: None,
            status: "Downloading catalog...".to_string(),
        };

        (
            viewer,
            Task::perform(download::catalog::fetch_catalog(catalog_url), Message::CatalogLoaded),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::CatalogLoaded(records) => {
                self.album.load_catalog(records);
                let store = self.album.store();
                self.status = match store.loaded_at() {
                    Some(at) if store.record_count() > 0 => format!(
                        "Catalog of {} photos loaded at {}.",
                        store.record_count(),
                        at.format("%H:%M:%S")
                    ),
                    _ => "Catalog unavailable.".to_string(),
                };
                Task::none()
            }
            Message::Add => spawn_loads(self.album.add_entry()),
            Message::Remove => {
                self.album.remove_selected();
                self.sync_handles();
                Task::none()
            }
            Message::ScrollLeft => {
                self.album.scroll_left();
                Task::none()
            }
            Message::ScrollRight => {
                self.album.scroll_right();
                Task::none()
            }
            Message::LogEntries => {
                let lines = self.album.log_entries();
                self.status = format!("Logged {} active entries.", lines.len());
                Task::none()
            }
            Message::EntryClicked(id) => {
                self.album.click(&id);
                spawn_loads(self.album.process_events())
            }
            Message::ImageLoaded(completion) => {
                if self.album.apply_completion(completion) {
                    self.sync_handles();
                }
                Task::none()
            }
            Message::Tick(now) => {
                let dt = self
                    .last_tick
                    .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
                let camera = self.album.camera_mut();
                camera.tick(dt);
                self.last_tick = camera.is_animating().then_some(now);
                Task::none()
            }
        }
    }

    /// Keep one image handle per loaded entry, drop the rest
    fn sync_handles(&mut self) {
        let store = self.album.store();
        self.handles
            .retain(|id, _| store.get(id).is_some_and(|e| e.image().is_some()));

        for entry in store.entries() {
            if let Some(image) = entry.image() {
                self.handles
                    .entry(entry.id().to_string())
                    .or_insert_with(|| to_handle(image));
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let actions = self.album.actions();

        let controls = row![
            button("Add").on_press_maybe(actions.add.then_some(Message::Add)),
            button("Remove").on_press_maybe(actions.remove.then_some(Message::Remove)),
            button("<").on_press_maybe(actions.scroll_left.then_some(Message::ScrollLeft)),
            button(">").on_press_maybe(actions.scroll_right.then_some(Message::ScrollRight)),
            button("Log").on_press_maybe(actions.log.then_some(Message::LogEntries)),
        ]
        .spacing(10);

        // Only entries near the camera are on screen
        let selection = self.album.selection();
        let config = &self.album.context().config;
        let camera_x = selection.camera().position().x;
        let reach = config.visible_radius as f32 * config.spacing_unit + config.spacing_unit / 2.0;

        let strip = self
            .album
            .store()
            .entries()
            .into_iter()
            .filter(|e| (selection.position_of(e.slot() as i32) - camera_x).abs() <= reach)
            .fold(Row::new().spacing(16), |strip, entry| strip.push(self.entry_card(entry)));

        let content = column![
            text("Album Viewer").size(40),
            controls,
            container(strip).height(Length::Fixed(180.0)),
            text(format!(
                "Focus {} | Camera x {:.2}",
                selection.focus_index(),
                camera_x
            ))
            .size(14),
            text(&self.status).size(16),
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn entry_card<'a>(&'a self, entry: &'a EntryHandle) -> Element<'a, Message> {
        let handle = match entry.texture() {
            Some(Texture::Image) => self
                .handles
                .get(entry.id())
                .unwrap_or(&self.loading_handle)
                .clone(),
            Some(Texture::Error) => self.error_handle.clone(),
            _ => self.loading_handle.clone(),
        };

        let style: fn(&Theme, button::Status) -> button::Style = if entry.is_selected() {
            button::primary
        } else {
            button::secondary
        };

        button(
            column![
                Image::new(handle)
                    .width(Length::Fixed(120.0))
                    .height(Length::Fixed(120.0)),
                text(entry.record().title.as_str()).size(12),
            ]
            .spacing(6)
            .width(Length::Fixed(140.0)),
        )
        .style(style)
        .on_press(Message::EntryClicked(entry.id().to_string()))
        .into()
    }

    /// Drive the camera only while it is moving
    fn subscription(&self) -> Subscription<Message> {
        if self.album.selection().camera().is_animating() {
            iced::time::every(Duration::from_millis(16)).map(Message::Tick)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Run fetches as background tasks, each reporting back with `ImageLoaded`
fn spawn_loads(loads: impl IntoIterator<Item = PendingLoad>) -> Task<Message> {
    Task::batch(
        loads
            .into_iter()
            .map(|load| Task::perform(load.run(), Message::ImageLoaded)),
    )
}

fn to_handle(image: &DecodedImage) -> Handle {
    Handle::from_rgba(image.width, image.height, image.pixels.clone())
}

fn main() -> iced::Result {
    env_logger::init();

    iced::application("Album Viewer", AlbumViewer::update, AlbumViewer::view)
        .subscription(AlbumViewer::subscription)
        .theme(AlbumViewer::theme)
        .centered()
        .run_with(AlbumViewer::new)
}
