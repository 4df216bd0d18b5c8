/// State management module
///
/// This module handles all application state, including:
/// - Catalog records (data.rs)
/// - The revealed entries and the reveal cursor (catalog.rs)
/// - Per-entry image loading (entry.rs)
/// - Selection, focus and navigation bounds (selection.rs)
/// - The album coordinator tying them together (album.rs)
/// - The shared application context (context.rs)

pub mod album;
pub mod catalog;
pub mod context;
pub mod data;
pub mod entry;
pub mod selection;
