/// Network layer
///
/// This module handles:
/// - Downloading the photo catalog
/// - Downloading and decoding entry thumbnails

pub mod catalog;
pub mod thumbnail;
