/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the download layer and the album state.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// Represents a single photo in the remote catalog
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Album the photo belongs to
    #[serde(deserialize_with = "string_or_number")]
    pub album_id: String,
    /// Identifier, also the 1-based position of the photo in the catalog
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    /// Full size image
    pub url: String,
    /// Small image shown on the entry card
    pub thumbnail_url: String,
}

impl CatalogRecord {
    /// URL to download for the entry card.
    /// Falls back to the full size URL when no thumbnail is provided.
    pub fn image_url(&self) -> &str {
        if self.thumbnail_url.trim().is_empty() {
            &self.url
        } else {
            &self.thumbnail_url
        }
    }

    /// Numeric position of this record, 0 when the id is not a number
    pub fn position(&self) -> i32 {
        self.id.trim().parse().unwrap_or(0)
    }
}

impl fmt::Display for CatalogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[AlbumEntry] Id: {} | Title: {} | Url: {}",
            self.id, self.title, self.url
        )
    }
}

/// The catalog endpoint serves ids as JSON numbers; keep them as opaque strings.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
pub(crate) fn record(id: &str) -> CatalogRecord {
    CatalogRecord {
        album_id: "1".to_string(),
        id: id.to_string(),
        title: format!("photo {}", id),
        url: format!("https://example.com/600/{}", id),
        thumbnail_url: format!("https://example.com/150/{}", id),
    }
}
