/// Thumbnail download and decoding
///
/// The fetcher downloads raw bytes through an [`ImageSource`], applies a
/// fixed timeout, and decodes the bytes on a blocking thread. Failures are
/// logged and folded into an unsuccessful [`FetchResult`]; nothing is cached.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Default timeout for a single image download
pub const IMAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything that can go wrong while fetching one image
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(reqwest::StatusCode),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("decode task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A decoded RGBA8 image ready for display
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Solid colour image, used for the loading and error placeholders
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        Self::from(img)
    }

    /// Decode any format supported by the `image` crate
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from(img.to_rgba8()))
    }
}

impl From<image::RgbaImage> for DecodedImage {
    fn from(img: image::RgbaImage) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            pixels: img.into_raw(),
        }
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Outcome of a fetch: success carries the decoded image
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub success: bool,
    pub image: Option<DecodedImage>,
}

impl FetchResult {
    pub fn loaded(image: DecodedImage) -> Self {
        Self { success: true, image: Some(image) }
    }

    pub fn failed() -> Self {
        Self { success: false, image: None }
    }
}

/// Where image bytes come from
pub trait ImageSource: Send + Sync {
    fn get_bytes(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, FetchError>>;
}

/// Plain HTTP GET source
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl ImageSource for HttpSource {
    fn get_bytes(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, FetchError>> {
        let request = self.client.get(url);
        async move {
            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(FetchError::Status(response.status()));
            }
            Ok(response.bytes().await?.to_vec())
        }
        .boxed()
    }
}

/// Downloads and decodes images with a timeout
#[derive(Clone)]
pub struct ImageFetcher {
    source: Arc<dyn ImageSource>,
    timeout: Duration,
}

impl ImageFetcher {
    pub fn new(source: Arc<dyn ImageSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Fetcher backed by a fresh HTTP client
    pub fn http(timeout: Duration) -> Self {
        Self::new(Arc::new(HttpSource::default()), timeout)
    }

    /// Fetch and decode the image at `url`.
    ///
    /// Never fails: errors are logged and reported as `success == false`.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        match self.try_fetch(url).await {
            Ok(image) => FetchResult::loaded(image),
            Err(e) => {
                log::warn!("⚠️  Unable to load image {}: {}", url, e);
                FetchResult::failed()
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<DecodedImage, FetchError> {
        let bytes = tokio::time::timeout(self.timeout, self.source.get_bytes(url))
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;

        // Decoding is CPU-bound, keep it off the async workers
        let image = tokio::task::spawn_blocking(move || DecodedImage::decode(&bytes)).await??;
        Ok(image)
    }
}

impl std::fmt::Debug for ImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFetcher")
            .field("timeout", &self.timeout)
            .finish()
    }
}
