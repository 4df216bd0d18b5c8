use crate::config::Config;
use crate::download::thumbnail::{DecodedImage, ImageFetcher};

/// Edge length of the generated placeholder images
const PLACEHOLDER_SIZE: u32 = 150;

/// Shared application context, built once at startup and passed down
/// to whoever needs the config, the fetcher or the placeholder images.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub fetcher: ImageFetcher,
    pub loading_image: DecodedImage,
    pub error_image: DecodedImage,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let fetcher = ImageFetcher::http(config.image_timeout());
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: Config, fetcher: ImageFetcher) -> Self {
        Self {
            config,
            fetcher,
            loading_image: DecodedImage::solid(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, [90, 90, 90, 255]),
            error_image: DecodedImage::solid(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, [200, 40, 40, 255]),
        }
    }
}
