//! Product photo download.

use crate::error::FetchError;
use std::time::Duration;

/// Per-request timeout for photo downloads.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Downloads image bytes by URL.
///
/// Called from inside `spawn_blocking`, so implementations may block.
pub trait ImageFetcher: Send + Sync {
    /// Returns the raw body of `url`.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the request fails or the status is not 2xx.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP fetcher backed by `reqwest`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpImageFetcher;

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let http = |source: reqwest::Error| FetchError::Http {
            url: url.to_string(),
            source,
        };

        // The blocking client owns a runtime; build and drop it on this thread
        let client = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("jlcparts-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(http)?;

        let body = client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::bytes)
            .map_err(http)?;

        tracing::debug!(url, bytes = body.len(), "image fetched");
        Ok(body.to_vec())
    }
}

/// Maps an image URL to its MIME type by file extension.
///
/// Query strings and fragments are ignored; `jpg` maps to `image/jpeg`.
///
/// # Errors
///
/// Returns `FetchError::UnsupportedType` for any other extension.
///
/// # Examples
///
/// ```
/// use jlcparts_mcp::services::image_mime;
///
/// assert_eq!(image_mime("https://img.example/224.JPG?v=2").unwrap(), "image/jpeg");
/// assert!(image_mime("https://img.example/224.tiff").is_err());
/// ```
pub fn image_mime(url: &str) -> Result<&'static str, FetchError> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit('/').next().unwrap_or(path);
    let ext = file
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "gif" => Ok("image/gif"),
        "webp" => Ok("image/webp"),
        _ => Err(FetchError::UnsupportedType(url.to_string())),
    }
}
