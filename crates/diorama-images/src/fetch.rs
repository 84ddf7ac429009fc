//! Byte fetching and decoding

use diorama_core::{DioramaError, Result};
use diorama_scene::SurfaceImage;
use std::io::Read;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Fetches the raw bytes behind a url
#[async_trait::async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP client run on the blocking thread pool.
///
/// When a proxy base is set, requests go to `proxy_base + percent-encoded url`
/// instead of the url itself.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
    proxy_base: Option<String>,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            proxy_base: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy_base: Option<String>) -> Self {
        self.proxy_base = proxy_base.filter(|p| !p.trim().is_empty());
        self
    }

    /// The url actually requested for `url`
    pub fn request_url(&self, url: &str) -> String {
        match &self.proxy_base {
            Some(base) => format!("{}{}", base, urlencoding::encode(url)),
            None => url.to_string(),
        }
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    config.into()
}

fn download(url: &str, timeout: Duration) -> std::result::Result<Vec<u8>, String> {
    let response = build_agent(timeout).get(url).call().map_err(|e| e.to_string())?;
    let mut reader = response.into_body().into_reader();
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| format!("failed to read body: {}", e))?;
    Ok(bytes)
}

#[async_trait::async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let request_url = self.request_url(url);
        let timeout = self.timeout;
        let fetch_error = |reason: String| DioramaError::FetchError {
            url: url.to_string(),
            reason,
        };

        tokio::task::spawn_blocking(move || download(&request_url, timeout))
            .await
            .map_err(|e| fetch_error(e.to_string()))?
            .map_err(fetch_error)
    }
}

/// Decode any supported image format into RGBA8
pub fn decode_image(bytes: &[u8]) -> Result<SurfaceImage> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| DioramaError::DecodeError(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(SurfaceImage::new(width, height, rgba.into_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let image = decode_image(&png(3, 2)).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.pixels.len(), 3 * 2 * 4);
        assert_eq!(&image.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_image(b"definitely not an image"),
            Err(DioramaError::DecodeError(_))
        ));
    }

    #[test]
    fn test_request_url_with_proxy() {
        let direct = HttpFetcher::new();
        assert_eq!(direct.request_url("https://a.org/x.png"), "https://a.org/x.png");

        let proxied = HttpFetcher::new().with_proxy(Some("https://proxy.example/img?url=".into()));
        assert_eq!(
            proxied.request_url("https://a.org/x y.png?s=1"),
            "https://proxy.example/img?url=https%3A%2F%2Fa.org%2Fx%20y.png%3Fs%3D1"
        );

        let blank = HttpFetcher::new().with_proxy(Some("  ".into()));
        assert_eq!(blank.request_url("u"), "u");
    }
}
