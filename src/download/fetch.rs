//! Fetch, validate and normalize a single image.
//!
//! The real format is sniffed from the bytes, never from the URL or the
//! response headers. WebP is converted to JPEG; anything that ends up
//! outside [`MIME_WHITELIST`] is rejected before a file is written.

use std::ffi::OsString;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use tracing::{debug, instrument};

use super::constants::JPEG_QUALITY;
use super::error::DownloadError;

/// MIME types that may be written to disk.
pub const MIME_WHITELIST: [&str; 5] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// MIME types that are converted to JPEG before validation.
pub const MIME_CONVERT_TO_JPEG: [&str; 1] = ["image/webp"];

/// Reported MIME type when the bytes match no known image signature.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// Something that can fetch the raw bytes behind an image URL.
///
/// [`HttpClient`](super::HttpClient) is the production implementation; the
/// trait exists so the downloader can be driven by other transports.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Returns the complete body for `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Format detected from an image's leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SniffedFormat {
    /// MIME type, e.g. `image/png`.
    pub mime: &'static str,
    /// Canonical file extension without the dot, e.g. `jpg`.
    pub extension: &'static str,
}

/// Detects the image format from magic bytes.
///
/// Returns `None` when the bytes do not start with any known image signature.
#[must_use]
pub fn sniff(bytes: &[u8]) -> Option<SniffedFormat> {
    let format = image::guess_format(bytes).ok()?;
    let extension = format.extensions_str().first().copied()?;
    Some(SniffedFormat {
        mime: format.to_mime_type(),
        extension,
    })
}

/// Re-encodes any decodable image as JPEG at [`JPEG_QUALITY`].
///
/// Animated input keeps only its first frame. This is CPU bound; async
/// callers should run it on a blocking thread.
///
/// # Errors
///
/// Returns the decoder or encoder error.
pub fn transcode_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let mut out = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder.encode(
        &rgb,
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(out.into_inner())
}

/// Converts and validates downloaded bytes.
///
/// Returns the bytes to write together with their (post-conversion) format.
///
/// # Errors
///
/// - [`DownloadError::Transcode`] if a WebP image cannot be converted.
/// - [`DownloadError::InvalidImageFormat`] if the final format is not
///   whitelisted.
pub async fn normalize_image(
    url: &str,
    bytes: Vec<u8>,
) -> Result<(Vec<u8>, SniffedFormat), DownloadError> {
    let mut bytes = bytes;
    let mut format = sniff(&bytes);

    if let Some(original) = format.filter(|f| MIME_CONVERT_TO_JPEG.contains(&f.mime)) {
        debug!(url, from = original.mime, "converting image to JPEG");
        let converted = tokio::task::spawn_blocking(move || transcode_to_jpeg(&bytes))
            .await
            .map_err(|e| DownloadError::TaskFailed {
                message: e.to_string(),
            })?
            .map_err(|source| DownloadError::Transcode {
                url: url.to_string(),
                source,
            })?;
        bytes = converted;
        format = sniff(&bytes);
    }

    match format {
        Some(format) if MIME_WHITELIST.contains(&format.mime) => Ok((bytes, format)),
        other => Err(DownloadError::invalid_image_format(
            url,
            other.map_or(UNKNOWN_MIME, |f| f.mime),
        )),
    }
}

/// Appends `.{extension}` to a path that has no extension of its own.
#[must_use]
pub fn path_with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Downloads one image and writes it to `destination` plus the sniffed extension.
///
/// `destination` is the full path without an extension, e.g.
/// `Series/chapter-5/3`. Nothing is written unless the image passes
/// validation. No retry happens here.
///
/// # Errors
///
/// Transport errors from `source`, the errors of [`normalize_image`], and
/// [`DownloadError::Io`] if the file cannot be written.
#[instrument(skip(source), fields(destination = %destination.display()))]
pub async fn fetch_image(
    source: &dyn ImageSource,
    url: &str,
    destination: &Path,
) -> Result<PathBuf, DownloadError> {
    let bytes = source.fetch(url).await?;
    let (bytes, format) = normalize_image(url, bytes).await?;

    let path = path_with_extension(destination, format.extension);
    tokio::fs::write(&path, &bytes)
        .await
        .map_err(|e| DownloadError::io(path.clone(), e))?;

    debug!(path = %path.display(), mime = format.mime, bytes = bytes.len(), "image saved");
    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{DynamicImage, ImageFormat, RgbImage};
    use tempfile::TempDir;

    use super::*;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 3, image::Rgb([200, 40, 90])));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    struct StaticSource(Vec<u8>);

    #[async_trait]
    impl ImageSource for StaticSource {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, DownloadError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_sniff_whitelisted_formats() {
        let cases = [
            (ImageFormat::Png, "image/png", "png"),
            (ImageFormat::Jpeg, "image/jpeg", "jpg"),
            (ImageFormat::Gif, "image/gif", "gif"),
            (ImageFormat::WebP, "image/webp", "webp"),
        ];
        for (format, mime, extension) in cases {
            let sniffed = sniff(&encoded(format)).unwrap();
            assert_eq!(sniffed, SniffedFormat { mime, extension }, "format: {format:?}");
        }
    }

    #[test]
    fn test_sniff_ignores_non_image_bytes() {
        assert_eq!(sniff(b"<html><body>not found</body></html>"), None);
        assert_eq!(sniff(b""), None);
    }

    #[test]
    fn test_transcode_produces_jpeg() {
        let jpeg = transcode_to_jpeg(&encoded(ImageFormat::WebP)).unwrap();
        assert_eq!(sniff(&jpeg).unwrap().mime, "image/jpeg");
    }

    #[tokio::test]
    async fn test_normalize_converts_webp_to_jpeg() {
        let (bytes, format) = normalize_image("https://img.example/1", encoded(ImageFormat::WebP))
            .await
            .unwrap();
        assert_eq!(format.mime, "image/jpeg");
        assert_eq!(format.extension, "jpg");
        assert_eq!(sniff(&bytes), Some(format));
    }

    #[tokio::test]
    async fn test_normalize_passes_png_through_unchanged() {
        let png = encoded(ImageFormat::Png);
        let (bytes, format) = normalize_image("https://img.example/1", png.clone())
            .await
            .unwrap();
        assert_eq!(bytes, png);
        assert_eq!(format.extension, "png");
    }

    #[tokio::test]
    async fn test_normalize_rejects_unknown_bytes() {
        let result = normalize_image("https://img.example/1", b"plain text".to_vec()).await;
        assert!(matches!(
            result,
            Err(DownloadError::InvalidImageFormat { ref mime, .. }) if mime == UNKNOWN_MIME
        ));
    }

    #[tokio::test]
    async fn test_normalize_rejects_recognized_but_unlisted_format() {
        let mut bmp = b"BM".to_vec();
        bmp.extend_from_slice(&[0u8; 64]);
        let result = normalize_image("https://img.example/1", bmp).await;
        assert!(matches!(
            result,
            Err(DownloadError::InvalidImageFormat { ref mime, .. }) if mime == "image/bmp"
        ));
    }

    #[tokio::test]
    async fn test_normalize_reports_broken_webp() {
        let mut fake = b"RIFF\x10\x00\x00\x00WEBPVP8 ".to_vec();
        fake.extend_from_slice(&[0u8; 8]);
        let result = normalize_image("https://img.example/1", fake).await;
        assert!(matches!(result, Err(DownloadError::Transcode { .. })));
    }

    #[test]
    fn test_path_with_extension_keeps_dots_in_base() {
        let path = path_with_extension(Path::new("/tmp/Vol. 1/cover"), "png");
        assert_eq!(path, PathBuf::from("/tmp/Vol. 1/cover.png"));
        let path = path_with_extension(Path::new("/tmp/v1.5/3"), "jpg");
        assert_eq!(path, PathBuf::from("/tmp/v1.5/3.jpg"));
    }

    #[tokio::test]
    async fn test_fetch_image_writes_file_with_sniffed_extension() {
        let dir = TempDir::new().unwrap();
        let source = StaticSource(encoded(ImageFormat::Gif));

        let path = fetch_image(&source, "https://img.example/1.jpg", &dir.path().join("1"))
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("1.gif"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_fetch_image_writes_nothing_on_invalid_format() {
        let dir = TempDir::new().unwrap();
        let source = StaticSource(b"not an image".to_vec());

        let result = fetch_image(&source, "https://img.example/1.png", &dir.path().join("1")).await;

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
