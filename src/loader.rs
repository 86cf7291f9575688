//! Where bitmaps come from.
//!
//! Loading is the only asynchronous step. It completes, or fails with
//! `DecodeFailure`, before any scaling starts.

use std::{path::PathBuf, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;

use crate::{
    bitmap::Bitmap,
    error::{Error, Result},
    limits::Limits,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitmapSource {
    Path(PathBuf),
    /// `http` or `https` URL, fetched when the `http` feature is enabled.
    Url(String),
    /// Encoded image bytes.
    Memory(Vec<u8>),
}

impl FromStr for BitmapSource {
    type Err = Error;

    /// Accepts `data:<mime>;base64,<data>`, `http(s)://` URLs and file paths.
    fn from_str(s: &str) -> Result<Self> {
        if let Some(rest) = s.strip_prefix("data:") {
            let (header, data) = rest
                .split_once(',')
                .ok_or_else(|| Error::DecodeFailure("data URL has no payload".to_string()))?;
            if !header.ends_with(";base64") {
                return Err(Error::DecodeFailure(
                    "only base64 data URLs are supported".to_string(),
                ));
            }
            let bytes = STANDARD
                .decode(data.trim())
                .map_err(|e| Error::DecodeFailure(format!("invalid base64: {}", e)))?;
            Ok(Self::Memory(bytes))
        } else if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Self::Url(s.to_string()))
        } else {
            Ok(Self::Path(PathBuf::from(s)))
        }
    }
}

/// Fetch and decode `source`.
pub async fn load(source: BitmapSource, limits: &Limits) -> Result<Bitmap> {
    let bytes = match source {
        BitmapSource::Path(path) => {
            debug!("reading bitmap from {}", path.display());
            tokio::fs::read(&path)
                .await
                .map_err(|e| Error::DecodeFailure(format!("{}: {}", path.display(), e)))?
        }
        BitmapSource::Url(url) => fetch(&url).await?,
        BitmapSource::Memory(bytes) => bytes,
    };
    debug!("decoding {} bytes", bytes.len());

    let limits = limits.clone();
    tokio::task::spawn_blocking(move || Bitmap::decode(&bytes, &limits))
        .await
        .map_err(|e| Error::DecodeFailure(e.to_string()))?
}

#[cfg(feature = "http")]
async fn fetch(url: &str) -> Result<Vec<u8>> {
    debug!("fetching bitmap from {}", url);
    let response = reqwest::get(url)
        .await
        .map_err(|e| Error::DecodeFailure(format!("{}: {}", url, e)))?;
    if !response.status().is_success() {
        return Err(Error::DecodeFailure(format!(
            "{}: HTTP {}",
            url,
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| Error::DecodeFailure(format!("{}: {}", url, e)))?;
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "http"))]
async fn fetch(url: &str) -> Result<Vec<u8>> {
    Err(Error::DecodeFailure(format!(
        "cannot fetch {}: built without the `http` feature",
        url
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let image = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 255]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn parses_source_kinds() {
        assert_eq!(
            "https://example.com/a.png".parse::<BitmapSource>().unwrap(),
            BitmapSource::Url("https://example.com/a.png".to_string())
        );
        assert_eq!(
            "uploads/a.png".parse::<BitmapSource>().unwrap(),
            BitmapSource::Path(PathBuf::from("uploads/a.png"))
        );

        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes()));
        assert_eq!(
            data_url.parse::<BitmapSource>().unwrap(),
            BitmapSource::Memory(png_bytes())
        );
    }

    #[test]
    fn rejects_bad_data_urls() {
        assert!("data:image/png;base64".parse::<BitmapSource>().is_err());
        assert!("data:text/plain,hello".parse::<BitmapSource>().is_err());
        assert!("data:image/png;base64,@@@".parse::<BitmapSource>().is_err());
    }

    #[tokio::test]
    async fn loads_from_memory() {
        let bitmap = load(BitmapSource::Memory(png_bytes()), &Limits::default())
            .await
            .unwrap();
        assert_eq!((bitmap.width(), bitmap.height()), (3, 2));
    }

    #[tokio::test]
    async fn missing_file_is_a_decode_failure() {
        let source = BitmapSource::Path(PathBuf::from("/nonexistent/zpl-label/missing.png"));
        let err = load(source, &Limits::default()).await.unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));
    }

    #[tokio::test]
    async fn garbage_is_a_decode_failure() {
        let err = load(BitmapSource::Memory(vec![1, 2, 3]), &Limits::default())
            .await
            .unwrap_err();
        assert!(err.suggests_reupload());
    }

    #[cfg(not(feature = "http"))]
    #[tokio::test]
    async fn url_needs_http_feature() {
        let source = BitmapSource::Url("https://example.com/a.png".to_string());
        assert!(matches!(
            load(source, &Limits::default()).await,
            Err(Error::DecodeFailure(_))
        ));
    }
}
