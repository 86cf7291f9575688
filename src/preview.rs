//! Label previews rendered by the Labelary web service.
//!
//! Previews are advisory; a failing preview says nothing about the ZPL.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::{
    density::PrintDensity,
    error::{Error, Result},
    units::PhysicalSize,
};

pub const LABELARY_BASE: &str = "https://api.labelary.com/v1/printers";

/// Everything a browser's `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    zpl: String,
    size: PhysicalSize,
    density: PrintDensity,
}

impl PreviewRequest {
    pub fn new(zpl: impl Into<String>, size: PhysicalSize, density: PrintDensity) -> Self {
        PreviewRequest {
            zpl: zpl.into(),
            size,
            density,
        }
    }

    /// `<width>x<height>` in inches, as the service expects.
    fn dimensions(&self) -> String {
        let (width, height) = self.size.to_inches();
        format!("{}x{}", round2(width), round2(height))
    }

    fn endpoint(&self) -> Result<Url> {
        let mut url = Url::parse(LABELARY_BASE).map_err(|e| Error::Preview(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| Error::Preview("preview base URL cannot take a path".to_string()))?
            .push(&format!("{}dpmm", self.density.dpmm()))
            .push("labels")
            .push(&self.dimensions())
            .push("0");
        Ok(url)
    }

    /// GET URL that renders the first label of the document as PNG.
    ///
    /// The ZPL is escaped here rather than pushed as a path segment, since
    /// the URL parser drops raw newlines and tabs.
    pub fn url(&self) -> Result<Url> {
        let encoded = utf8_percent_encode(&self.zpl, URI_COMPONENT);
        Url::parse(&format!("{}/{}", self.endpoint()?, encoded))
            .map_err(|e| Error::Preview(e.to_string()))
    }

    /// POST the document and return the rendered PNG.
    #[cfg(feature = "http")]
    pub async fn fetch_png(&self) -> Result<Vec<u8>> {
        use reqwest::header::{ACCEPT, CONTENT_TYPE};

        let mut endpoint = self.endpoint()?;
        // the service wants a trailing slash when the ZPL is in the body
        endpoint
            .path_segments_mut()
            .map_err(|_| Error::Preview("preview base URL cannot take a path".to_string()))?
            .push("");
        log::debug!("requesting preview from {}", endpoint);

        let response = reqwest::Client::new()
            .post(endpoint)
            .header(ACCEPT, "image/png")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(self.zpl.clone())
            .send()
            .await
            .map_err(|e| Error::Preview(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Preview(format!("HTTP {}", response.status())));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Preview(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
