use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Resource limits for a single label generation.
///
/// `None` disables a limit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum source pixel count (width * height), checked from the image
    /// header before the pixels are decoded.
    pub max_source_pixels: Option<u64>,
    /// Maximum uncompressed `^GFA` byte count.
    pub max_graphic_bytes: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_source_pixels: Some(40_000_000),
            max_graphic_bytes: Some(4 * 1024 * 1024),
        }
    }
}

impl Limits {
    pub fn unlimited() -> Self {
        Limits {
            max_source_pixels: None,
            max_graphic_bytes: None,
        }
    }

    pub(crate) fn check_source(&self, width: u32, height: u32) -> Result<()> {
        if let Some(max_px) = self.max_source_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max_px {
                return Err(Error::LimitExceeded(format!(
                    "source pixel count {} ({}x{}) exceeds limit {}",
                    pixels, width, height, max_px
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn check_graphic(&self, total_bytes: u64) -> Result<()> {
        if let Some(max_bytes) = self.max_graphic_bytes {
            if total_bytes > max_bytes {
                return Err(Error::LimitExceeded(format!(
                    "graphic field of {} bytes exceeds limit {}",
                    total_bytes, max_bytes
                )));
            }
        }
        Ok(())
    }
}
