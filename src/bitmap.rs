//! Decoded raster images.

use std::io::Cursor;

use image::{
    imageops::{self, FilterType},
    DynamicImage, ImageBuffer, ImageReader, Rgb, Rgba,
};
use log::debug;

use crate::{
    error::{Error, Result},
    limits::Limits,
};

/// Pixel memory layout of a [`Bitmap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// 3 channels, 8-bit RGB.
    Rgb8,
    /// 4 channels, 8-bit RGBA.
    Rgba8,
}

impl PixelLayout {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// A decoded raster: row-major, top to bottom.
///
/// Immutable once built. Resizing produces a new bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl Bitmap {
    /// Wrap a raw channel buffer.
    ///
    /// `data` must hold exactly `width * height` pixels in `layout`.
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * layout.bytes_per_pixel();
        if data.len() != expected {
            return Err(Error::InvalidDimension(format!(
                "{}x{} {:?} needs {} bytes, got {}",
                width,
                height,
                layout,
                expected,
                data.len()
            )));
        }
        Ok(Bitmap {
            width,
            height,
            layout,
            data,
        })
    }

    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, PixelLayout::Rgba8, data)
    }

    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, PixelLayout::Rgb8, data)
    }

    /// A bitmap of one solid RGBA colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let data = rgba.iter().copied().cycle().take(pixels * 4).collect();
        Bitmap {
            width,
            height,
            layout: PixelLayout::Rgba8,
            data,
        }
    }

    /// Convert a decoded `image` buffer, keeping alpha only if it has one.
    pub fn from_image(image: &DynamicImage) -> Self {
        if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            Bitmap {
                width: rgba.width(),
                height: rgba.height(),
                layout: PixelLayout::Rgba8,
                data: rgba.into_raw(),
            }
        } else {
            let rgb = image.to_rgb8();
            Bitmap {
                width: rgb.width(),
                height: rgb.height(),
                layout: PixelLayout::Rgb8,
                data: rgb.into_raw(),
            }
        }
    }

    /// Decode an encoded image (PNG, JPEG, BMP, ...) from memory.
    ///
    /// The header is read first so `limits` can reject oversized sources
    /// before any pixel buffer is allocated.
    pub fn decode(bytes: &[u8], limits: &Limits) -> Result<Self> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| Error::DecodeFailure(e.to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| Error::DecodeFailure(e.to_string()))?;
        debug!("source image header: {}x{}", width, height);

        limits.check_source(width, height)?;

        let image =
            image::load_from_memory(bytes).map_err(|e| Error::DecodeFailure(e.to_string()))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::EmptyBitmap {
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self::from_image(&image))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Channel bytes of row `y`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * self.layout.bytes_per_pixel();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Resample to `width` x `height` with a bilinear filter.
    pub fn resize(&self, width: u32, height: u32) -> Result<Bitmap> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::EmptyBitmap {
                width: self.width,
                height: self.height,
            });
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension(format!(
                "cannot resize to {}x{}",
                width, height
            )));
        }
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }

        let data = match self.layout {
            PixelLayout::Rgba8 => {
                let src: ImageBuffer<Rgba<u8>, &[u8]> =
                    ImageBuffer::from_raw(self.width, self.height, &self.data[..])
                        .ok_or_else(|| Error::DecodeFailure("bitmap buffer too small".into()))?;
                imageops::resize(&src, width, height, FilterType::Triangle).into_raw()
            }
            PixelLayout::Rgb8 => {
                let src: ImageBuffer<Rgb<u8>, &[u8]> =
                    ImageBuffer::from_raw(self.width, self.height, &self.data[..])
                        .ok_or_else(|| Error::DecodeFailure("bitmap buffer too small".into()))?;
                imageops::resize(&src, width, height, FilterType::Triangle).into_raw()
            }
        };
        debug!(
            "resized bitmap {}x{} -> {}x{}",
            self.width, self.height, width, height
        );

        Ok(Bitmap {
            width,
            height,
            layout: self.layout,
            data,
        })
    }
}
