//! Zebra ZPL label rendering
//!
//! This crate turns bitmaps into `^GFA` graphic fields sized in physical
//! units, centres them on a label, and composes product labels with text,
//! barcodes and graphics.
//!
//! # Example
//!
//! ```rust
//! use zpl_label::{image_to_zpl, Bitmap, LabelConfig, Unit};
//!
//! let options = LabelConfig::new(1.0, Unit::Inch)
//!     .height(1.0)
//!     .target_dpi(203)
//!     .validate()
//!     .unwrap();
//! let bitmap = Bitmap::filled(100, 50, [0, 0, 0, 255]);
//! let zpl = image_to_zpl(&bitmap, &options).unwrap();
//! assert!(zpl.starts_with("^XA\n^PW203\n^LL203\n"));
//! ```

mod bitmap;
mod config;
mod density;
mod error;
mod fit;
mod graphic;
mod label;
mod limits;
mod loader;
mod media;
mod pipeline;
mod preview;
mod raster;
mod storage;
mod template;
mod units;

pub use crate::{
    bitmap::{Bitmap, PixelLayout},
    config::{
        LabelConfig, RenderOptions, CONFIG_VERSION, DEFAULT_SOURCE_DPI, DEFAULT_TARGET_DPI,
    },
    density::PrintDensity,
    error::{Error, Result},
    fit::{plan as plan_fit, FitPlan, TargetSize, OVERFLOW_TOLERANCE},
    graphic::{GraphicEncoding, GraphicField},
    label::{centered_x, centered_y, Field, LabelDocument, Origin},
    limits::Limits,
    loader::{load as load_bitmap, BitmapSource},
    media::LabelStock,
    pipeline::{graphic_field, image_to_zpl, source_to_zpl},
    preview::{PreviewRequest, LABELARY_BASE},
    raster::{pack as pack_monochrome, MonochromeBitstream, LUMINANCE_THRESHOLD},
    storage::{ImageStore, DEFAULT_PUBLIC_PREFIX},
    template::{CartonDimensions, LabelSide, ProductLabel, PRODUCT_LABEL_DPI},
    units::{
        inches_to_millimeters, millimeters_to_pixels, physical_to_dots, DotGrid, PhysicalSize,
        Unit, MM_PER_INCH,
    },
};

#[allow(deprecated)]
pub use crate::pipeline::image_to_zpl_unscaled;

/// Type alias for packed 1-bit raster rows.
///
/// Each inner `Vec<u8>` is one row of dots, 8 dots per byte with the
/// leftmost dot in the most significant bit. A row is padded with white
/// bits up to a whole byte.
pub type Matrix = Vec<Vec<u8>>;
