//! Bitmap to ZPL, end to end.
//!
//! decode → fit → resample → threshold/pack → `^GFA` → label frame.

use log::{debug, info};

use crate::{
    bitmap::Bitmap,
    config::RenderOptions,
    error::{Error, Result},
    fit::{self, FitPlan},
    graphic::{GraphicEncoding, GraphicField},
    label::{Field, LabelDocument},
    loader::{self, BitmapSource},
    raster,
    units::DotGrid,
};

/// Fit `bitmap` onto the configured label and encode it as a graphic field
/// placed at the centring offset.
pub fn graphic_field(bitmap: &Bitmap, options: &RenderOptions) -> Result<(FitPlan, GraphicField)> {
    let plan = fit::plan(
        bitmap.width(),
        bitmap.height(),
        options.source_dpi(),
        options.target(),
        options.target_dpi(),
    )?;

    let total_bytes = raster::bytes_per_row(plan.scaled.width) as u64 * u64::from(plan.scaled.height);
    options.limits().check_graphic(total_bytes)?;

    let scaled = bitmap.resize(plan.scaled.width, plan.scaled.height)?;
    let bits = raster::pack(&scaled)?;
    let field = GraphicField::new(&bits, plan.offset_x, plan.offset_y, options.encoding())?;
    Ok((plan, field))
}

/// Render `bitmap` as a complete label, centred and letterboxed.
pub fn image_to_zpl(bitmap: &Bitmap, options: &RenderOptions) -> Result<String> {
    let (plan, field) = graphic_field(bitmap, options)?;
    let zpl = LabelDocument::new(plan.label)
        .force_utf8(options.force_utf8())
        .with_field(Field::Graphic(field))
        .render()?;
    info!(
        "emitted {} byte ZPL for a {}x{} dot label",
        zpl.len(),
        plan.label.width,
        plan.label.height
    );
    Ok(zpl)
}

/// Load `source`, then render it with [`image_to_zpl`].
///
/// The configured timeout bounds the load; the rest is bounded by the
/// configured limits.
pub async fn source_to_zpl(source: BitmapSource, options: &RenderOptions) -> Result<String> {
    let load = loader::load(source, options.limits());
    let bitmap = match options.timeout() {
        Some(timeout) => tokio::time::timeout(timeout, load)
            .await
            .map_err(|_| Error::Timeout(timeout.as_millis() as u64))??,
        None => load.await?,
    };
    debug!("loaded {}x{} bitmap", bitmap.width(), bitmap.height());
    image_to_zpl(&bitmap, options)
}

/// Render `bitmap` at its native pixel size at `^FO0,0`, one pixel per dot.
#[deprecated(note = "does not fit the image to the label; use `image_to_zpl`")]
pub fn image_to_zpl_unscaled(bitmap: &Bitmap, encoding: GraphicEncoding) -> Result<String> {
    let bits = raster::pack(bitmap)?;
    let field = GraphicField::new(&bits, 0, 0, encoding)?;
    LabelDocument::new(DotGrid::new(bitmap.width(), bitmap.height()))
        .with_field(Field::Graphic(field))
        .render()
}
