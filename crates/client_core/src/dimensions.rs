//! Print size of a source image, used to prefill width and height.

use std::{fs::File, io::BufReader, path::Path};

use shared::error::VectorizeError;
use tracing::debug;

pub const DEFAULT_IMAGE_DPI: f64 = 96.0;
const CM_PER_INCH: f64 = 2.54;
const INCHES_PER_METER: f64 = 1.0 / 0.0254;

/// Centimeters per axis, rounded to two decimals.
pub fn size_cm(pixels: (u32, u32), dpi: (f64, f64)) -> (f64, f64) {
    let to_cm = |px: u32, dpi: f64| {
        let dpi = if dpi > 0.0 { dpi } else { DEFAULT_IMAGE_DPI };
        ((px as f64 / dpi * CM_PER_INCH) * 100.0).round() / 100.0
    };
    (to_cm(pixels.0, dpi.0), to_cm(pixels.1, dpi.1))
}

/// Resolution stored in a PNG `pHYs` chunk, if the file has one in meters.
pub fn embedded_dpi(path: &Path) -> Option<(f64, f64)> {
    let file = File::open(path).ok()?;
    let reader = png::Decoder::new(BufReader::new(file)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    if dims.unit != png::Unit::Meter || dims.xppu == 0 || dims.yppu == 0 {
        return None;
    }
    Some((
        dims.xppu as f64 / INCHES_PER_METER,
        dims.yppu as f64 / INCHES_PER_METER,
    ))
}

/// Width and height in cm of a raster image, using its stored DPI or 96.
pub fn physical_size(path: &Path) -> Result<(f64, f64), VectorizeError> {
    let pixels = image::image_dimensions(path).map_err(|err| {
        VectorizeError::filesystem(
            format!("failed to read image size of {}: {err}", path.display()),
            Some(path.to_path_buf()),
        )
    })?;
    let dpi = embedded_dpi(path).unwrap_or((DEFAULT_IMAGE_DPI, DEFAULT_IMAGE_DPI));
    let size = size_cm(pixels, dpi);
    debug!(
        path = %path.display(),
        width_px = pixels.0,
        height_px = pixels.1,
        dpi_x = dpi.0,
        dpi_y = dpi.1,
        "computed image size"
    );
    Ok(size)
}
