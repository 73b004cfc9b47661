//! Length conversion and picture sizing.

use slidefill_core::types::ASSUMED_ASPECT;
use slidefill_core::{Error, ImageLayout, Result};

/// English Metric Units per centimeter.
pub const EMU_PER_CM: f64 = 360_000.0;

/// EMU per pixel for images without resolution info (72 dpi).
pub const EMU_PER_PX: i64 = 12_700;

/// Convert centimeters to EMU, rounding to the nearest unit.
pub fn cm_to_emu(cm: f64) -> i64 {
    (cm * EMU_PER_CM).round() as i64
}

/// Convert EMU back to centimeters.
pub fn emu_to_cm(emu: i64) -> f64 {
    emu as f64 / EMU_PER_CM
}

/// Picture extent `(cx, cy)` in EMU.
///
/// Explicit dimensions win. A single dimension is completed from the
/// image's own ratio, or 4:3 when the image could not be probed. With no
/// dimensions the image's pixel size is used.
pub fn picture_extent(layout: &ImageLayout, native_px: Option<(u32, u32)>) -> Result<(i64, i64)> {
    let aspect = native_px
        .filter(|&(w, h)| w > 0 && h > 0)
        .map(|(w, h)| f64::from(w) / f64::from(h))
        .unwrap_or(ASSUMED_ASPECT);

    if let Some((width, height)) = layout.size_with_aspect(aspect) {
        return Ok((cm_to_emu(width), cm_to_emu(height)));
    }

    match native_px {
        Some((w, h)) if w > 0 && h > 0 => Ok((i64::from(w) * EMU_PER_PX, i64::from(h) * EMU_PER_PX)),
        _ => Err(Error::ImageError(format!(
            "cannot determine size of {}",
            layout.filename
        ))),
    }
}
