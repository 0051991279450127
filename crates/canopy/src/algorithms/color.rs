use image::RgbImage;

use crate::{
    error::{CanopyError, Result},
    types::{HsvImage, HUE_SCALE},
};

/// Convert one RGB pixel to `[hue, saturation, value]`.
///
/// Hue is halved to the `0..180` scale and truncated, saturation is rounded.
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = (max - min) as f32;

    let saturation = if max == 0 {
        0
    } else {
        (255.0 * delta / max as f32).round() as u8
    };

    let degrees = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g as f32 - b as f32) / delta
    } else if max == g {
        120.0 + 60.0 * (b as f32 - r as f32) / delta
    } else {
        240.0 + 60.0 * (r as f32 - g as f32) / delta
    };
    let degrees = if degrees < 0.0 { degrees + 360.0 } else { degrees };
    let hue = ((degrees / 2.0) as u8).min(HUE_SCALE - 1);

    [hue, saturation, max]
}

/// Convert an RGB image to HSV.
pub fn to_hsv(image: &RgbImage) -> Result<HsvImage> {
    ensure_non_empty(image)?;
    Ok(HsvImage::from_fn(image.width(), image.height(), |x, y| {
        rgb_to_hsv(image.get_pixel(x, y).0)
    }))
}

/// Wrap a row-major interleaved byte buffer as an RGB image.
pub fn rgb_image_from_raw(width: u32, height: u32, channels: u8, bytes: Vec<u8>) -> Result<RgbImage> {
    if channels != 3 {
        return Err(CanopyError::InvalidImageFormat(format!(
            "expected 3 channels, got {channels}"
        )));
    }
    if width == 0 || height == 0 {
        return Err(CanopyError::InvalidImageFormat(format!(
            "image has zero area ({width}x{height})"
        )));
    }

    let expected = width as usize * height as usize * 3;
    let found = bytes.len();
    let size_error = || {
        CanopyError::InvalidImageFormat(format!(
            "buffer holds {found} bytes, {width}x{height}x3 needs {expected}"
        ))
    };
    if found != expected {
        return Err(size_error());
    }
    RgbImage::from_raw(width, height, bytes).ok_or_else(size_error)
}

pub(crate) fn ensure_non_empty(image: &RgbImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CanopyError::InvalidImageFormat(format!(
            "image has zero area ({}x{})",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}
