use crate::error::ApiError;
use image::{DynamicImage, GrayImage, Luma};

/// BT.601 luma weights in 14-bit fixed point (0.299, 0.587, 0.114)
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;
const SHIFT: u32 = 14;

/// Convert image to single-channel BT.601 luma, dropping any alpha channel
pub fn apply(image: DynamicImage) -> Result<DynamicImage, ApiError> {
    let rgb = image.to_rgb8();
    let gray = GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (r as u32 * R_WEIGHT + g as u32 * G_WEIGHT + b as u32 * B_WEIGHT
            + (1 << (SHIFT - 1)))
            >> SHIFT;
        Luma([luma as u8])
    });
    Ok(DynamicImage::ImageLuma8(gray))
}
