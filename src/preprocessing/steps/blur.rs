use crate::error::ApiError;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

/// Gaussian sigma
pub const SIGMA: f32 = 1.0;

/// Taps on each side of the centre: `ceil(3 * sigma)`, so a 7-tap kernel at sigma 1
const RADIUS: u32 = 3;

/// Gaussian blur used as the low-pass half of the unsharp mask.
///
/// The image is padded by mirroring without repeating the edge pixel
/// (`dcb|abcd|cba`), filtered in f32 and rounded back to u8.
pub fn apply(image: DynamicImage) -> Result<DynamicImage, ApiError> {
    let gray = image.to_luma8();
    let (width, height) = gray.dimensions();

    let padded: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(width + 2 * RADIUS, height + 2 * RADIUS, |x, y| {
            let sx = mirror(x as i64 - RADIUS as i64, width);
            let sy = mirror(y as i64 - RADIUS as i64, height);
            Luma([gray.get_pixel(sx, sy).0[0] as f32])
        });

    let filtered = separable_filter_equal(&padded, &kernel());

    let blurred = GrayImage::from_fn(width, height, |x, y| {
        let value = filtered.get_pixel(x + RADIUS, y + RADIUS).0[0];
        Luma([value.round().clamp(0.0, 255.0) as u8])
    });

    Ok(DynamicImage::ImageLuma8(blurred))
}

/// Normalized 1-D Gaussian of `2 * RADIUS + 1` taps
fn kernel() -> Vec<f32> {
    let taps: Vec<f32> = (-(RADIUS as i32)..=RADIUS as i32)
        .map(|i| (-((i * i) as f32) / (2.0 * SIGMA * SIGMA)).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    taps.into_iter().map(|t| t / sum).collect()
}

/// Map an out-of-range coordinate back inside `0..len`
fn mirror(mut i: i64, len: u32) -> u32 {
    let len = len as i64;
    if len == 1 {
        return 0;
    }
    while i < 0 || i >= len {
        i = if i < 0 { -i } else { 2 * len - 2 - i };
    }
    i as u32
}
