use crate::error::ApiError;
use image::{DynamicImage, GrayImage, Luma};

/// Intensities at or above this become white
pub const THRESHOLD: u8 = 127;

/// Fixed-level binarization
pub fn apply(image: DynamicImage) -> Result<DynamicImage, ApiError> {
    let gray = image.to_luma8();
    let binarized = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] >= THRESHOLD {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    Ok(DynamicImage::ImageLuma8(binarized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_binarizes_image() {
        let img = GrayImage::from_fn(50, 50, |x, _| Luma([(x as u8 * 5).min(255)]));

        let result = apply(DynamicImage::ImageLuma8(img)).unwrap();
        let result_gray = result.to_luma8();

        for pixel in result_gray.pixels() {
            assert!(
                pixel.0[0] == 0 || pixel.0[0] == 255,
                "Expected binary pixel, got {}",
                pixel.0[0]
            );
        }
    }

    #[test]
    fn test_threshold_boundary() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([126 + x as u8]));

        let result = apply(DynamicImage::ImageLuma8(img)).unwrap().to_luma8();

        assert_eq!(result.get_pixel(0, 0).0[0], 0); // 126
        assert_eq!(result.get_pixel(1, 0).0[0], 255); // 127
        assert_eq!(result.get_pixel(2, 0).0[0], 255); // 128
    }
}
