use crate::error::ApiError;
use image::{DynamicImage, GrayImage, Luma};

const GRAY_WEIGHT: f32 = 1.5;
const BLUR_WEIGHT: f32 = -0.5;

/// Unsharp mask: `1.5 * gray - 0.5 * blurred`, rounded half-to-even and saturated to u8
pub fn apply(image: DynamicImage, blurred: &DynamicImage) -> Result<DynamicImage, ApiError> {
    let gray = image.to_luma8();
    let blurred = blurred.to_luma8();

    if gray.dimensions() != blurred.dimensions() {
        return Err(ApiError::PreprocessingError(format!(
            "blurred image is {:?}, expected {:?}",
            blurred.dimensions(),
            gray.dimensions()
        )));
    }

    let sharpened = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let g = gray.get_pixel(x, y).0[0] as f32;
        let b = blurred.get_pixel(x, y).0[0] as f32;
        let value = (GRAY_WEIGHT * g + BLUR_WEIGHT * b)
            .round_ties_even()
            .clamp(0.0, 255.0);
        Luma([value as u8])
    });

    Ok(DynamicImage::ImageLuma8(sharpened))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharpen_weights() {
        let gray = GrayImage::from_pixel(2, 2, Luma([100]));
        let blurred = GrayImage::from_pixel(2, 2, Luma([60]));

        let result = apply(
            DynamicImage::ImageLuma8(gray),
            &DynamicImage::ImageLuma8(blurred),
        )
        .unwrap()
        .to_luma8();

        // 1.5 * 100 - 0.5 * 60 = 120
        assert_eq!(result.get_pixel(0, 0).0[0], 120);
    }

    #[test]
    fn test_sharpen_saturates() {
        let gray = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([250]) } else { Luma([10]) });
        let blurred = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([100]) } else { Luma([200]) });

        let result = apply(
            DynamicImage::ImageLuma8(gray),
            &DynamicImage::ImageLuma8(blurred),
        )
        .unwrap()
        .to_luma8();

        assert_eq!(result.get_pixel(0, 0).0[0], 255);
        assert_eq!(result.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn test_sharpen_rounds_half_to_even() {
        // 1.5 * 85 - 0.5 * 2 = 126.5 and 1.5 * 86 - 0.5 * 1 = 128.5
        let gray = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([85]) } else { Luma([86]) });
        let blurred = GrayImage::from_fn(2, 1, |x, _| if x == 0 { Luma([2]) } else { Luma([1]) });

        let result = apply(
            DynamicImage::ImageLuma8(gray),
            &DynamicImage::ImageLuma8(blurred),
        )
        .unwrap()
        .to_luma8();

        // Stays below the 127 threshold
        assert_eq!(result.get_pixel(0, 0).0[0], 126);
        assert_eq!(result.get_pixel(1, 0).0[0], 128);
    }

    #[test]
    fn test_sharpen_rejects_mismatched_sizes() {
        let result = apply(
            DynamicImage::ImageLuma8(GrayImage::new(4, 4)),
            &DynamicImage::ImageLuma8(GrayImage::new(2, 2)),
        );
        assert!(matches!(result, Err(ApiError::PreprocessingError(_))));
    }
}
