use image::{GrayImage, Luma};
use imageproc::contrast::ThresholdType;

use crate::{DetectionOptions, Error, Mask, SpotCropResult};

// Fixed kernels used for small sizes when sigma is derived from the kernel size.
const SMALL_GAUSSIAN_KERNELS: [&[f64]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[
        0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
    ],
];

/// Returns a normalized 1-D Gaussian kernel of `size` taps.
///
/// When `sigma` is not positive it is derived from the kernel size as
/// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`, and for sizes up to 7 a fixed binomial
/// kernel is returned instead.
///
/// `size` must be odd.
pub fn gaussian_kernel(size: u32, sigma: f64) -> SpotCropResult<Vec<f64>> {
    if size % 2 == 0 {
        return Err(Error::InvalidOptions(format!(
            "blur kernel size must be odd, got {size}"
        )));
    }

    if sigma <= 0.0 && size <= 7 {
        return Ok(SMALL_GAUSSIAN_KERNELS[(size / 2) as usize].to_vec());
    }

    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((f64::from(size) - 1.0) * 0.5 - 1.0) + 0.8
    };

    let radius = f64::from(size / 2);
    let scale = -0.5 / (sigma * sigma);
    let raw = (0..size)
        .map(|i| {
            let x = f64::from(i) - radius;
            (scale * x * x).exp()
        })
        .collect::<Vec<_>>();

    let sum: f64 = raw.iter().sum();
    Ok(raw.into_iter().map(|w| w / sum).collect())
}

// Maps an out-of-range index back into 0..len by mirroring about the edge pixels,
// without repeating them (gfedcb|abcdefgh|gfedcba).
fn reflect_101(mut idx: i64, len: i64) -> usize {
    if len == 1 {
        return 0;
    }
    loop {
        if idx < 0 {
            idx = -idx;
        } else if idx >= len {
            idx = 2 * (len - 1) - idx;
        } else {
            return idx as usize;
        }
    }
}

/// Converts an intensity image into a [`Mask`] of dark pixels.
///
/// The image is first smoothed with a separable Gaussian kernel, then every pixel whose smoothed
/// intensity is strictly below the threshold becomes foreground.
#[derive(Debug, Clone)]
pub struct Binarizer {
    kernel: Vec<f64>,
    threshold: u8,
}

impl Binarizer {
    pub fn from_options(opts: &DetectionOptions) -> SpotCropResult<Self> {
        opts.validate()?;
        Ok(Self {
            kernel: gaussian_kernel(opts.blur_kernel_size, opts.blur_sigma)?,
            threshold: opts.threshold,
        })
    }

    /// Smooth the image, rounding each result to the nearest intensity.
    pub fn smooth(&self, img: &GrayImage) -> GrayImage {
        let (width, height) = img.dimensions();
        let (w, h) = (i64::from(width), i64::from(height));
        let radius = (self.kernel.len() / 2) as i64;

        //horizontal pass
        let mut horiz = vec![0f64; (width as usize) * (height as usize)];
        for y in 0..height {
            for x in 0..i64::from(width) {
                let acc = self
                    .kernel
                    .iter()
                    .enumerate()
                    .map(|(k, weight)| {
                        let src_x = reflect_101(x + k as i64 - radius, w) as u32;
                        let Luma([pix]) = img.get_pixel(src_x, y);
                        weight * f64::from(*pix)
                    })
                    .sum::<f64>();
                horiz[(y as usize) * (width as usize) + x as usize] = acc;
            }
        }

        //vertical pass
        GrayImage::from_fn(width, height, |x, y| {
            let acc = self
                .kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let src_y = reflect_101(i64::from(y) + k as i64 - radius, h);
                    weight * horiz[src_y * (width as usize) + x as usize]
                })
                .sum::<f64>();
            Luma([acc.round().clamp(0.0, 255.0) as u8])
        })
    }

    /// Produce the foreground mask for an intensity image.
    pub fn binarize(&self, img: &GrayImage) -> SpotCropResult<Mask> {
        if img.width() == 0 || img.height() == 0 {
            return Err(Error::invalid_image(
                "intensity image",
                format!("image has no pixels ({}x{})", img.width(), img.height()),
            ));
        }

        let smoothed = self.smooth(img);

        // Foreground is `smoothed < threshold`, and the inverted threshold marks `pix <= t`.
        let Some(cutoff) = self.threshold.checked_sub(1) else {
            return Ok(Mask::new(img.width(), img.height()));
        };
        let bin = imageproc::contrast::threshold(&smoothed, cutoff, ThresholdType::BinaryInverted);

        Ok(Mask::from_image(bin))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn is_foreground(mask: &Mask, x: u32, y: u32) -> bool {
        *mask.as_image().get_pixel(x, y) == Mask::FOREGROUND
    }

    fn binarizer(threshold: u8) -> Binarizer {
        let opts = DetectionOptions {
            threshold,
            ..Default::default()
        };
        Binarizer::from_options(&opts).unwrap()
    }

    #[test]
    fn test_default_kernel_is_binomial() {
        let k = gaussian_kernel(5, 0.0).unwrap();
        assert_eq!(k, vec![0.0625, 0.25, 0.375, 0.25, 0.0625]);
    }

    #[test]
    fn test_large_kernel_is_normalized_and_symmetric() {
        let k = gaussian_kernel(9, 0.0).unwrap();
        assert_eq!(k.len(), 9);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        for i in 0..4 {
            assert!((k[i] - k[8 - i]).abs() < 1e-12);
            assert!(k[i] < k[i + 1]);
        }

        let k = gaussian_kernel(5, 2.0).unwrap();
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_ne!(k, gaussian_kernel(5, 0.0).unwrap());
    }

    #[test]
    fn test_even_kernel_size_is_an_error() {
        for size in [0, 2, 8] {
            assert!(matches!(
                gaussian_kernel(size, 0.0),
                Err(Error::InvalidOptions(_))
            ));
        }
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(-2, 1), 0);
        assert_eq!(reflect_101(-2, 2), 0);
    }

    #[test]
    fn test_smoothing_preserves_flat_image() {
        let img = GrayImage::from_pixel(7, 3, Luma([123]));
        let smoothed = binarizer(80).smooth(&img);
        assert!(smoothed.pixels().all(|&p| p == Luma([123])));
    }

    #[test]
    fn test_threshold_is_strict() {
        let b = binarizer(80);

        let at_threshold = GrayImage::from_pixel(10, 10, Luma([80]));
        let mask = b.binarize(&at_threshold).unwrap();
        assert_eq!(mask.foreground_count(), 0);

        let below_threshold = GrayImage::from_pixel(10, 10, Luma([79]));
        let mask = b.binarize(&below_threshold).unwrap();
        assert_eq!(mask.foreground_count(), 100);
    }

    #[test]
    fn test_zero_threshold_marks_nothing() {
        let img = GrayImage::from_pixel(4, 4, Luma([0]));
        let mask = binarizer(0).binarize(&img).unwrap();
        assert_eq!(mask.foreground_count(), 0);
    }

    #[test]
    fn test_smoothing_removes_isolated_pixel() {
        //a single black pixel on white is averaged away by the 5x5 kernel
        let mut img = GrayImage::from_pixel(9, 9, Luma([255]));
        img.put_pixel(4, 4, Luma([0]));
        let mask = binarizer(80).binarize(&img).unwrap();
        assert_eq!(mask.foreground_count(), 0);
    }

    #[test]
    fn test_square_survives_smoothing() {
        let img = GrayImage::from_fn(40, 40, |x, y| {
            if (15..25).contains(&x) && (15..25).contains(&y) {
                Luma([0])
            } else {
                Luma([200])
            }
        });
        let mask = binarizer(80).binarize(&img).unwrap();

        //inner pixels stay dark, pixels well outside stay light
        assert!(is_foreground(&mask, 20, 20));
        assert!(is_foreground(&mask, 15, 20));
        assert!(!is_foreground(&mask, 14, 20));
        assert!(!is_foreground(&mask, 5, 5));
        //boundaries move by at most the kernel radius
        for (x, y) in mask.as_image().enumerate_pixels().filter_map(|(x, y, p)| {
            (*p == Mask::FOREGROUND).then_some((x, y))
        }) {
            assert!((13..27).contains(&x));
            assert!((13..27).contains(&y));
        }
    }

    #[test]
    fn test_empty_image_rejected() {
        let img = GrayImage::new(0, 5);
        assert!(matches!(
            binarizer(80).binarize(&img),
            Err(Error::InvalidImage { .. })
        ));
    }
}
