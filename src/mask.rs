use image::{GrayImage, Luma};

/// A binary image marking candidate spot pixels.
///
/// Foreground pixels are stored as 255 and background pixels as 0, so the mask can be
/// written out as an ordinary grayscale image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    img: GrayImage,
}

impl Mask {
    pub const FOREGROUND: Luma<u8> = Luma([255]);
    pub const BACKGROUND: Luma<u8> = Luma([0]);

    /// An all-background mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: GrayImage::from_pixel(width, height, Self::BACKGROUND),
        }
    }

    /// Build a mask from a predicate. `f(x, y)` returns true for foreground pixels.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let img = GrayImage::from_fn(width, height, |x, y| {
            if f(x, y) {
                Self::FOREGROUND
            } else {
                Self::BACKGROUND
            }
        });
        Self { img }
    }

    /// Wrap a grayscale image. Any nonzero pixel is foreground.
    pub fn from_image(mut img: GrayImage) -> Self {
        for Luma([pix]) in img.pixels_mut() {
            if *pix != 0 {
                *pix = 255;
            }
        }
        Self { img }
    }

    pub fn foreground_count(&self) -> usize {
        self.img.pixels().filter(|&&p| p == Self::FOREGROUND).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.img
    }

    pub fn into_image(self) -> GrayImage {
        self.img
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_from_image_normalizes_nonzero() {
        let img = GrayImage::from_raw(3, 1, vec![0, 1, 200]).unwrap();
        let mask = Mask::from_image(img);
        assert_eq!(mask.as_image().as_raw(), &vec![0, 255, 255]);
    }

    #[test]
    fn test_from_fn_and_count() {
        let mask = Mask::from_fn(4, 4, |x, y| x == y);
        assert_eq!(mask.as_image().dimensions(), (4, 4));
        assert_eq!(mask.foreground_count(), 4);
    }
}
