use crate::definitions::{
    Connectivity, DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_BLUR_SIGMA, DEFAULT_CROP_HEIGHT,
    DEFAULT_MAX_AREA, DEFAULT_MIN_AREA, DEFAULT_THRESHOLD_VALUE,
};
use crate::{Error, SpotCropResult};

/// Options controlling how spots are detected and cropped. Pass these to
/// [`crate::SpotCropper::from_options`]; they are never read from global state, so
/// croppers with different options can be used side by side.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DetectionOptions {
    /// After smoothing, pixels with an intensity strictly below this value are foreground.
    pub threshold: u8,

    /// Spots must contain strictly more pixels than this.
    pub min_area: u32,

    /// Spots must contain strictly fewer pixels than this.
    ///
    /// If `max_area <= min_area + 1` no spot can ever be accepted. This is not an error.
    pub max_area: u32,

    /// Height of every crop, in pixels. If an image is shorter than this, the whole height of
    /// the image is used instead.
    pub crop_height: u32,

    /// Size of the Gaussian smoothing kernel. Must be odd. 1 disables smoothing.
    pub blur_kernel_size: u32,

    /// Standard deviation of the Gaussian smoothing kernel. Non-positive values derive sigma
    /// from the kernel size.
    pub blur_sigma: f64,

    /// Adjacency rule used to group foreground pixels into spots.
    pub connectivity: Connectivity,
}

impl std::default::Default for DetectionOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD_VALUE,
            min_area: DEFAULT_MIN_AREA,
            max_area: DEFAULT_MAX_AREA,
            crop_height: DEFAULT_CROP_HEIGHT,
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
            blur_sigma: DEFAULT_BLUR_SIGMA,
            connectivity: Connectivity::default(),
        }
    }
}

impl DetectionOptions {
    pub fn validate(&self) -> SpotCropResult<()> {
        if self.blur_kernel_size % 2 == 0 {
            return Err(Error::InvalidOptions(format!(
                "blur kernel size must be odd, got {}",
                self.blur_kernel_size
            )));
        }

        if !self.blur_sigma.is_finite() {
            return Err(Error::InvalidOptions(format!(
                "blur sigma must be finite, got {}",
                self.blur_sigma
            )));
        }

        if self.crop_height == 0 {
            return Err(Error::InvalidOptions(
                "crop height must be at least 1 pixel".to_string(),
            ));
        }

        Ok(())
    }
}
