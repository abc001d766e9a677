/// The default intensity cutoff. After smoothing, a pixel whose intensity is strictly below
/// this value is treated as part of a dark spot. Lower values only detect darker spots.
///
/// Range: 0-255.
pub const DEFAULT_THRESHOLD_VALUE: u8 = 80;

/// The default lower bound (exclusive) on the pixel area of an accepted spot. Removes
/// speckle noise that survives smoothing.
pub const DEFAULT_MIN_AREA: u32 = 20;

/// The default upper bound (exclusive) on the pixel area of an accepted spot. Large dark
/// areas are usually part of the subject rather than a spot.
pub const DEFAULT_MAX_AREA: u32 = 10000;

/// The default height of each crop, in pixels. Crops always span the full image width.
pub const DEFAULT_CROP_HEIGHT: u32 = 640;

/// The default width and height of the Gaussian smoothing kernel. Must be odd.
pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 5;

/// The default standard deviation of the Gaussian smoothing kernel. Zero (or any
/// non-positive value) derives sigma from the kernel size.
pub const DEFAULT_BLUR_SIGMA: f64 = 0.0;

/// File extensions picked up when scanning an input directory, in scan order. Matching is
/// case-sensitive.
pub const DEFAULT_INPUT_EXTENSIONS: [&str; 4] = ["jpg", "png", "jpeg", "bmp"];

/// Which neighbouring pixels are considered to touch when grouping foreground pixels into
/// spots. This changes the result only where spots meet at a diagonal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub enum Connectivity {
    /// Pixels touch if they share an edge.
    Four,
    /// Pixels touch if they share an edge or a corner.
    #[default]
    Eight,
}

impl Connectivity {
    /// The adjacency rule for background pixels that pairs with this rule for foreground pixels.
    pub fn complement(self) -> Self {
        match self {
            Self::Four => Self::Eight,
            Self::Eight => Self::Four,
        }
    }
}

impl From<Connectivity> for imageproc::region_labelling::Connectivity {
    fn from(value: Connectivity) -> Self {
        match value {
            Connectivity::Four => Self::Four,
            Connectivity::Eight => Self::Eight,
        }
    }
}
