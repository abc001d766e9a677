/// A horizontal band of an image: full image width, `height` rows starting at row `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CropWindow {
    pub orig_res: (u32, u32),
    pub y: u32,
    pub height: u32,
}

impl CropWindow {
    /// A band of `crop_height` rows, vertically centered on `center_y` as far as the image
    /// allows.
    ///
    /// The band is first placed so that it starts `crop_height / 2` rows above `center_y`
    /// (but not above the top of the image). If it would then run past the bottom of the
    /// image it is moved up so that it ends on the last row.
    ///
    /// If the image is shorter than `crop_height` the band covers the whole image.
    #[must_use]
    pub fn vertically_centered(orig_res: (u32, u32), center_y: u32, crop_height: u32) -> Self {
        let (_orig_width, orig_height) = orig_res;

        let mut y = center_y.saturating_sub(crop_height / 2);
        if y.saturating_add(crop_height) > orig_height {
            y = orig_height.saturating_sub(crop_height);
        }

        Self {
            orig_res,
            y,
            height: crop_height.min(orig_height),
        }
    }

    #[must_use]
    pub fn as_view_args(&self) -> (u32, u32, u32, u32) {
        (0, self.y, self.width(), self.height)
    }

    pub fn width(&self) -> u32 {
        self.orig_res.0
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn top(&self) -> u32 {
        self.y
    }

    /// One past the last row of the band.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}
