use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_hollow_rect_mut},
    rect::Rect,
};

use crate::Region;

const BOX_COLOUR: Rgb<u8> = Rgb([255, 0, 0]);
const CENTER_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);
const CENTER_RADIUS: i32 = 2;

/// Draw the bounding box and center of every region onto a copy of `img`.
///
/// Boxes are two pixels thick: one line on the box spanning `(x, y)` to `(x + width, y + height)`
/// inclusive, and one just outside it.
pub fn annotate_regions(img: &RgbImage, regions: &[Region]) -> RgbImage {
    let mut ret = img.clone();

    for region in regions {
        let x = region.x as i32;
        let y = region.y as i32;

        let inner = Rect::at(x, y).of_size(region.width + 1, region.height + 1);
        let outer = Rect::at(x - 1, y - 1).of_size(region.width + 3, region.height + 3);
        draw_hollow_rect_mut(&mut ret, inner, BOX_COLOUR);
        draw_hollow_rect_mut(&mut ret, outer, BOX_COLOUR);

        let (center_x, center_y) = region.center();
        draw_filled_circle_mut(
            &mut ret,
            (center_x as i32, center_y as i32),
            CENTER_RADIUS,
            CENTER_COLOUR,
        );
    }

    ret
}
