use std::collections::{HashMap, HashSet};

use image::Luma;
use imageproc::definitions::Image;

use crate::{Connectivity, Mask};

/// One connected group of foreground pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    /// Left edge of the bounding box.
    pub x: u32,
    /// Top edge of the bounding box.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Number of pixels in the component. Not the bounding box area.
    pub area: u32,
}

impl Region {
    /// Center of the bounding box, rounded down.
    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn as_view_args(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }
}

/// Finds connected foreground components in a [`Mask`].
///
/// Implementations must report regions in a deterministic order, as that order decides the
/// index of each output crop.
pub trait RegionExtractor {
    fn extract(&self, mask: &Mask) -> Vec<Region>;
}

/// Connected component labelling, with regions reported in raster-scan order of their first
/// (top-most, then left-most) pixel.
///
/// Only outer components are reported. A component lying inside a hole of another component is
/// dropped, however deeply it is nested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabellingExtractor {
    connectivity: Connectivity,
}

impl LabellingExtractor {
    pub fn new(connectivity: Connectivity) -> Self {
        Self { connectivity }
    }
}

// Bounding box accumulator for a single label. `first` is the first pixel in raster order.
struct Extent {
    first: (u32, u32),
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: u32,
}

impl Extent {
    fn new(x: u32, y: u32) -> Self {
        Self {
            first: (x, y),
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            area: 0,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.area += 1;
    }

    fn into_region(self) -> Region {
        Region {
            x: self.min_x,
            y: self.min_y,
            width: (self.max_x - self.min_x) + 1,
            height: (self.max_y - self.min_y) + 1,
            area: self.area,
        }
    }
}

impl RegionExtractor for LabellingExtractor {
    fn extract(&self, mask: &Mask) -> Vec<Region> {
        let labels = imageproc::region_labelling::connected_components(
            mask.as_image(),
            self.connectivity.into(),
            Mask::BACKGROUND,
        );

        // Labels are mapped to output slots the first time they are seen, so the output order
        // does not depend on how the labeller numbers its components.
        let mut slots: HashMap<u32, usize> = HashMap::new();
        let mut extents: Vec<Extent> = vec![];

        for (x, y, Luma([label])) in labels.enumerate_pixels() {
            if *label == 0 {
                continue;
            }
            let slot = *slots.entry(*label).or_insert_with(|| {
                extents.push(Extent::new(x, y));
                extents.len() - 1
            });
            extents[slot].add(x, y);
        }

        let outside = OutsideBackground::new(mask, self.connectivity);

        extents
            .into_iter()
            .filter(|extent| outside.is_outer(extent.first))
            .map(Extent::into_region)
            .collect()
    }
}

// Background components that touch the image border. Every other background component is a
// hole enclosed by some foreground component.
//
// The pixel above the first raster pixel of a foreground component is background, and cannot
// be a hole of that same component. So the component is nested exactly when that pixel belongs
// to a hole.
struct OutsideBackground {
    labels: Image<Luma<u32>>,
    border_labels: HashSet<u32>,
}

impl OutsideBackground {
    fn new(mask: &Mask, connectivity: Connectivity) -> Self {
        // Labels every background pixel, using the adjacency rule that pairs with the
        // foreground one so that holes and outlines agree.
        let labels = imageproc::region_labelling::connected_components(
            mask.as_image(),
            connectivity.complement().into(),
            Mask::FOREGROUND,
        );

        let (width, height) = labels.dimensions();
        let on_border = |x: u32, y: u32| x == 0 || y == 0 || x + 1 == width || y + 1 == height;

        let border_labels = labels
            .enumerate_pixels()
            .filter(|(x, y, Luma([label]))| *label != 0 && on_border(*x, *y))
            .map(|(_x, _y, Luma([label]))| *label)
            .collect();

        Self {
            labels,
            border_labels,
        }
    }

    fn is_outer(&self, (x, y): (u32, u32)) -> bool {
        if y == 0 {
            return true;
        }
        let Luma([label]) = self.labels.get_pixel(x, y - 1);
        self.border_labels.contains(label)
    }
}

/// Keep regions whose area is strictly between `min_area` and `max_area`, preserving order.
pub fn filter_by_area(
    regions: impl IntoIterator<Item = Region>,
    min_area: u32,
    max_area: u32,
) -> Vec<Region> {
    regions
        .into_iter()
        .filter(|r| min_area < r.area && r.area < max_area)
        .collect()
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use super::*;

    fn mask_from_rows(rows: &[&str]) -> Mask {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        Mask::from_fn(width, height, |x, y| {
            rows[y as usize].as_bytes()[x as usize] == b'#'
        })
    }

    // A filled block of exactly `area` pixels, laid out row by row in a 10-wide strip.
    fn mask_with_area(area: u32) -> Mask {
        Mask::from_fn(40, 40 + area / 10, |x, y| {
            if x < 5 || y < 5 || x >= 15 {
                return false;
            }
            (y - 5) * 10 + (x - 5) < area
        })
    }

    #[test]
    fn test_empty_mask() {
        let mask = Mask::new(10, 10);
        assert!(LabellingExtractor::default().extract(&mask).is_empty());
    }

    #[test]
    fn test_single_block() {
        #[rustfmt::skip]
        let mask = mask_from_rows(&[
            "......",
            ".###..",
            ".###..",
            "......",
        ]);
        let regions = LabellingExtractor::default().extract(&mask);
        assert_eq!(
            regions,
            vec![Region {
                x: 1,
                y: 1,
                width: 3,
                height: 2,
                area: 6
            }]
        );
        assert_eq!(regions[0].center(), (2, 2));
    }

    #[test]
    fn test_area_is_pixel_count_not_box_area() {
        #[rustfmt::skip]
        let mask = mask_from_rows(&[
            "#....",
            "##...",
            "###..",
            "####.",
        ]);
        let regions = LabellingExtractor::default().extract(&mask);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 10);
        assert_eq!((regions[0].width, regions[0].height), (4, 4));
    }

    #[test]
    fn test_diagonal_connectivity() {
        #[rustfmt::skip]
        let mask = mask_from_rows(&[
            "##...",
            "##...",
            "..##.",
            "..##.",
        ]);
        let eight = LabellingExtractor::new(Connectivity::Eight).extract(&mask);
        assert_eq!(eight.len(), 1);
        assert_eq!(eight[0].area, 8);

        let four = LabellingExtractor::new(Connectivity::Four).extract(&mask);
        assert_eq!(four.len(), 2);
        assert_eq!(four.iter().map(|r| r.area).collect_vec(), vec![4, 4]);
    }

    #[test]
    fn test_raster_discovery_order() {
        //the right-hand blob starts on an earlier row so it is discovered first
        #[rustfmt::skip]
        let mask = mask_from_rows(&[
            "......#",
            "#.....#",
            "#......",
            ".......",
            "...#...",
        ]);
        let regions = LabellingExtractor::default().extract(&mask);
        let origins = regions.iter().map(|r| (r.x, r.y)).collect_vec();
        assert_eq!(origins, vec![(6, 0), (0, 1), (3, 4)]);
    }

    #[test]
    fn test_component_inside_hole_is_dropped() {
        #[rustfmt::skip]
        let mask = mask_from_rows(&[
            ".......",
            ".#####.",
            ".#...#.",
            ".#.#.#.",
            ".#...#.",
            ".#####.",
            ".......",
        ]);
        for connectivity in [Connectivity::Four, Connectivity::Eight] {
            let regions = LabellingExtractor::new(connectivity).extract(&mask);
            assert_eq!(regions.len(), 1);
            assert_eq!(regions[0].as_view_args(), (1, 1, 5, 5));
            assert_eq!(regions[0].area, 16);
        }
    }

    #[test]
    fn test_deeply_nested_components_are_dropped() {
        #[rustfmt::skip]
        let mask = mask_from_rows(&[
            "#########",
            "#.......#",
            "#.#####.#",
            "#.#...#.#",
            "#.#.#.#.#",
            "#.#...#.#",
            "#.#####.#",
            "#.......#",
            "#########",
            ".........",
            "...##....",
        ]);
        let regions = LabellingExtractor::default().extract(&mask);
        let origins = regions.iter().map(|r| (r.x, r.y)).collect_vec();
        assert_eq!(origins, vec![(0, 0), (3, 10)]);
    }

    #[test]
    fn test_open_ring_does_not_enclose() {
        #[rustfmt::skip]
        let mask = mask_from_rows(&[
            "#####",
            "#...#",
            "#.#.#",
            "#....",
            "#####",
        ]);
        let regions = LabellingExtractor::default().extract(&mask);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].as_view_args(), (2, 2, 1, 1));
    }

    #[test]
    fn test_enclosure_follows_connectivity() {
        //the ring is closed only through a diagonal step at the top left corner
        #[rustfmt::skip]
        let mask = mask_from_rows(&[
            ".####",
            "#...#",
            "#.#.#",
            "#...#",
            "#####",
        ]);
        let eight = LabellingExtractor::new(Connectivity::Eight).extract(&mask);
        assert_eq!(eight.len(), 1);

        let four = LabellingExtractor::new(Connectivity::Four).extract(&mask);
        assert_eq!(four.len(), 2);
        assert_eq!(four[1].as_view_args(), (2, 2, 1, 1));
    }

    #[test]
    fn test_area_filter_bounds_are_exclusive() {
        let extractor = LabellingExtractor::default();
        let (min_area, max_area) = (20, 10000);

        let count_kept = |area: u32| {
            let regions = extractor.extract(&mask_with_area(area));
            assert_eq!(regions.len(), 1);
            assert_eq!(regions[0].area, area);
            filter_by_area(regions, min_area, max_area).len()
        };

        assert_eq!(count_kept(min_area), 0);
        assert_eq!(count_kept(min_area + 1), 1);
        assert_eq!(count_kept(max_area - 1), 1);
        assert_eq!(count_kept(max_area), 0);
    }

    #[test]
    fn test_area_filter_keeps_order() {
        let regions = [5, 50, 3, 70, 100]
            .into_iter()
            .enumerate()
            .map(|(i, area)| Region {
                x: i as u32,
                y: 0,
                width: 1,
                height: 1,
                area,
            })
            .collect_vec();

        let kept = filter_by_area(regions, 4, 100);
        assert_eq!(kept.iter().map(|r| r.x).collect_vec(), vec![0, 1, 3]);
    }
}
