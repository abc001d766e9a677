use std::path::Path;

use image::{DynamicImage, RgbImage};

use crate::{
    annotate::annotate_regions,
    artifacts::{ArtifactKind, ArtifactName, ArtifactSink},
    regions::filter_by_area,
    Binarizer, CropWindow, DetectionOptions, Error, LabellingExtractor, Region, RegionExtractor,
    SpotCropResult,
};

/// Decode an image from an in-memory byte stream. The format is guessed from the content.
pub fn decode_image(name: &str, bytes: &[u8]) -> SpotCropResult<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(|e| Error::invalid_image(name, e))?;
    Ok(img.to_rgb8())
}

/// A spot that passed the area filter, and the band of the source image cropped around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedSpot {
    pub index: usize,
    pub region: Region,
    pub window: CropWindow,
}

/// The outcome of processing a single image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotReport {
    base_name: String,
    num_regions: usize,
    spots: Vec<AcceptedSpot>,
}

impl SpotReport {
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Number of connected regions found before area filtering.
    pub fn num_regions(&self) -> usize {
        self.num_regions
    }

    /// Number of crops that were written.
    pub fn spot_count(&self) -> usize {
        self.spots.len()
    }

    pub fn spots(&self) -> &[AcceptedSpot] {
        &self.spots
    }
}

/// Finds dark spots in images and writes a crop around each one.
pub struct SpotCropper {
    options: DetectionOptions,
    binarizer: Binarizer,
    extractor: Box<dyn RegionExtractor>,
}

impl std::fmt::Debug for SpotCropper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotCropper")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SpotCropper {
    /// A cropper using connected component labelling with the configured connectivity.
    pub fn from_options(options: DetectionOptions) -> SpotCropResult<Self> {
        let extractor = LabellingExtractor::new(options.connectivity);
        Self::with_extractor(options, extractor)
    }

    /// A cropper using a custom region extractor. `options.connectivity` is ignored.
    pub fn with_extractor(
        options: DetectionOptions,
        extractor: impl RegionExtractor + 'static,
    ) -> SpotCropResult<Self> {
        Ok(Self {
            options,
            binarizer: Binarizer::from_options(&options)?,
            extractor: Box::new(extractor),
        })
    }

    /// Read, decode and process an image file. The base name is the file stem.
    ///
    /// The format is guessed from the file content, so the extension does not have to match.
    pub fn process_file(
        &self,
        src_path: impl AsRef<Path>,
        sink: &mut dyn ArtifactSink,
    ) -> SpotCropResult<SpotReport> {
        let src_path = src_path.as_ref();
        let base_name = src_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let img = image::ImageReader::open(src_path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| Error::invalid_image(src_path.to_string_lossy(), e))?
            .decode()
            .map_err(|e| Error::invalid_image(src_path.to_string_lossy(), e))?
            .to_rgb8();

        self.process(&base_name, &img, sink)
    }

    /// Detect spots in `img` and send the crops, the overview and the mask to `sink`.
    ///
    /// Crops are written first, in the order the spots were found, followed by the overview and
    /// then the mask. If a write fails processing stops and the error is returned; artifacts
    /// written before the failure are left as they are.
    pub fn process(
        &self,
        base_name: &str,
        img: &RgbImage,
        sink: &mut dyn ArtifactSink,
    ) -> SpotCropResult<SpotReport> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::invalid_image(
                base_name,
                format!("image has no pixels ({width}x{height})"),
            ));
        }

        let intensity = image::imageops::grayscale(img);
        let mask = self.binarizer.binarize(&intensity)?;
        log::trace!("{base_name}: {} foreground pixels", mask.foreground_count());

        let regions = self.extractor.extract(&mask);
        let num_regions = regions.len();

        for r in &regions {
            let accepted = self.options.min_area < r.area && r.area < self.options.max_area;
            log::trace!(
                "{base_name}: region at ({}, {}) size {}x{} area {} {}",
                r.x,
                r.y,
                r.width,
                r.height,
                r.area,
                if accepted { "accepted" } else { "rejected" }
            );
        }

        let kept = filter_by_area(regions, self.options.min_area, self.options.max_area);

        let mut spots = Vec::with_capacity(kept.len());
        for (index, region) in kept.iter().enumerate() {
            let (_center_x, center_y) = region.center();
            let window =
                CropWindow::vertically_centered((width, height), center_y, self.options.crop_height);

            log::trace!(
                "{base_name}: spot {index} cropped to rows {}..{} ({} rows)",
                window.top(),
                window.bottom(),
                window.height()
            );

            let (x, y, w, h) = window.as_view_args();
            let cropped = image::imageops::crop_imm(img, x, y, w, h).to_image();
            sink.write(
                &ArtifactName::new(base_name, ArtifactKind::Spot(index)),
                &DynamicImage::ImageRgb8(cropped),
            )?;

            spots.push(AcceptedSpot {
                index,
                region: *region,
                window,
            });
        }

        let overview = annotate_regions(img, &kept);
        sink.write(
            &ArtifactName::new(base_name, ArtifactKind::Overview),
            &DynamicImage::ImageRgb8(overview),
        )?;
        sink.write(
            &ArtifactName::new(base_name, ArtifactKind::Threshold),
            &DynamicImage::ImageLuma8(mask.into_image()),
        )?;

        log::debug!(
            "{base_name}: {num_regions} regions, {} spots kept",
            spots.len()
        );

        Ok(SpotReport {
            base_name: base_name.to_string(),
            num_regions,
            spots,
        })
    }
}
