#![allow(clippy::let_and_return)]
#![allow(clippy::len_without_is_empty)]
#![warn(clippy::cast_lossless)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::todo)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::unimplemented)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]
#![allow(clippy::doc_markdown)]

//! # Overview
//! `spot_crop_lib` finds small dark spots (dust, specks, pinholes...) on a lighter background in
//! a photograph, and for each spot produces a full-width, fixed-height crop of the photograph
//! that is vertically centered on the spot.
//!
//! # High Level API
//! Build a [`SpotCropper`] from a set of [`DetectionOptions`], then hand it decoded images
//! together with an [`ArtifactSink`] that receives the crops and the diagnostic images.
//! ```rust
//! use image::{Rgb, RgbImage};
//! use spot_crop_lib::{DetectionOptions, MemorySink, SpotCropper};
//!
//! // A light 200x1000 image with one dark 10x10 square around (100, 500)
//! let img = RgbImage::from_fn(200, 1000, |x, y| {
//!     if (95..105).contains(&x) && (495..505).contains(&y) {
//!         Rgb([0, 0, 0])
//!     } else {
//!         Rgb([200, 200, 200])
//!     }
//! });
//!
//! let cropper = SpotCropper::from_options(DetectionOptions::default()).unwrap();
//! let mut sink = MemorySink::default();
//! let report = cropper.process("photo", &img, &mut sink).unwrap();
//!
//! assert_eq!(report.spot_count(), 1);
//! assert_eq!(report.spots()[0].window.as_view_args(), (0, 180, 200, 640));
//! assert!(sink.get("photo-spot-0.png").is_some());
//! ```
//!
//! # How it works
//! 1. The image is reduced to intensity and smoothed with a small Gaussian kernel (5x5 by
//!    default) to suppress sensor and compression noise.
//! 2. Every pixel whose smoothed intensity is strictly below the threshold becomes foreground
//!    in a binary [`Mask`].
//! 3. Connected foreground components are labelled (8-connectivity by default, see
//!    [`Connectivity`]). Components lying inside a hole of another component are ignored.
//!    Components whose pixel count lies strictly between the minimum and maximum area are kept.
//! 4. For each kept component a [`CropWindow`] spanning the whole image width is centered on
//!    the vertical center of the component's bounding box, then clamped so that it stays inside
//!    the image.
//!
//! Alongside the crops, an annotated overview image (bounding boxes and centers of all kept
//! spots) and the binary mask are emitted for diagnostics.
//!
//! # Outputs
//! Output is never written directly to disk. Instead all images are handed to an
//! [`ArtifactSink`]. [`DirectorySink`] writes them as png files, [`MemorySink`] keeps them
//! in memory.

mod annotate;
mod artifacts;
mod binarize;
mod crop;
mod definitions;
mod errors;
mod mask;
mod options;
mod regions;
mod spot_cropper;
mod summary;

pub use annotate::annotate_regions;
pub use artifacts::{ArtifactKind, ArtifactName, ArtifactSink, DirectorySink, MemorySink};
pub use binarize::{gaussian_kernel, Binarizer};
pub use crop::CropWindow;
pub use definitions::{
    Connectivity, DEFAULT_BLUR_KERNEL_SIZE, DEFAULT_BLUR_SIGMA, DEFAULT_CROP_HEIGHT,
    DEFAULT_INPUT_EXTENSIONS, DEFAULT_MAX_AREA, DEFAULT_MIN_AREA, DEFAULT_THRESHOLD_VALUE,
};
pub use errors::Error;
pub use mask::Mask;
pub use options::DetectionOptions;
pub use regions::{filter_by_area, LabellingExtractor, Region, RegionExtractor};
pub use spot_cropper::{decode_image, AcceptedSpot, SpotCropper, SpotReport};
pub use summary::{ImageSummary, RunSummary, SkippedImage};

pub type SpotCropResult<T> = Result<T, crate::Error>;
