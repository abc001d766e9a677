use serde::{Deserialize, Serialize};

use crate::{Error, SpotReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSummary {
    pub name: String,
    pub spots: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedImage {
    pub name: String,
    pub reason: String,
}

/// Counters accumulated over a batch of images.
///
/// Images that could not be decoded are listed under `skipped` and do not count as processed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub images_found: usize,
    pub images_processed: usize,
    pub images_skipped: usize,
    pub total_spots: usize,
    pub images: Vec<ImageSummary>,
    pub skipped: Vec<SkippedImage>,
}

impl RunSummary {
    pub fn new(images_found: usize) -> Self {
        Self {
            images_found,
            ..Default::default()
        }
    }

    pub fn record(&mut self, report: &SpotReport) {
        self.images_processed += 1;
        self.total_spots += report.spot_count();
        self.images.push(ImageSummary {
            name: report.base_name().to_string(),
            spots: report.spot_count(),
        });
    }

    pub fn record_skipped(&mut self, name: impl Into<String>, err: &Error) {
        self.images_skipped += 1;
        self.skipped.push(SkippedImage {
            name: name.into(),
            reason: err.to_string(),
        });
    }
}
