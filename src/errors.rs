use std::path::PathBuf;

use thiserror::Error;

/// An error that prevented spots from being detected or written.
#[derive(Error, Debug)]
pub enum Error {
    /// The image could not be decoded, or it has no pixels.
    #[error("Invalid image {name}: {reason}")]
    InvalidImage { name: String, reason: String },

    /// No input images were found at the given location.
    #[error("No input images found in {}", .0.display())]
    NoInputFound(PathBuf),

    /// The input directory could not be listed.
    #[error("Failed to read input directory {}: {reason}", path.display())]
    InputDir { path: PathBuf, reason: String },

    /// An output image could not be encoded or written.
    #[error("Failed to write {name}")]
    OutputWrite {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// An output directory could not be created.
    #[error("Failed to create directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid detection options: {0}")]
    InvalidOptions(String),
}

impl Error {
    pub(crate) fn invalid_image(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidImage {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}
