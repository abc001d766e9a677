use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::{Error, SpotCropResult};

/// The different images produced for a single source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    /// The n-th crop around an accepted spot.
    Spot(usize),
    /// The source image with the accepted spots marked.
    Overview,
    /// The binary mask used for detection.
    Threshold,
}

impl ArtifactKind {
    /// Crops are the real output; everything else is a diagnostic.
    pub fn is_diagnostic(&self) -> bool {
        !matches!(self, Self::Spot(_))
    }
}

/// Identifies an artifact by the base name of its source image and its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactName {
    pub base_name: String,
    pub kind: ArtifactKind,
}

impl ArtifactName {
    pub fn new(base_name: impl Into<String>, kind: ArtifactKind) -> Self {
        Self {
            base_name: base_name.into(),
            kind,
        }
    }

    /// `N-spot-i.png`, `N-output.png` or `N-threshold.png`.
    pub fn file_name(&self) -> String {
        match self.kind {
            ArtifactKind::Spot(idx) => format!("{}-spot-{idx}.png", self.base_name),
            ArtifactKind::Overview => format!("{}-output.png", self.base_name),
            ArtifactKind::Threshold => format!("{}-threshold.png", self.base_name),
        }
    }
}

impl std::fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Destination for every image produced while processing.
pub trait ArtifactSink {
    fn write(&mut self, name: &ArtifactName, img: &DynamicImage) -> SpotCropResult<()>;
}

/// Writes crops into `output_dir` and diagnostic images into `temp_dir`, as png files.
///
/// Existing files with the same name are overwritten. Both directories are created on
/// construction.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    output_dir: PathBuf,
    temp_dir: PathBuf,
    write_diagnostics: bool,
}

impl DirectorySink {
    pub fn new(output_dir: impl AsRef<Path>, temp_dir: impl AsRef<Path>) -> SpotCropResult<Self> {
        let ret = Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            temp_dir: temp_dir.as_ref().to_path_buf(),
            write_diagnostics: true,
        };

        create_dir(&ret.output_dir)?;
        create_dir(&ret.temp_dir)?;

        Ok(ret)
    }

    /// Only write the crops. The temp dir is still created, but left empty.
    #[must_use]
    pub fn without_diagnostics(mut self) -> Self {
        self.write_diagnostics = false;
        self
    }

    pub fn path_for(&self, name: &ArtifactName) -> PathBuf {
        let dir = if name.kind.is_diagnostic() {
            &self.temp_dir
        } else {
            &self.output_dir
        };
        dir.join(name.file_name())
    }
}

fn create_dir(path: &Path) -> SpotCropResult<()> {
    std::fs::create_dir_all(path).map_err(|source| Error::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

impl ArtifactSink for DirectorySink {
    fn write(&mut self, name: &ArtifactName, img: &DynamicImage) -> SpotCropResult<()> {
        if name.kind.is_diagnostic() && !self.write_diagnostics {
            return Ok(());
        }

        let dest = self.path_for(name);
        log::trace!("writing {}", dest.display());

        img.save_with_format(&dest, ImageFormat::Png)
            .map_err(|source| Error::OutputWrite {
                name: dest.to_string_lossy().to_string(),
                source,
            })
    }
}

/// Keeps every artifact in memory, in the order it was written.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    artifacts: Vec<(ArtifactName, DynamicImage)>,
}

impl MemorySink {
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArtifactName, &DynamicImage)> {
        self.artifacts.iter().map(|(name, img)| (name, img))
    }

    /// Look up an artifact by file name, e.g. `"photo-spot-0.png"`.
    pub fn get(&self, file_name: &str) -> Option<&DynamicImage> {
        self.artifacts
            .iter()
            .find(|(name, _img)| name.file_name() == file_name)
            .map(|(_name, img)| img)
    }

    pub fn spots<'a>(&'a self, base_name: &'a str) -> impl Iterator<Item = &'a DynamicImage> {
        self.artifacts
            .iter()
            .filter(move |(name, _img)| {
                name.base_name == base_name && matches!(name.kind, ArtifactKind::Spot(_))
            })
            .map(|(_name, img)| img)
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, name: &ArtifactName, img: &DynamicImage) -> SpotCropResult<()> {
        self.artifacts.push((name.clone(), img.clone()));
        Ok(())
    }
}
