use std::path::PathBuf;

use spot_crop_lib::DetectionOptions;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Normal,
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConnectivityArg {
    Four,
    Eight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirCfg {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputCfg {
    pub format: OutputFormat,
    pub verbosity: ReportVerbosity,
    pub debug_images: bool,
}

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub dir_cfg: DirCfg,
    pub detection: DetectionOptions,
    pub output_cfg: OutputCfg,
}
