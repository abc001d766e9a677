use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    SpotCrop(#[from] spot_crop_lib::Error),

    #[error("Failed to serialize summary: {0}")]
    SummarySerialize(#[from] serde_json::Error),

    #[error("Failed to write summary: {0}")]
    SummaryWrite(#[from] std::io::Error),
}
