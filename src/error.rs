use thiserror::Error;

/// Failures of the localization stages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocalizeError {
    #[error("frame has no pixels")]
    EmptyFrame,

    #[error("field mask is {mask_width}x{mask_height} but the frame is {frame_width}x{frame_height}")]
    DimensionMismatch {
        frame_width: u32,
        frame_height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    #[error("no ball candidates survived circle detection")]
    NoBallsDetected,
}

pub type Result<T> = std::result::Result<T, LocalizeError>;
