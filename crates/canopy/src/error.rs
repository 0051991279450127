use thiserror::Error;

#[derive(Error, Debug)]
pub enum CanopyError {
    #[error("Invalid image format: {0}")]
    InvalidImageFormat(String),

    #[error("Dimension mismatch: expected {}x{}, found {}x{}", expected.0, expected.1, found.0, found.1)]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("No image loaded")]
    NoImageLoaded,

    #[error("Font error: {0}")]
    Font(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CanopyError>;

/// Fails with [`CanopyError::DimensionMismatch`] unless both buffers share dimensions.
pub(crate) fn ensure_same_dimensions(expected: (u32, u32), found: (u32, u32)) -> Result<()> {
    if expected != found {
        return Err(CanopyError::DimensionMismatch { expected, found });
    }
    Ok(())
}
