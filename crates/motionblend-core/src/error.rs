use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlendError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TGA data: {0}")]
    InvalidTga(String),

    #[error("Unsupported TGA variant: {0}")]
    UnsupportedTga(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame {frame} has {got} channel values, merge buffer holds {expected}")]
    SizeMismatch {
        frame: u64,
        expected: usize,
        got: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Save queue is closed")]
    QueueClosed,
}

pub type Result<T> = std::result::Result<T, BlendError>;
