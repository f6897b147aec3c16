use std::path::Path;

use image::{ImageFormat, RgbImage};

use crate::error::{BlendError, Result};
use crate::frame::BlendedFrame;

/// Output encodings a blended frame can be written as.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Tiff,
    Bmp,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
            Self::Jpeg => "jpg",
        }
    }

    pub fn image_format(&self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Tiff => ImageFormat::Tiff,
            Self::Bmp => ImageFormat::Bmp,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }

    /// Pick a format from a file extension, if it names one we write.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())?.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "tiff" | "tif" => Some(Self::Tiff),
            "bmp" => Some(Self::Bmp),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Convert a blended frame to an 8-bit RGB image.
pub fn to_rgb_image(frame: &BlendedFrame) -> Result<RgbImage> {
    let invalid = || BlendError::InvalidDimensions {
        width: frame.width,
        height: frame.height,
    };
    // `from_raw` accepts oversized buffers, so check the exact pixel count first.
    if frame.pixels.len() != frame.width as usize * frame.height as usize {
        return Err(invalid());
    }
    RgbImage::from_raw(frame.width, frame.height, frame.to_rgb_bytes()).ok_or_else(invalid)
}

/// Save a blended frame in the given format.
pub fn save_blended_as(frame: &BlendedFrame, path: &Path, format: OutputFormat) -> Result<()> {
    let img = to_rgb_image(frame)?;
    img.save_with_format(path, format.image_format())?;
    Ok(())
}

/// Save a blended frame, choosing format from file extension (PNG if unknown).
pub fn save_blended(frame: &BlendedFrame, path: &Path) -> Result<()> {
    let format = OutputFormat::from_path(path).unwrap_or_default();
    save_blended_as(frame, path, format)
}
