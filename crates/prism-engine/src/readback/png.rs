use std::path::Path;

/// Failure while persisting a captured frame.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("expected 4 channels, got {0}")]
    Channels(u32),

    #[error("row stride {stride} does not match a tightly packed {width}-pixel row")]
    Stride { stride: u32, width: u32 },

    #[error("pixel buffer holds {len} bytes, {needed} needed")]
    Short { len: usize, needed: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Writes raw pixel rows to an image file.
pub trait ImageEncoder {
    /// `bytes` holds `height` rows of `row_stride` bytes each.
    fn encode(
        &mut self,
        path: &Path,
        width: u32,
        height: u32,
        channels: u32,
        bytes: &[u8],
        row_stride: u32,
    ) -> Result<(), EncodeError>;
}

/// RGBA8 PNG writer backed by the `image` crate.
#[derive(Debug, Default, Copy, Clone)]
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn encode(
        &mut self,
        path: &Path,
        width: u32,
        height: u32,
        channels: u32,
        bytes: &[u8],
        row_stride: u32,
    ) -> Result<(), EncodeError> {
        if channels != 4 {
            return Err(EncodeError::Channels(channels));
        }
        if row_stride != width * channels {
            return Err(EncodeError::Stride { stride: row_stride, width });
        }
        let needed = row_stride as usize * height as usize;
        let pixels = bytes
            .get(..needed)
            .ok_or(EncodeError::Short { len: bytes.len(), needed })?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }

        image::save_buffer_with_format(
            path,
            pixels,
            width,
            height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        Ok(())
    }
}
