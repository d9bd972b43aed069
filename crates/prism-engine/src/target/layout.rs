use super::TargetError;

/// Byte layout of the host-visible staging buffer.
///
/// Staging rows are always tightly packed: `row_stride == bytes_per_pixel * width`
/// and the buffer holds exactly `row_stride * height` bytes. When that stride
/// misses `wgpu::COPY_BYTES_PER_ROW_ALIGNMENT`, the texture copy goes through a
/// GPU-only buffer with `copy_stride` rows first.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ReadbackLayout {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
    pub row_stride: u32,
}

impl ReadbackLayout {
    pub fn new(width: u32, height: u32, format: wgpu::TextureFormat) -> Result<Self, TargetError> {
        let bytes_per_pixel = format
            .block_copy_size(None)
            .ok_or(TargetError::UnsupportedFormat(format))?;
        Self::with_bytes_per_pixel(width, height, bytes_per_pixel)
    }

    pub fn with_bytes_per_pixel(
        width: u32,
        height: u32,
        bytes_per_pixel: u32,
    ) -> Result<Self, TargetError> {
        if width == 0 || height == 0 {
            return Err(TargetError::ZeroExtent { width, height });
        }

        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        // The padded copy rows must fit in a u32 as well.
        let row_stride = width
            .checked_mul(bytes_per_pixel)
            .filter(|row| row.checked_next_multiple_of(align).is_some())
            .ok_or(TargetError::TooLarge { width, height })?;

        Ok(Self { width, height, bytes_per_pixel, row_stride })
    }

    /// Row pitch of a texture copy: `row_stride` rounded up to the copy alignment.
    #[inline]
    pub fn copy_stride(&self) -> u32 {
        self.row_stride.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
    }

    /// Whether the texture can be copied straight into the staging buffer.
    #[inline]
    pub fn is_copy_aligned(&self) -> bool {
        self.copy_stride() == self.row_stride
    }

    /// Staging buffer size in bytes.
    #[inline]
    pub fn buffer_size(&self) -> wgpu::BufferAddress {
        self.row_stride as wgpu::BufferAddress * self.height as wgpu::BufferAddress
    }

    /// Size of the intermediate buffer used for unaligned rows.
    #[inline]
    pub fn copy_buffer_size(&self) -> wgpu::BufferAddress {
        self.copy_stride() as wgpu::BufferAddress * self.height as wgpu::BufferAddress
    }

    #[inline]
    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}
